//! Error types for lichess API operations

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    // Configuration errors
    #[error("failed to read challenger list {path}: {source}")]
    Config {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    // Network errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server error: {0}")]
    ServerError(StatusCode),

    #[error("HTTP status: {0}")]
    HttpStatus(StatusCode),

    // Streaming errors, surfaced without retry
    #[error("stream request failed: {0}")]
    Stream(reqwest::Error),

    #[error("stream request failed with status {0}")]
    StreamStatus(StatusCode),

    // Data errors
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("challenger list is empty")]
    EmptyPool,
}

impl ApiError {
    /// Create a configuration error for the challenger list file
    pub fn config(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Config {
            path: path.into(),
            source,
        }
    }

    /// Map a non-success response status to the matching error kind
    pub fn from_status(status: StatusCode) -> Self {
        if status.is_server_error() {
            Self::ServerError(status)
        } else {
            Self::HttpStatus(status)
        }
    }

    /// Check if error is retryable
    ///
    /// Server errors and connection-level failures (connection reset, protocol
    /// error, read timeout) are transient. Client errors, decode failures, and
    /// anything raised by a streaming call are final.
    pub fn should_retry(&self) -> bool {
        match self {
            Self::ServerError(_) => true,
            Self::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        for code in [500, 502, 503, 504] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(ApiError::from_status(status).should_retry(), "{code}");
        }
    }

    #[test]
    fn client_errors_are_final() {
        for code in [400, 401, 403, 404, 429] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(!ApiError::from_status(status).should_retry(), "{code}");
        }
    }

    #[test]
    fn from_status_picks_variant_at_500_boundary() {
        assert!(matches!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS),
            ApiError::HttpStatus(_)
        ));
    }

    #[test]
    fn decode_and_pool_errors_are_final() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        assert!(!ApiError::Json(json_err).should_retry());
        assert!(!ApiError::EmptyPool.should_retry());
    }

    #[test]
    fn stream_status_is_final() {
        assert!(!ApiError::StreamStatus(StatusCode::BAD_GATEWAY).should_retry());
    }

    #[test]
    fn config_error_reports_path() {
        let err = ApiError::config(
            "challengers.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("challengers.txt"));
        assert!(!err.should_retry());
    }
}
