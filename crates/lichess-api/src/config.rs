//! Configuration for the bot API client

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Default lichess server
const DEFAULT_BASE_URL: &str = "https://lichess.org";

/// Default per-request network timeout for non-streaming calls
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 2;

/// Default connection timeout
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default challenger list location
const DEFAULT_CHALLENGERS_FILE: &str = "challengers.txt";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// OAuth bearer token for the bot account
    pub token: String,

    /// Base URL of the lichess server
    pub base_url: String,

    /// Client version reported in the User-Agent header
    pub version: String,

    /// Path to the challenger list, one bot identifier per line
    pub challengers_path: PathBuf,

    /// Timeout applied to every non-streaming request.
    /// Streaming calls are exempt; their reads may block indefinitely.
    pub request_timeout: Duration,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Retry policy for non-streaming requests
    pub retry_policy: RetryPolicy,
}

impl ClientConfig {
    /// Create a configuration with the default timeouts and retry policy.
    pub fn new(
        token: impl Into<String>,
        base_url: impl Into<String>,
        version: impl Into<String>,
        challengers_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            token: token.into(),
            base_url: base_url.into(),
            version: version.into(),
            challengers_path: challengers_path.into(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("LICHESS_TOKEN").unwrap_or_default(),
            std::env::var("LICHESS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            std::env::var("LICHESS_BOT_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            std::env::var("LICHESS_CHALLENGERS_FILE")
                .unwrap_or_else(|_| DEFAULT_CHALLENGERS_FILE.to_string()),
        )
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_applies_default_policy_and_timeouts() {
        let config = ClientConfig::new("tok", "https://lichess.org", "1.2.0", "bots.txt");

        assert_eq!(config.request_timeout, Duration::from_secs(2));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.retry_policy.interval, Duration::from_millis(100));
        assert_eq!(config.retry_policy.max_elapsed, Duration::from_secs(60));
        assert_eq!(config.challengers_path, PathBuf::from("bots.txt"));
    }
}
