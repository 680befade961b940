//! Incremental NDJSON consumption of long-lived streaming responses
//!
//! The event and game streams deliver one JSON document per line over a
//! chunked response body, with blank lines as keep-alives. [`NdjsonStream`]
//! reassembles lines across chunk boundaries and decodes each one as it
//! arrives; nothing is buffered beyond the current partial line.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::Value;
use std::pin::Pin;

use crate::error::{ApiError, Result};

type BytesStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

/// One decoded line of a streaming response.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamLine {
    /// A non-empty line holding one JSON document
    Event(Value),
    /// A blank keep-alive line
    KeepAlive,
}

/// Lazily-consumed NDJSON stream over an open response body.
///
/// Consumption is entirely the caller's responsibility and may block
/// indefinitely; no timeout applies to streaming reads. Dropping the stream
/// closes the connection.
pub struct NdjsonStream {
    inner: BytesStream,
    buffer: Vec<u8>,
    done: bool,
}

impl NdjsonStream {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self::from_bytes_stream(response.bytes_stream())
    }

    pub(crate) fn from_bytes_stream(
        stream: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
    ) -> Self {
        Self {
            inner: Box::pin(stream),
            buffer: Vec::new(),
            done: false,
        }
    }

    /// Next line from the stream, or `None` once the server closes it.
    ///
    /// Transport failures and decode failures surface immediately as
    /// [`ApiError::Stream`] and [`ApiError::Json`]; neither is retried.
    pub async fn next(&mut self) -> Option<Result<StreamLine>> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
                let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
                line.pop();
                return Some(decode_line(&line));
            }

            if self.done {
                if self.buffer.is_empty() {
                    return None;
                }
                // Final unterminated line
                let line = std::mem::take(&mut self.buffer);
                return Some(decode_line(&line));
            }

            match self.inner.next().await {
                Some(Ok(chunk)) => self.buffer.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(ApiError::Stream(e)));
                }
                None => self.done = true,
            }
        }
    }
}

impl std::fmt::Debug for NdjsonStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NdjsonStream")
            .field("buffered_bytes", &self.buffer.len())
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

fn decode_line(line: &[u8]) -> Result<StreamLine> {
    let line = match line {
        [rest @ .., b'\r'] => rest,
        _ => line,
    };
    if line.is_empty() {
        return Ok(StreamLine::KeepAlive);
    }
    Ok(StreamLine::Event(serde_json::from_slice(line)?))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn stream_of(chunks: Vec<Bytes>) -> NdjsonStream {
        NdjsonStream::from_bytes_stream(futures::stream::iter(
            chunks.into_iter().map(Ok::<Bytes, reqwest::Error>),
        ))
    }

    async fn collect(mut stream: NdjsonStream) -> Vec<StreamLine> {
        let mut lines = Vec::new();
        while let Some(item) = stream.next().await {
            lines.push(item.expect("stream item should decode"));
        }
        lines
    }

    #[tokio::test]
    async fn yields_one_event_per_line() {
        let stream = stream_of(vec![Bytes::from_static(b"{\"type\":\"gameStart\"}\n{\"type\":\"challenge\"}\n")]);
        let lines = collect(stream).await;

        assert_eq!(
            lines,
            vec![
                StreamLine::Event(json!({"type": "gameStart"})),
                StreamLine::Event(json!({"type": "challenge"})),
            ]
        );
    }

    #[tokio::test]
    async fn blank_lines_are_keepalives() {
        let stream = stream_of(vec![Bytes::from_static(b"\n{\"ok\":true}\n\n")]);
        let lines = collect(stream).await;

        assert_eq!(
            lines,
            vec![
                StreamLine::KeepAlive,
                StreamLine::Event(json!({"ok": true})),
                StreamLine::KeepAlive,
            ]
        );
    }

    #[tokio::test]
    async fn lines_split_across_chunks_are_reassembled() {
        let stream = stream_of(vec![
            Bytes::from_static(b"{\"type\":\"game"),
            Bytes::from_static(b"Start\"}\n"),
        ]);
        let lines = collect(stream).await;

        assert_eq!(lines, vec![StreamLine::Event(json!({"type": "gameStart"}))]);
    }

    #[tokio::test]
    async fn final_unterminated_line_is_yielded() {
        let stream = stream_of(vec![Bytes::from_static(b"{\"a\":1}\n{\"b\":2}")]);
        let lines = collect(stream).await;

        assert_eq!(
            lines,
            vec![
                StreamLine::Event(json!({"a": 1})),
                StreamLine::Event(json!({"b": 2})),
            ]
        );
    }

    #[tokio::test]
    async fn carriage_returns_are_stripped() {
        let stream = stream_of(vec![Bytes::from_static(b"{\"a\":1}\r\n\r\n")]);
        let lines = collect(stream).await;

        assert_eq!(
            lines,
            vec![StreamLine::Event(json!({"a": 1})), StreamLine::KeepAlive]
        );
    }

    #[tokio::test]
    async fn invalid_json_surfaces_a_decode_error() {
        let mut stream = stream_of(vec![Bytes::from_static(b"not json\n")]);
        let err = stream
            .next()
            .await
            .expect("stream should yield an item")
            .expect_err("line should fail to decode");
        assert!(matches!(err, ApiError::Json(_)));
    }
}
