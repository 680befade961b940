//! Retry policy implementation with constant backoff and an elapsed-time budget

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};

use crate::error::Result;

/// Default delay between attempts
const DEFAULT_INTERVAL_MS: u64 = 100;

/// Default total elapsed-time budget across attempts
const DEFAULT_MAX_ELAPSED_SECS: u64 = 60;

/// Retry policy applied to every non-streaming API call.
///
/// Failed attempts repeat at a constant interval until the elapsed-time
/// budget is spent, after which the last error propagates. Whether an error
/// is worth repeating is decided by
/// [`ApiError::should_retry`](crate::ApiError::should_retry).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Delay between attempts
    pub interval: Duration,

    /// Total elapsed-time budget across all attempts
    pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            max_elapsed: Duration::from_secs(DEFAULT_MAX_ELAPSED_SECS),
        }
    }
}

impl RetryPolicy {
    /// Execute a function with retry logic
    ///
    /// The closure is invoked once immediately; transient failures are
    /// repeated while enough budget remains to sleep out the interval first.
    pub async fn execute<F, Fut, T>(&self, mut f: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let start = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            match f().await {
                Ok(result) => return Ok(result),
                Err(e) if !e.should_retry() => return Err(e),
                Err(e) => {
                    if start.elapsed() + self.interval >= self.max_elapsed {
                        tracing::warn!("retry budget exhausted after {} attempts: {}", attempt + 1, e);
                        return Err(e);
                    }
                    attempt += 1;
                    tracing::warn!("attempt {attempt} failed: {e}, retrying in {:?}", self.interval);
                    tokio::time::sleep(self.interval).await;
                }
            }
        }
    }
}
