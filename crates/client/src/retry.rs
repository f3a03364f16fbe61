//! Bounded retry for remote store calls.
//!
//! Every network call the client makes goes through [`with_retry`] so
//! transient failures are handled in one place instead of at each call
//! site. Auth failures are surfaced immediately.

use std::future::Future;
use std::time::Duration;

use crate::store::StoreError;

/// Tunable parameters for the bounded-retry strategy.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// attempt budget is exhausted. The final error is surfaced to the caller.
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    op_name: &str,
    mut op: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < config.max_attempts => {
                tracing::warn!(
                    op = op_name,
                    attempt,
                    max_attempts = config.max_attempts,
                    error = %e,
                    "Store call failed, retrying",
                );
                tokio::time::sleep(config.delay).await;
            }
            Err(e) => {
                tracing::error!(op = op_name, attempt, error = %e, "Store call failed");
                return Err(e);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
