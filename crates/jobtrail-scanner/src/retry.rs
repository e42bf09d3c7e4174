//! Bounded retry with exponential backoff.

use crate::error::ScanError;
use jobtrail_browser::BrowserError;
use jobtrail_core::RetryPolicy;
use std::fmt::Display;
use std::future::Future;
use tracing::{error, warn};

/// Errors that know whether a fresh attempt could succeed.
pub trait Retryable {
    fn is_transient(&self) -> bool;
}

impl Retryable for ScanError {
    fn is_transient(&self) -> bool {
        ScanError::is_transient(self)
    }
}

impl Retryable for BrowserError {
    fn is_transient(&self) -> bool {
        BrowserError::is_transient(self)
    }
}

/// Run `task_fn` until it succeeds, fails permanently, or runs out of
/// attempts.
///
/// Only transient errors are retried. After failed attempt `n` the wait is
/// [`RetryPolicy::backoff_delay`]`(n)`. The last error is returned unchanged.
pub async fn retry_with_backoff<F, Fut, T, E>(policy: &RetryPolicy, mut task_fn: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match task_fn().await {
            Ok(result) => return Ok(result),
            Err(e) if !e.is_transient() => {
                error!("Attempt {} failed permanently: {}", attempt, e);
                return Err(e);
            }
            Err(e) => {
                if attempt >= max_attempts {
                    error!(
                        "Task failed after {} attempts (max: {}): {}",
                        attempt, max_attempts, e
                    );
                    return Err(e);
                }

                let delay = policy.backoff_delay(attempt);
                warn!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}...",
                    attempt, max_attempts, e, delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }

    unreachable!("Loop should have returned via Ok or Err")
}
