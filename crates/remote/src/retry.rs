//! Bounded retries for manifest service calls

use crate::config::RetryConfig;
use crate::error::{RemoteError, Result};
use backoff::backoff::Backoff;
use std::future::Future;
use tracing::{debug, warn};

/// Run `call` until it succeeds, fails permanently or runs out of attempts
///
/// Only [transient](RemoteError::is_transient) errors are retried. When the
/// last attempt fails the error is wrapped in [`RemoteError::RetryExhausted`]
/// carrying the attempt count and the final cause.
pub async fn retry_with_backoff<F, Fut, T>(
    config: &RetryConfig,
    operation: &str,
    mut call: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let budget = config.attempts();
    let mut schedule = config.schedule();
    let mut attempt = 1;

    loop {
        let err = match call().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation, attempt, "Manifest service call recovered");
                }
                return Ok(value);
            }
            Err(err) if !err.is_transient() => {
                debug!(operation, error = %err, "Permanent failure, not retrying");
                return Err(err);
            }
            Err(err) => err,
        };

        let delay = if attempt < budget { schedule.next_backoff() } else { None };
        let Some(delay) = delay else {
            warn!(operation, attempts = attempt, error = %err, "Giving up on manifest service call");
            return Err(RemoteError::retry_exhausted(operation, attempt, &err));
        };

        warn!(
            operation,
            attempt,
            error = %err,
            retry_in_ms = delay.as_millis(),
            "Manifest service call failed, backing off"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
