//! Async retry combinator driven by [`RetryPolicy`].

use std::future::Future;

use marquee_core::{RetryPolicy, UpstreamError};
use tracing::{debug, warn};

/// Run `call` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are used up. The last error is returned unchanged.
///
/// Each attempt is a fresh invocation of `call`; nothing is held across the
/// delay between attempts.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &'static str,
    mut call: F,
) -> Result<T, UpstreamError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    let mut attempts: u32 = 0;
    loop {
        attempts += 1;
        match call().await {
            Ok(value) => {
                if attempts > 1 {
                    debug!(operation, attempts, "Upstream call recovered after retry");
                }
                return Ok(value);
            }
            Err(err) if policy.should_retry(&err, attempts) => {
                warn!(
                    operation,
                    attempt = attempts,
                    max_attempts = policy.max_attempts(),
                    status = err.status(),
                    "Upstream server error, retrying"
                );
                tokio::time::sleep(policy.delay_before_next_attempt()).await;
            }
            Err(err) => {
                if err.is_server() {
                    warn!(operation, attempts, status = err.status(), "Upstream call failed, retries exhausted");
                } else {
                    debug!(operation, status = err.status(), "Upstream rejected call");
                }
                return Err(err);
            }
        }
    }
}
