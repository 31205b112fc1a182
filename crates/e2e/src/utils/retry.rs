//! Linear-backoff retry for flaky async actions

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// How often and how patiently to retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Base delay; attempt `n` waits `delay * n` before the next try
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// Run `action` until it succeeds or the policy is exhausted.
///
/// The error of the final attempt is returned.
pub async fn retry<F, Fut, T, E>(mut action: F, policy: RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match action().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(e) => {
                warn!("Attempt {}/{} failed: {}", attempt, max_attempts, e);
                tokio::time::sleep(policy.delay * attempt).await;
                attempt += 1;
            }
        }
    }
}
