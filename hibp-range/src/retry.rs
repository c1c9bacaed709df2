use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::Error;

/// Base delay for exponential backoff (doubles each retry)
pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

/// Caller-level retry for transient lookup failures.
///
/// The default performs no retries, so each evaluation is a single protocol round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    pub const fn none() -> Self {
        Self { max_retries: 0, base_delay: RETRY_BASE_DELAY }
    }

    pub const fn exponential(max_retries: u32) -> Self {
        Self { max_retries, base_delay: RETRY_BASE_DELAY }
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1 << attempt.saturating_sub(1).min(10))
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or the
    /// retries are used up. The last error is returned as-is.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.delay_for(attempt);
                    warn!(error = %e, attempt, ?delay, "transient lookup failure, retrying");
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }
}
