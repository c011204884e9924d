use std::future::Future;
use std::time::Duration;

use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;

use crate::config::ScraperConfig;
use crate::utils::error::FetchError;

/// Fixed-delay retry applied to transient fetch failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl From<&ScraperConfig> for RetryPolicy {
    fn from(config: &ScraperConfig) -> Self {
        Self::new(config.retry_attempts, config.retry_delay())
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Run `operation` until it succeeds, fails with a non-transient error,
    /// or `max_attempts` attempts have been made.
    ///
    /// Transient failures that use up the budget come back as
    /// [`FetchError::Exhausted`]; any other error is returned as-is after
    /// the first attempt that produced it.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let strategy = FixedInterval::new(self.delay).take(self.max_attempts.saturating_sub(1) as usize);
        let max_attempts = self.max_attempts;
        let mut attempts = 0u32;

        let result = RetryIf::start(
            strategy,
            || {
                attempts += 1;
                let attempt = attempts;
                let fut = operation();
                async move {
                    fut.await.inspect_err(|e| {
                        if e.is_transient() {
                            tracing::warn!(attempt, max_attempts, "Attempt {} failed: {}", attempt, e);
                        }
                    })
                }
            },
            FetchError::is_transient,
        )
        .await;

        match result {
            Err(FetchError::Transient(cause)) => Err(FetchError::Exhausted {
                attempts,
                last_cause: cause,
            }),
            other => other,
        }
    }
}
