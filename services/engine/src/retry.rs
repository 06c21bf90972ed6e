use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::future::Future;
use std::time::Duration;

use crate::repository::StoreError;

/// Bounded exponential backoff for store calls that must not be lost
/// (startup load, shutdown snapshot)
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    initial_interval: Duration,
    max_interval: Duration,
    max_elapsed: Duration,
}

impl RetryPolicy {
    pub fn new(initial_interval: Duration, max_interval: Duration, max_elapsed: Duration) -> Self {
        Self {
            initial_interval,
            max_interval,
            max_elapsed,
        }
    }

    /// Gives up almost immediately; used by tests
    pub fn fast() -> Self {
        Self::new(Duration::from_millis(5), Duration::from_millis(10), Duration::from_millis(30))
    }

    pub fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_max_interval(self.max_interval)
            .with_multiplier(2.0)
            .with_max_elapsed_time(Some(self.max_elapsed))
            .build()
    }

    /// Run `operation` until it succeeds, fails permanently or the budget runs out
    pub async fn run<T, F, Fut>(&self, operation_name: &'static str, mut operation: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        backoff::future::retry_notify(
            self.create_backoff(),
            || {
                let attempt = operation();
                async move {
                    attempt.await.map_err(|e| {
                        if e.is_retryable() {
                            backoff::Error::transient(e)
                        } else {
                            backoff::Error::permanent(e)
                        }
                    })
                }
            },
            |e: StoreError, delay: Duration| {
                tracing::warn!(
                    operation = operation_name,
                    error = %e,
                    retry_in_ms = delay.as_millis() as u64,
                    "Store call failed, retrying"
                );
            },
        )
        .await
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(200), Duration::from_secs(5), Duration::from_secs(30))
    }
}
