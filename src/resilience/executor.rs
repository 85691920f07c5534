//! Bounded retry driver.

use std::future::Future;
use std::marker::PhantomData;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::RetryConfig;
use crate::errors::{ErrorKind, PaymentError};
use crate::observability;
use crate::resilience::backoff::backoff_delay;

/// A failed attempt, carrying whatever partial response the provider still
/// produced (some gateways return a decodable body with an error status).
#[derive(Debug)]
pub struct FailedAttempt<T> {
    pub response: Option<T>,
    pub error: PaymentError,
}

impl<T> FailedAttempt<T> {
    pub fn new(error: PaymentError) -> Self {
        Self {
            response: None,
            error,
        }
    }
}

impl<T> From<PaymentError> for FailedAttempt<T> {
    fn from(error: PaymentError) -> Self {
        Self::new(error)
    }
}

/// Outcome of a retried operation.
pub type AttemptOutcome<T> = Result<T, FailedAttempt<T>>;

/// Executes an operation up to `max_attempts` times with exponential
/// backoff. One executor instance serves one response shape; it holds no
/// per-call state and is safe to share.
pub struct RetryExecutor<T> {
    config: RetryConfig,
    _response: PhantomData<fn() -> T>,
}

impl<T> RetryExecutor<T> {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            _response: PhantomData,
        }
    }

    /// Drive `operation` to success or exhaustion.
    ///
    /// Returns immediately on success or on a non-retryable error. After the
    /// final attempt the last observed response/error pair is returned.
    /// Cancellation is observed before each attempt and during the
    /// inter-attempt sleep; a result already in flight when the token fires
    /// is discarded.
    pub async fn execute<F, Fut>(
        &self,
        cancel: &CancellationToken,
        provider: &str,
        mut operation: F,
    ) -> AttemptOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AttemptOutcome<T>>,
    {
        let mut last: Option<FailedAttempt<T>> = None;

        for attempt in 1..=self.config.max_attempts {
            if cancel.is_cancelled() {
                return Err(cancelled());
            }

            observability::record_retry_attempt(provider);
            match operation().await {
                Ok(response) => return Ok(response),
                Err(failed) => {
                    if !failed.error.is_retryable() {
                        return Err(failed);
                    }
                    warn!(
                        provider,
                        attempt,
                        max_attempts = self.config.max_attempts,
                        error = %failed.error,
                        "retryable provider failure"
                    );
                    last = Some(failed);
                }
            }

            if attempt == self.config.max_attempts {
                break;
            }

            let delay = backoff_delay(attempt, &self.config);
            debug!(provider, attempt, ?delay, "backing off before retry");
            tokio::select! {
                _ = cancel.cancelled() => return Err(cancelled()),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        Err(last.unwrap_or_else(|| {
            FailedAttempt::new(PaymentError::new(
                ErrorKind::ProviderError,
                "retry attempts exhausted",
            ))
        }))
    }
}

fn cancelled<T>() -> FailedAttempt<T> {
    FailedAttempt::new(PaymentError::new(
        ErrorKind::Cancelled,
        "operation cancelled by caller",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay_ms: 10,
            max_delay_ms: 50,
            multiplier: 2.0,
            enable_jitter: false,
        }
    }

    fn retryable_failure() -> FailedAttempt<u32> {
        FailedAttempt::new(PaymentError::new(ErrorKind::NetworkError, "refused"))
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let executor = RetryExecutor::new(fast_config(5));
        let attempts = Arc::new(AtomicU32::new(0));

        let result = executor
            .execute(&CancellationToken::new(), "test", || {
                let attempts = Arc::clone(&attempts);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_always_failing_runs_exactly_max_attempts() {
        let executor = RetryExecutor::new(fast_config(4));
        let attempts = Arc::new(AtomicU32::new(0));

        let result: AttemptOutcome<u32> = executor
            .execute(&CancellationToken::new(), "test", || {
                let attempts = Arc::clone(&attempts);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(retryable_failure())
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_non_retryable_stops_after_one_attempt() {
        let executor = RetryExecutor::new(fast_config(5));
        let attempts = Arc::new(AtomicU32::new(0));

        let result: AttemptOutcome<u32> = executor
            .execute(&CancellationToken::new(), "test", || {
                let attempts = Arc::clone(&attempts);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(FailedAttempt::new(PaymentError::new(
                        ErrorKind::PaymentDeclined,
                        "declined",
                    )))
                }
            })
            .await;

        assert_eq!(
            result.unwrap_err().error.kind(),
            ErrorKind::PaymentDeclined
        );
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_attempt_runs_nothing() {
        let executor = RetryExecutor::new(fast_config(5));
        let attempts = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result: AttemptOutcome<u32> = executor
            .execute(&cancel, "test", || {
                let attempts = Arc::clone(&attempts);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                }
            })
            .await;

        assert_eq!(result.unwrap_err().error.kind(), ErrorKind::Cancelled);
        assert_eq!(attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancellation_during_backoff_sleep() {
        let config = RetryConfig {
            max_attempts: 3,
            initial_delay_ms: 5_000,
            max_delay_ms: 5_000,
            multiplier: 2.0,
            enable_jitter: false,
        };
        let executor = RetryExecutor::new(config);
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let started = Instant::now();
        let result: AttemptOutcome<u32> = executor
            .execute(&cancel, "test", || async { Err(retryable_failure()) })
            .await;

        assert_eq!(result.unwrap_err().error.kind(), ErrorKind::Cancelled);
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "cancellation should interrupt the sleep"
        );
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_transient_failures() {
        let executor = RetryExecutor::new(fast_config(5));
        let attempts = Arc::new(AtomicU32::new(0));

        let result = executor
            .execute(&CancellationToken::new(), "test", || {
                let attempts = Arc::clone(&attempts);
                async move {
                    if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(retryable_failure())
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_last_partial_response_surfaced_on_exhaustion() {
        let executor = RetryExecutor::new(fast_config(2));
        let attempts = Arc::new(AtomicU32::new(0));

        let result: AttemptOutcome<u32> = executor
            .execute(&CancellationToken::new(), "test", || {
                let attempts = Arc::clone(&attempts);
                async move {
                    let n = attempts.fetch_add(1, Ordering::SeqCst);
                    Err(FailedAttempt {
                        response: Some(n),
                        error: PaymentError::new(ErrorKind::ProviderError, "error body"),
                    })
                }
            })
            .await;

        let failed = result.unwrap_err();
        assert_eq!(failed.response, Some(1), "last attempt's body expected");
    }

    #[tokio::test]
    async fn test_elapsed_time_bounded_by_backoff_sum() {
        let executor = RetryExecutor::new(fast_config(3)); // delays 10ms, 20ms
        let started = Instant::now();
        let _: AttemptOutcome<u32> = executor
            .execute(&CancellationToken::new(), "test", || async {
                Err(retryable_failure())
            })
            .await;
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_millis(30), "below delay sum");
        assert!(elapsed < Duration::from_millis(500), "unexpectedly slow");
    }
}
