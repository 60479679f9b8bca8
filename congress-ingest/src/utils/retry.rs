//! Retry policy for upstream requests
//!
//! Every external call site goes through one [`RetryPolicy`], so backoff
//! schedule and retryable-status rules live in a single place.

use crate::error::ApiError;
use std::future::Future;
use std::time::Duration;

/// Bounded retry with linear backoff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Base delay after a transient failure (network, 5xx, 403)
    pub transient_backoff: Duration,
    /// Base delay after HTTP 429
    pub rate_limit_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            transient_backoff: Duration::from_secs(5),
            rate_limit_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Delay before the next attempt, or `None` to give up.
    ///
    /// `attempt` is the 1-based number of the attempt that just failed; the
    /// delay grows linearly with it.
    pub fn delay_for(&self, err: &ApiError, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }

        match err {
            ApiError::RateLimited => Some(self.rate_limit_backoff * attempt),
            e if e.is_transient() => Some(self.transient_backoff * attempt),
            _ => None,
        }
    }

    /// Run `operation` until it succeeds, fails permanently, or attempts run out.
    ///
    /// **Algorithm:**
    /// 1. Attempt operation
    /// 2. On success, return result
    /// 3. On retryable error with attempts left: log WARN, sleep, retry
    /// 4. Otherwise: log ERROR (unless the error is a plain 404) and return it
    pub async fn run<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            if attempt > 1 {
                tracing::debug!(operation = operation_name, attempt, "Retrying request");
            }

            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => match self.delay_for(&err, attempt) {
                    Some(delay) => {
                        tracing::warn!(
                            operation = operation_name,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "Request failed, backing off"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        if !matches!(err, ApiError::NotFound(_)) {
                            tracing::error!(
                                operation = operation_name,
                                attempt,
                                error = %err,
                                "Request failed, giving up"
                            );
                        }
                        return Err(err);
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            transient_backoff: Duration::from_millis(1),
            rate_limit_backoff: Duration::from_millis(2),
        }
    }

    #[test]
    fn test_delay_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.delay_for(&ApiError::RateLimited, 1),
            Some(Duration::from_secs(60))
        );
        assert_eq!(
            policy.delay_for(&ApiError::RateLimited, 2),
            Some(Duration::from_secs(120))
        );
        assert_eq!(
            policy.delay_for(&ApiError::Network("reset".into()), 2),
            Some(Duration::from_secs(10))
        );
        assert_eq!(policy.delay_for(&ApiError::RateLimited, 3), None);
        assert_eq!(policy.delay_for(&ApiError::Parse("x".into()), 1), None);
        assert_eq!(policy.delay_for(&ApiError::NotFound("x".into()), 1), None);
    }

    #[tokio::test]
    async fn test_recovers_from_transient_failure() {
        let calls = AtomicU32::new(0);

        let result = fast_policy()
            .run("test", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(ApiError::Status(503, "busy".into()))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);

        let result: Result<(), ApiError> = fast_policy()
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ApiError::RateLimited) }
            })
            .await;

        assert!(matches!(result, Err(ApiError::RateLimited)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let calls = AtomicU32::new(0);

        let result: Result<(), ApiError> = fast_policy()
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ApiError::Status(400, "bad request".into())) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
