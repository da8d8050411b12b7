//! Bounded retry wrapper.

use crate::config::RetryPolicy;
use std::future::Future;
use tracing::{debug, warn};

/// Why a retried operation gave up
#[derive(Debug, Clone, PartialEq)]
pub enum RetryFailure<E> {
    /// Every attempt failed with a transient error
    Exhausted { attempts: u32, last_error: E },
    /// A non-transient error stopped the loop early
    Fatal { attempts: u32, error: E },
}

impl<E> RetryFailure<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryFailure::Exhausted { attempts, .. } | RetryFailure::Fatal { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn into_error(self) -> E {
        match self {
            RetryFailure::Exhausted { last_error, .. } => last_error,
            RetryFailure::Fatal { error, .. } => error,
        }
    }
}

/// Run `op` up to `policy.total_attempts()` times.
///
/// `op` receives the zero-based attempt number. Errors for which
/// `is_transient` returns false end the loop immediately. Between attempts
/// the task sleeps for `policy.backoff(attempt)`.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    is_transient: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, RetryFailure<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let total = policy.total_attempts();
    let mut attempt = 0;

    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("{} succeeded on attempt {}/{}", label, attempt + 1, total);
                }
                return Ok(value);
            }
            Err(error) if !is_transient(&error) => {
                return Err(RetryFailure::Fatal {
                    attempts: attempt + 1,
                    error,
                });
            }
            Err(error) => {
                if attempt + 1 >= total {
                    warn!("{} failed after {} attempts: {}", label, total, error);
                    return Err(RetryFailure::Exhausted {
                        attempts: total,
                        last_error: error,
                    });
                }
                let delay = policy.backoff(attempt);
                warn!(
                    "{} attempt {}/{} failed: {} (retrying in {:?})",
                    label,
                    attempt + 1,
                    total,
                    error,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<&str, RetryFailure<String>> =
            retry_with_backoff(&RetryPolicy::immediate(3), "op", |_| true, |_| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err("flaky".to_string())
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_budget() {
        let calls = AtomicU32::new(0);
        let result: Result<(), RetryFailure<String>> =
            retry_with_backoff(&RetryPolicy::immediate(2), "op", |_| true, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("down".to_string()) }
            })
            .await;

        assert_eq!(
            result.unwrap_err(),
            RetryFailure::Exhausted {
                attempts: 3,
                last_error: "down".to_string()
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fatal_error_stops_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), RetryFailure<String>> =
            retry_with_backoff(&RetryPolicy::immediate(5), "op", |_| false, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("denied".to_string()) }
            })
            .await;

        let failure = result.unwrap_err();
        assert_eq!(failure.attempts(), 1);
        assert_eq!(failure.into_error(), "denied");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleeps_follow_backoff_schedule() {
        use std::time::Duration;
        let policy = RetryPolicy::new(3, Duration::from_secs(2), Duration::from_secs(5));
        let start = tokio::time::Instant::now();
        let _: Result<(), RetryFailure<String>> =
            retry_with_backoff(&policy, "op", |_| true, |_| async { Err("down".to_string()) })
                .await;
        // 2s + 4s + 5s (capped)
        assert_eq!(start.elapsed(), Duration::from_secs(11));
    }
}
