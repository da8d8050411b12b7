//! Retry budget and backoff schedule.

use std::time::Duration;

/// Bounded retry budget with capped exponential backoff.
///
/// `max_retries` counts retries, so a call is attempted at most
/// `max_retries + 1` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Delay before the first retry
    pub base: Duration,
    /// Upper bound for any single delay
    pub cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base: Duration::from_secs(2),
            cap: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base: Duration, cap: Duration) -> Self {
        Self {
            max_retries,
            base,
            cap,
        }
    }

    /// Policy with no delay between attempts.
    pub fn immediate(max_retries: u32) -> Self {
        Self::new(max_retries, Duration::ZERO, Duration::ZERO)
    }

    /// Build from the `retry_backoff` seconds value used in config files.
    ///
    /// Negative and NaN values become zero; values too large for a
    /// [`Duration`] saturate.
    pub fn from_secs_f64(max_retries: u32, backoff_secs: f64, cap_secs: f64) -> Self {
        Self::new(max_retries, secs_to_duration(backoff_secs), secs_to_duration(cap_secs))
    }

    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay after failed attempt `attempt` (zero-based):
    /// `min(base * 2^attempt, cap)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base
            .checked_mul(factor)
            .unwrap_or(Duration::MAX)
            .min(self.cap)
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_then_caps() {
        let policy = RetryPolicy::new(5, Duration::from_secs(2), Duration::from_secs(10));
        assert_eq!(policy.backoff(0), Duration::from_secs(2));
        assert_eq!(policy.backoff(1), Duration::from_secs(4));
        assert_eq!(policy.backoff(2), Duration::from_secs(8));
        assert_eq!(policy.backoff(3), Duration::from_secs(10));
        assert_eq!(policy.backoff(40), Duration::from_secs(10));
    }

    #[test]
    fn test_total_attempts() {
        assert_eq!(RetryPolicy::immediate(0).total_attempts(), 1);
        assert_eq!(RetryPolicy::immediate(2).total_attempts(), 3);
    }

    #[test]
    fn test_from_secs_f64() {
        let policy = RetryPolicy::from_secs_f64(3, 0.5, 4.0);
        assert_eq!(policy.backoff(0), Duration::from_millis(500));
        assert_eq!(policy.backoff(4), Duration::from_secs(4));
    }

    #[test]
    fn test_from_secs_f64_out_of_range() {
        let policy = RetryPolicy::from_secs_f64(3, f64::NAN, 1e300);
        assert_eq!(policy.base, Duration::ZERO);
        assert_eq!(policy.cap, Duration::MAX);

        let policy = RetryPolicy::from_secs_f64(3, f64::INFINITY, -1.0);
        assert_eq!(policy.base, Duration::MAX);
        assert_eq!(policy.cap, Duration::ZERO);
    }

    #[test]
    fn test_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.base, Duration::from_secs(2));
    }
}
