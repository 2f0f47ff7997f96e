//! Retry policy: per-call timeout and backoff control.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeout and retry parameters for every model call.
///
/// `max_retries` is the total number of attempts, not the number of
/// retries after the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Backoff unit; transient failures wait `base × 2^attempt`
    pub base_delay: Duration,
    /// Upper bound on one attempt
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    // ==================== Builder Methods ====================

    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max.max(1);
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wait before the next attempt after a transient failure on `attempt` (0-based)
    pub fn transient_backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Wait before the next attempt after a rate-limit response on `attempt` (0-based)
    pub fn rate_limit_backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_add(2)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_backoff_schedule() {
        let policy = RetryPolicy::default();
        let transient: Vec<u64> = (0..3).map(|a| policy.transient_backoff(a).as_secs()).collect();
        let throttled: Vec<u64> = (0..3).map(|a| policy.rate_limit_backoff(a).as_secs()).collect();
        assert_eq!(transient, vec![1, 2, 4]);
        assert_eq!(throttled, vec![4, 8, 16]);
    }

    #[test]
    fn test_at_least_one_attempt() {
        assert_eq!(RetryPolicy::default().with_max_retries(0).max_retries, 1);
    }
}
