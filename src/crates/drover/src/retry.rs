//! Retry policy for sink sends
//!
//! Linear capped backoff: each failed attempt waits one more base delay
//! than the last, up to a fixed ceiling.

use crate::config::RetryConfig;
use std::time::Duration;

/// Attempt budget and backoff schedule for a single record send
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total send attempts per record
    pub max_retries: u32,

    /// Base backoff delay in milliseconds
    pub backoff_ms: u64,

    /// Upper bound on the backoff delay in milliseconds
    pub backoff_cap_ms: u64,

    /// How long to wait for the sink's acknowledgment per attempt
    pub ack_timeout: Duration,
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(max_retries: u32, backoff_ms: u64, backoff_cap_ms: u64, ack_timeout_secs: u64) -> Self {
        Self {
            max_retries,
            backoff_ms,
            backoff_cap_ms,
            ack_timeout: Duration::from_secs(ack_timeout_secs),
        }
    }

    /// Calculate the delay after a given failed attempt (1-indexed)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay_ms = self.backoff_ms.saturating_mul(attempt as u64);
        Duration::from_millis(delay_ms.min(self.backoff_cap_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            config.backoff_ms,
            config.backoff_cap_ms,
            config.ack_timeout_secs,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_grows_linearly() {
        let policy = RetryPolicy::new(5, 1_000, 10_000, 10);

        assert_eq!(policy.delay_for(1).as_millis(), 1_000);
        assert_eq!(policy.delay_for(2).as_millis(), 2_000);
        assert_eq!(policy.delay_for(3).as_millis(), 3_000);
        assert_eq!(policy.delay_for(4).as_millis(), 4_000);
    }

    #[test]
    fn test_delay_capped() {
        let policy = RetryPolicy::new(20, 1_000, 10_000, 10);

        assert_eq!(policy.delay_for(10).as_millis(), 10_000);
        assert_eq!(policy.delay_for(11).as_millis(), 10_000);
        assert_eq!(policy.delay_for(100).as_millis(), 10_000);
    }

    #[test]
    fn test_delay_cap_with_small_base() {
        let policy = RetryPolicy::new(10, 300, 1_000, 10);

        assert_eq!(policy.delay_for(1).as_millis(), 300);
        assert_eq!(policy.delay_for(3).as_millis(), 900);
        // 4 * 300 = 1200, capped at 1000
        assert_eq!(policy.delay_for(4).as_millis(), 1_000);
    }

    #[test]
    fn test_delay_survives_huge_attempt_numbers() {
        let policy = RetryPolicy::new(5, u64::MAX / 2, 10_000, 10);
        assert_eq!(policy.delay_for(u32::MAX).as_millis(), 10_000);
    }

    #[test]
    fn test_from_config() {
        let config = RetryConfig {
            max_retries: 7,
            backoff_ms: 500,
            backoff_cap_ms: 2_000,
            ack_timeout_secs: 3,
        };

        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_retries, 7);
        assert_eq!(policy.delay_for(1).as_millis(), 500);
        assert_eq!(policy.delay_for(5).as_millis(), 2_000);
        assert_eq!(policy.ack_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_default_matches_config_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.delay_for(1).as_millis(), 1_000);
        assert_eq!(policy.ack_timeout, Duration::from_secs(10));
    }
}
