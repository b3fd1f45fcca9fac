//! Exponential backoff schedule for transient failures

use crate::config::RetryConfig;
use std::time::Duration;

/// Retry budget and delay schedule
///
/// `delay = base * factor^retry`, capped at `max_delay`. With `factor > 1`
/// the schedule strictly increases until it reaches the cap.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    /// Total attempts per request, including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Growth per retry
    pub factor: f64,
    /// Cap for any single delay
    pub max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl BackoffPolicy {
    /// Creates a policy from the retry configuration
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            factor: config.factor,
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }

    /// Delay to wait after the `retry`-th failed attempt (0-based)
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let millis = self.base_delay.as_millis() as f64 * self.factor.powi(exponent);
        let cap = self.max_delay.as_millis() as f64;

        if !millis.is_finite() || millis >= cap {
            self.max_delay
        } else {
            Duration::from_millis(millis as u64)
        }
    }

    /// Returns true if another attempt is allowed after `attempts_made`
    #[must_use]
    pub fn should_retry(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }

    /// The full list of delays between attempts
    #[must_use]
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_attempts.saturating_sub(1))
            .map(|retry| self.delay_for(retry))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_policy() -> BackoffPolicy {
        BackoffPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            factor: 2.0,
            max_delay: Duration::from_millis(30_000),
        }
    }

    #[test]
    fn test_default_matches_config_defaults() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_exponential_growth() {
        let policy = create_test_policy();
        assert_eq!(policy.delay_for(0), Duration::from_millis(500));
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
    }

    #[test]
    fn test_schedule_strictly_increasing() {
        let policy = BackoffPolicy {
            max_attempts: 6,
            ..create_test_policy()
        };
        let schedule = policy.schedule();
        assert_eq!(schedule.len(), 5);
        for pair in schedule.windows(2) {
            assert!(pair[0] < pair[1], "{:?} !< {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_delay_capped() {
        let policy = create_test_policy();
        assert_eq!(policy.delay_for(20), Duration::from_millis(30_000));
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_millis(30_000));
    }

    #[test]
    fn test_should_retry() {
        let policy = create_test_policy();
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
    }

    #[test]
    fn test_single_attempt_has_empty_schedule() {
        let policy = BackoffPolicy {
            max_attempts: 1,
            ..create_test_policy()
        };
        assert!(policy.schedule().is_empty());
        assert!(!policy.should_retry(1));
    }
}
