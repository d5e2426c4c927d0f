//! Retry policy for upstream calls.
//!
//! The policy is a pure decision over the classified error and the number of
//! attempts already made; the async loop that sleeps and re-issues the call
//! lives with the HTTP clients.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::UpstreamError;

/// Fixed-delay retry policy that only retries upstream server failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries allowed after the initial attempt.
    pub max_retries: u32,
    /// Pause between two attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Policy that never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Total attempts including the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Whether another attempt should follow `attempts_so_far` failed ones.
    ///
    /// Client errors (including not-found) are terminal on first occurrence.
    pub fn should_retry(&self, error: &UpstreamError, attempts_so_far: u32) -> bool {
        error.is_server() && attempts_so_far < self.max_attempts()
    }

    pub fn delay_before_next_attempt(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_allows_four_attempts() {
        let policy = RetryPolicy::default();
        let err = UpstreamError::server(500, "boom");
        assert!(policy.should_retry(&err, 1));
        assert!(policy.should_retry(&err, 2));
        assert!(policy.should_retry(&err, 3));
        assert!(!policy.should_retry(&err, 4));
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.delay_before_next_attempt(), Duration::from_secs(1));
    }

    #[test]
    fn test_client_errors_never_retried() {
        let policy = RetryPolicy::default();
        assert!(!policy.should_retry(&UpstreamError::not_found("missing"), 1));
        assert!(!policy.should_retry(&UpstreamError::client(400, "bad"), 1));
    }

    #[test]
    fn test_none_policy_is_single_shot() {
        let policy = RetryPolicy::none();
        assert_eq!(policy.max_attempts(), 1);
        assert!(!policy.should_retry(&UpstreamError::server(500, "boom"), 1));
    }

    proptest! {
        #[test]
        fn prop_server_errors_retried_until_budget(max_retries in 0u32..10, attempts in 1u32..20) {
            let policy = RetryPolicy::new(max_retries, Duration::from_millis(1));
            let err = UpstreamError::server(503, "unavailable");
            prop_assert_eq!(policy.should_retry(&err, attempts), attempts <= max_retries);
        }

        #[test]
        fn prop_client_errors_terminal(status in 400u16..500, attempts in 1u32..20) {
            let policy = RetryPolicy::new(10, Duration::from_millis(1));
            prop_assert!(!policy.should_retry(&UpstreamError::client(status, "x"), attempts));
        }
    }
}
