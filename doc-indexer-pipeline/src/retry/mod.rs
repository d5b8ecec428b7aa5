//! Retry and backoff policy for bulk submissions.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Statuses retried by default: 429 Too Many Requests, 502, 503 and 504.
pub const DEFAULT_RETRY_ON_STATUS: [u16; 4] = [429, 502, 503, 504];

/// Default ceiling on submission attempts, the first one included.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default unit of the linear backoff.
pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_millis(100);

/// Delay before the next attempt, given the number of the attempt that failed.
pub type BackoffFn = Arc<dyn Fn(u32) -> Duration + Send + Sync>;

/// Decides whether a failed item is submitted again, and when.
///
/// Attempts are numbered from 1. An item whose attempt `n` failed with a
/// retryable status is retried after `backoff_delay(n)` as long as
/// `n < max_attempts`.
#[derive(Clone)]
pub struct RetryPolicy {
    retry_on_status: Vec<u16>,
    max_attempts: u32,
    backoff: BackoffFn,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_on_status: DEFAULT_RETRY_ON_STATUS.to_vec(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: linear(DEFAULT_BACKOFF_UNIT),
        }
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("retry_on_status", &self.retry_on_status)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn disabled() -> Self {
        Self::default().with_max_attempts(1)
    }

    /// Set the attempt ceiling. Values below 1 are raised to 1.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Replace the set of retryable statuses.
    pub fn with_retry_on_status(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.retry_on_status = statuses.into_iter().collect();
        self
    }

    /// Use a custom backoff function.
    pub fn with_backoff<F>(mut self, backoff: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        self.backoff = Arc::new(backoff);
        self
    }

    /// Linear backoff: `attempt * unit`.
    pub fn with_linear_backoff(mut self, unit: Duration) -> Self {
        self.backoff = linear(unit);
        self
    }

    /// Exponential backoff starting at `initial` and capped at `max`.
    pub fn with_exponential_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.backoff = Arc::new(move |attempt| {
            let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
            initial.saturating_mul(factor).min(max)
        });
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether the status is one of the configured transient statuses.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retry_on_status.contains(&status)
    }

    /// Whether an item that failed on `attempt` with `status` is tried again.
    pub fn should_retry(&self, attempt: u32, status: u16) -> bool {
        attempt < self.max_attempts && self.is_retryable_status(status)
    }

    /// Whether a request that got no answer on `attempt` is tried again.
    pub fn should_retry_transport(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay to wait after the failed `attempt`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        (self.backoff)(attempt)
    }
}

fn linear(unit: Duration) -> BackoffFn {
    Arc::new(move |attempt| unit.saturating_mul(attempt))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retries_transient_statuses() {
        let policy = RetryPolicy::default();

        for status in [429, 502, 503, 504] {
            assert!(policy.should_retry(1, status), "status {}", status);
        }
        for status in [400, 401, 404, 409, 500] {
            assert!(!policy.should_retry(1, status), "status {}", status);
        }
    }

    #[test]
    fn test_attempt_ceiling() {
        let policy = RetryPolicy::default();

        assert!(policy.should_retry(4, 503));
        assert!(!policy.should_retry(5, 503));
        assert!(!policy.should_retry(6, 503));
        assert!(policy.should_retry_transport(4));
        assert!(!policy.should_retry_transport(5));
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.backoff_delay(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_delay(4), Duration::from_millis(400));
    }

    #[test]
    fn test_custom_backoff() {
        let policy = RetryPolicy::default().with_backoff(|attempt| Duration::from_secs(attempt as u64 * 3));
        assert_eq!(policy.backoff_delay(2), Duration::from_secs(6));
    }

    #[test]
    fn test_exponential_backoff_is_capped() {
        let policy = RetryPolicy::default()
            .with_exponential_backoff(Duration::from_millis(100), Duration::from_millis(500));

        assert_eq!(policy.backoff_delay(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_delay(3), Duration::from_millis(400));
        assert_eq!(policy.backoff_delay(4), Duration::from_millis(500));
        assert_eq!(policy.backoff_delay(40), Duration::from_millis(500));
    }

    #[test]
    fn test_disabled_policy_never_retries() {
        let policy = RetryPolicy::disabled();
        assert_eq!(policy.max_attempts(), 1);
        assert!(!policy.should_retry(1, 503));
        assert!(!policy.should_retry_transport(1));
    }

    #[test]
    fn test_custom_statuses() {
        let policy = RetryPolicy::default().with_retry_on_status([500]);
        assert!(policy.should_retry(1, 500));
        assert!(!policy.should_retry(1, 503));
    }
}
