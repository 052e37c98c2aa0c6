//! Reconnect delay policy.

use std::time::Duration;

/// Capped exponential backoff: `min(base * 2^retry, max)`.
///
/// # Examples
///
/// ```
/// use execwatch_core::BackoffPolicy;
/// use std::time::Duration;
///
/// let policy = BackoffPolicy::default();
/// assert_eq!(policy.delay(0), Duration::from_millis(1000));
/// assert_eq!(policy.delay(3), Duration::from_millis(8000));
/// assert_eq!(policy.delay(40), Duration::from_millis(30000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackoffPolicy {
    base: Duration,
    max: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(1000),
            max: Duration::from_millis(30_000),
        }
    }
}

impl BackoffPolicy {
    /// Create a policy with the given initial delay and ceiling.
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    /// Initial delay.
    pub fn base(&self) -> Duration {
        self.base
    }

    /// Ceiling no delay exceeds.
    pub fn max(&self) -> Duration {
        self.max
    }

    /// Delay before the reconnect that follows `retry` consecutive failures.
    pub fn delay(&self, retry: u32) -> Duration {
        let factor = 2u32.checked_pow(retry).unwrap_or(u32::MAX);
        self.base
            .checked_mul(factor)
            .map_or(self.max, |delay| delay.min(self.max))
    }

    /// The first `attempts` delays in order.
    pub fn schedule(&self, attempts: u32) -> Vec<Duration> {
        (0..attempts).map(|retry| self.delay(retry)).collect()
    }
}
