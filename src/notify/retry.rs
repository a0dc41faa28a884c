//! Backoff schedule for notification retries.

use std::time::Duration;

/// Exponential backoff between delivery attempts.
///
/// The delay before retry `n` (0-indexed) is
/// `initial_delay * multiplier^n`, capped at `max_delay`.
///
/// # Example
///
/// ```
/// use ipwatch::notify::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new()
///     .with_max_attempts(4)
///     .with_initial_delay(Duration::from_secs(1));
///
/// let delays: Vec<_> = policy.delays().collect();
/// assert_eq!(
///     delays,
///     [Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(4)]
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Never below 1.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Growth factor between consecutive delays.
    pub multiplier: f64,
}

impl RetryPolicy {
    /// Default number of attempts.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    /// Default delay before the first retry.
    pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(5);
    /// Default delay cap.
    pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);
    /// Default growth factor.
    pub const DEFAULT_MULTIPLIER: f64 = 2.0;

    /// Creates a policy with the default schedule.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            initial_delay: Self::DEFAULT_INITIAL_DELAY,
            max_delay: Self::DEFAULT_MAX_DELAY,
            multiplier: Self::DEFAULT_MULTIPLIER,
        }
    }

    /// Sets the number of attempts. Values below 1 are raised to 1.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = if max_attempts == 0 { 1 } else { max_attempts };
        self
    }

    /// Sets the delay before the first retry.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the delay cap.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the growth factor. Non-positive or non-finite values are ignored.
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        if multiplier.is_finite() && multiplier > 0.0 {
            self.multiplier = multiplier;
        }
        self
    }

    /// Delay to wait before retry `retry` (0 = before the second attempt).
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = secs.min(self.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(capped).unwrap_or(self.max_delay)
    }

    /// The delays between consecutive attempts, in order.
    ///
    /// Yields `max_attempts - 1` items.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_attempts.saturating_sub(1)).map(|retry| self.delay_for_retry(retry))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}
