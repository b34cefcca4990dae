//! Rate limiter configuration.

use std::time::Duration;

use crate::errors::{PluralKitError, PluralKitResult};

/// Default cap on a pause derived from the reset header (5 minutes).
pub const DEFAULT_MAX_RESET_DELAY: Duration = Duration::from_secs(300);

/// Configuration for [`AdaptiveRateLimiter`](super::AdaptiveRateLimiter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Multiplier applied to `min_wait` to get the error window.
    pub error_window_base: u32,
    /// Wait time the limiter starts with.
    pub initial_wait: Duration,
    /// Lowest the wait time can go.
    pub min_wait: Duration,
    /// Highest the wait time can go.
    pub max_wait: Duration,
    /// Step applied to the wait time on each adjustment.
    pub increment: Duration,
    /// Errors inside the window at or above which the wait time grows.
    pub increase_threshold: usize,
    /// Errors inside the window at or below which the wait time shrinks.
    pub decrease_threshold: usize,
    /// Upper bound on a pause derived from `x-ratelimit-reset`.
    pub max_reset_delay: Duration,
    /// Emit debug logs for every adjustment.
    pub debug: bool,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            error_window_base: 5,
            initial_wait: Duration::from_millis(1000),
            min_wait: Duration::from_millis(1000),
            max_wait: Duration::from_millis(3000),
            increment: Duration::from_millis(500),
            increase_threshold: 3,
            decrease_threshold: 0,
            max_reset_delay: DEFAULT_MAX_RESET_DELAY,
            debug: false,
        }
    }
}

impl RateLimiterConfig {
    /// Creates a new configuration with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the error window base.
    pub fn error_window_base(mut self, base: u32) -> Self {
        self.error_window_base = base;
        self
    }

    /// Sets the initial wait time.
    pub fn initial_wait(mut self, wait: Duration) -> Self {
        self.initial_wait = wait;
        self
    }

    /// Sets the minimum wait time.
    pub fn min_wait(mut self, wait: Duration) -> Self {
        self.min_wait = wait;
        self
    }

    /// Sets the maximum wait time.
    pub fn max_wait(mut self, wait: Duration) -> Self {
        self.max_wait = wait;
        self
    }

    /// Sets the adjustment step.
    pub fn increment(mut self, increment: Duration) -> Self {
        self.increment = increment;
        self
    }

    /// Sets the increase threshold.
    pub fn increase_threshold(mut self, threshold: usize) -> Self {
        self.increase_threshold = threshold;
        self
    }

    /// Sets the decrease threshold.
    pub fn decrease_threshold(mut self, threshold: usize) -> Self {
        self.decrease_threshold = threshold;
        self
    }

    /// Sets the cap on a pause derived from the reset header. The pause is
    /// never shorter than the current wait time.
    pub fn max_reset_delay(mut self, delay: Duration) -> Self {
        self.max_reset_delay = delay;
        self
    }

    /// Enables or disables adjustment logging.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Span of time in which errors count towards an adjustment.
    pub fn error_window(&self) -> Duration {
        self.min_wait.saturating_mul(self.error_window_base)
    }

    /// Checks that the bounds are consistent.
    pub fn validate(&self) -> PluralKitResult<()> {
        if self.min_wait > self.max_wait {
            return Err(PluralKitError::configuration(format!(
                "Rate limiter min_wait ({:?}) exceeds max_wait ({:?})",
                self.min_wait, self.max_wait
            )));
        }
        Ok(())
    }
}
