//! Adaptive rate limiter.
//!
//! Keeps the instants of recent `429` answers and nudges a bounded wait
//! time up while they pile up and back down once they age out of the error
//! window. Whenever the API throttles, or reports that no requests remain,
//! the limiter holds every caller of [`RateLimiter::wait`] until a reset
//! instant computed from the wait time and the `x-ratelimit-reset` header.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use super::{is_rate_limit, rate_limit_response, RateLimitHeaders, RateLimitable, RateLimiter};
use super::RateLimiterConfig;
use crate::errors::{PluralKitError, PluralKitResult};

/// Mutable state, only touched under the limiter's lock.
#[derive(Debug)]
struct LimiterState {
    /// Instants of recorded rate limit errors, oldest first.
    error_timestamps: Vec<Instant>,
    /// Current wait time, always within `[min_wait, max_wait]`.
    wait_time: Duration,
    /// Requests must not be sent before this instant.
    reset_at: Option<Instant>,
}

/// Rate limiter that adapts its backoff to how often the API throttles.
///
/// # Example
///
/// ```rust,no_run
/// use pluralkit_client::resilience::{AdaptiveRateLimiter, RateLimiter, RateLimiterConfig};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let limiter = AdaptiveRateLimiter::new(RateLimiterConfig::default())?;
/// limiter.wait().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AdaptiveRateLimiter {
    config: RateLimiterConfig,
    state: Mutex<LimiterState>,
}

impl AdaptiveRateLimiter {
    /// Creates a limiter, rejecting inconsistent bounds.
    ///
    /// The initial wait time is clamped into `[min_wait, max_wait]`.
    pub fn new(config: RateLimiterConfig) -> PluralKitResult<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: RateLimiterConfig) -> Self {
        let wait_time = config.initial_wait.clamp(config.min_wait, config.max_wait);
        Self {
            state: Mutex::new(LimiterState {
                error_timestamps: Vec::new(),
                wait_time,
                reset_at: None,
            }),
            config,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    /// Returns the current adaptive wait time.
    pub fn wait_time(&self) -> Duration {
        self.state.lock().wait_time
    }

    /// Returns the number of recorded errors, including ones that will be
    /// pruned at the next adjustment.
    pub fn error_count(&self) -> usize {
        self.state.lock().error_timestamps.len()
    }

    /// Time left until requests may resume, zero if not throttled.
    pub fn time_until_reset(&self) -> Duration {
        self.state
            .lock()
            .reset_at
            .map(|reset_at| reset_at.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::ZERO)
    }

    /// Records an outcome: optionally logs an error, adapts the wait time,
    /// then pushes the reset instant out if the API throttled.
    fn observe(&self, response: &dyn RateLimitable, record_error: bool) {
        let rate_limited = is_rate_limit(response);
        let headers = RateLimitHeaders::from_response(response);
        let now = Instant::now();

        let mut state = self.state.lock();
        if record_error {
            state.error_timestamps.push(now);
        }
        self.adjust_wait_time(&mut state, now);

        if rate_limited || headers.is_exhausted() {
            self.schedule_reset(&mut state, now, &headers, rate_limited);
        }
    }

    fn adjust_wait_time(&self, state: &mut LimiterState, now: Instant) {
        // Timestamps are appended in order, so everything before the cutoff
        // is a prefix.
        if let Some(cutoff) = now.checked_sub(self.config.error_window()) {
            let stale = state.error_timestamps.partition_point(|t| *t <= cutoff);
            state.error_timestamps.drain(..stale);
        }

        let errors = state.error_timestamps.len();
        let previous = state.wait_time;

        if errors >= self.config.increase_threshold && state.wait_time != self.config.max_wait {
            state.wait_time = state
                .wait_time
                .saturating_add(self.config.increment)
                .min(self.config.max_wait);
            if self.config.debug {
                debug!(
                    errors,
                    previous_ms = previous.as_millis() as u64,
                    wait_ms = state.wait_time.as_millis() as u64,
                    "ratelimit: error threshold exceeded, increased wait time"
                );
            }
        } else if errors <= self.config.decrease_threshold
            && state.wait_time != self.config.min_wait
        {
            state.wait_time = state
                .wait_time
                .saturating_sub(self.config.increment)
                .max(self.config.min_wait);
            if self.config.debug {
                debug!(
                    errors,
                    previous_ms = previous.as_millis() as u64,
                    wait_ms = state.wait_time.as_millis() as u64,
                    "ratelimit: error threshold reset, decreased wait time"
                );
            }
        }
    }

    fn schedule_reset(
        &self,
        state: &mut LimiterState,
        now: Instant,
        headers: &RateLimitHeaders,
        rate_limited: bool,
    ) {
        let delay = match headers.reset {
            Some(reset) => {
                let until_reset =
                    u64::try_from(reset.saturating_sub(Utc::now().timestamp())).unwrap_or(0);
                Duration::from_secs(until_reset)
                    .min(self.config.max_reset_delay)
                    .max(state.wait_time)
            }
            None => state.wait_time,
        };

        let candidate = now + delay;
        let reset_at = match state.reset_at {
            Some(existing) if existing > candidate => existing,
            _ => candidate,
        };
        state.reset_at = Some(reset_at);

        if self.config.debug {
            debug!(
                kind = if rate_limited { "triggered" } else { "hit" },
                delay_ms = delay.as_millis() as u64,
                "ratelimit: requests paused"
            );
        }
    }
}

impl Default for AdaptiveRateLimiter {
    fn default() -> Self {
        Self::from_validated(RateLimiterConfig::default())
    }
}

#[async_trait]
impl RateLimiter for AdaptiveRateLimiter {
    fn handle_response(&self, response: &dyn RateLimitable) {
        self.observe(response, is_rate_limit(response));
    }

    fn handle_error(&self, error: &PluralKitError) -> bool {
        let Some(response) = rate_limit_response(error) else {
            return false;
        };

        if self.config.debug {
            debug!(status = response.status, "ratelimit: absorbed rate limited response");
        }
        self.observe(response, true);
        true
    }

    async fn wait(&self) {
        let reset_at = self.state.lock().reset_at;
        let Some(reset_at) = reset_at else {
            return;
        };

        if reset_at <= Instant::now() {
            return;
        }

        if self.config.debug {
            debug!(
                wait_ms = reset_at.saturating_duration_since(Instant::now()).as_millis() as u64,
                "ratelimit: waiting for reset"
            );
        }
        tokio::time::sleep_until(reset_at).await;
    }
}
