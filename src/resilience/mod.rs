//! Client-side rate limiting for the PluralKit client.
//!
//! Every outbound request is bracketed by a [`RateLimiter`]: the client
//! calls [`RateLimiter::wait`] before sending, then reports the outcome
//! through [`RateLimiter::handle_response`] or [`RateLimiter::handle_error`].
//! Two implementations exist:
//!
//! - [`AdaptiveRateLimiter`] tracks recent `429 Too Many Requests` answers,
//!   adapts a bounded wait time and honours the `x-ratelimit-*` headers.
//! - [`NullRateLimiter`] does nothing, for applications that opt out.

mod adaptive;
mod config;
mod headers;
mod null;

pub use adaptive::AdaptiveRateLimiter;
pub use config::{RateLimiterConfig, DEFAULT_MAX_RESET_DELAY};
pub use headers::{
    HeaderValue, RateLimitHeaders, RATE_LIMIT_LIMIT_HEADER, RATE_LIMIT_REMAINING_HEADER,
    RATE_LIMIT_RESET_HEADER,
};
pub use null::NullRateLimiter;

use async_trait::async_trait;

use crate::errors::PluralKitError;
use crate::transport::HttpResponse;

/// Status code the API uses to signal throttling.
pub const TOO_MANY_REQUESTS: u16 = 429;

/// A completed exchange the rate limiter can inspect.
pub trait RateLimitable {
    /// The status code, coerced to a number. `None` when absent or not
    /// numeric.
    fn status_code(&self) -> Option<u16>;

    /// The raw value of header `name`, matched exactly. `None` when the
    /// header, or the whole header container, is missing.
    fn header(&self, name: &str) -> Option<HeaderValue<'_>>;
}

impl RateLimitable for HttpResponse {
    fn status_code(&self) -> Option<u16> {
        Some(self.status)
    }

    fn header(&self, name: &str) -> Option<HeaderValue<'_>> {
        self.headers.get(name).map(|v| HeaderValue::Text(v))
    }
}

/// Loosely typed responses: `{"status": 429 | "429", "headers": {...}}`.
impl RateLimitable for serde_json::Value {
    fn status_code(&self) -> Option<u16> {
        match self.get("status")? {
            serde_json::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn header(&self, name: &str) -> Option<HeaderValue<'_>> {
        let value = self.get("headers")?.as_object()?.get(name)?;
        match value {
            serde_json::Value::String(s) => Some(HeaderValue::Text(s)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                .map(HeaderValue::Number),
            _ => None,
        }
    }
}

/// Returns true if the exchange was throttled by the API.
pub fn is_rate_limit(response: &dyn RateLimitable) -> bool {
    response.status_code() == Some(TOO_MANY_REQUESTS)
}

/// Returns the throttled response wrapped by `error`, if there is one.
pub fn rate_limit_response(error: &PluralKitError) -> Option<&HttpResponse> {
    error.response().filter(|response| is_rate_limit(*response))
}

/// Cooperative client-side rate limiter.
///
/// Implementations are shared between every request issued by one client,
/// so all methods take `&self`.
#[async_trait]
pub trait RateLimiter: Send + Sync + std::fmt::Debug {
    /// Records a completed exchange. Never fails.
    fn handle_response(&self, response: &dyn RateLimitable);

    /// Records a failed exchange.
    ///
    /// Returns `true` if the failure was a rate limit the limiter absorbed
    /// and the request should be retried after the next [`wait`](Self::wait).
    /// Returns `false`, without touching any state, for every other error;
    /// the caller must propagate those.
    fn handle_error(&self, error: &PluralKitError) -> bool;

    /// Resolves once it is safe to send the next request.
    ///
    /// Dropping the returned future cancels only this caller's wait.
    async fn wait(&self);
}
