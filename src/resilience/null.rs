//! Rate limiter that never throttles.

use async_trait::async_trait;

use super::{RateLimitable, RateLimiter};
use crate::errors::PluralKitError;

/// A [`RateLimiter`] whose every operation is a no-op.
///
/// Used when the embedding application handles throttling itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRateLimiter;

impl NullRateLimiter {
    /// Creates a new null rate limiter.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RateLimiter for NullRateLimiter {
    fn handle_response(&self, _response: &dyn RateLimitable) {}

    fn handle_error(&self, _error: &PluralKitError) -> bool {
        false
    }

    async fn wait(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio::time::Instant;

    use crate::transport::HttpResponse;

    fn rate_limit_error() -> PluralKitError {
        PluralKitError::from_response(HttpResponse {
            status: 429,
            headers: HashMap::new(),
            body: Vec::new(),
        })
    }

    #[test]
    fn test_handle_error_is_never_handled() {
        let limiter = NullRateLimiter::new();

        assert!(!limiter.handle_error(&rate_limit_error()));
        assert!(!limiter.handle_error(&PluralKitError::validation("random-value")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_immediately_after_throttling() {
        let limiter = NullRateLimiter::new();
        limiter.handle_response(&json!({
            "status": 429,
            "headers": { "x-ratelimit-remaining": "0" }
        }));
        limiter.handle_error(&rate_limit_error());

        let started = Instant::now();
        limiter.wait().await;

        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
