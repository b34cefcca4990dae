//! Integration tests for the rate limiters.

use chrono::Utc;
use pluralkit_client::resilience::{
    AdaptiveRateLimiter, NullRateLimiter, RateLimiter, RateLimiterConfig,
    RATE_LIMIT_REMAINING_HEADER, RATE_LIMIT_RESET_HEADER, DEFAULT_MAX_RESET_DELAY,
};
use pluralkit_client::transport::HttpResponse;
use pluralkit_client::PluralKitError;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn response(status: u16, headers: &[(&str, &str)]) -> HttpResponse {
    HttpResponse {
        status,
        headers: headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
        body: Vec::new(),
    }
}

fn too_many_requests() -> PluralKitError {
    PluralKitError::from_response(response(429, &[]))
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[tokio::test(start_paused = true)]
async fn test_wait_time_climbs_by_increment_and_caps() {
    let limiter = AdaptiveRateLimiter::default();

    limiter.handle_error(&too_many_requests());
    limiter.handle_error(&too_many_requests());
    assert_eq!(limiter.wait_time(), ms(1000));

    let mut observed = Vec::new();
    for _ in 0..5 {
        limiter.handle_error(&too_many_requests());
        observed.push(limiter.wait_time());
    }

    assert_eq!(observed, vec![ms(1500), ms(2000), ms(2500), ms(3000), ms(3000)]);
}

#[tokio::test(start_paused = true)]
async fn test_wait_time_returns_to_minimum_after_quiet_period() {
    let limiter = AdaptiveRateLimiter::default();
    for _ in 0..5 {
        limiter.handle_error(&too_many_requests());
    }
    assert_eq!(limiter.wait_time(), ms(2500));

    tokio::time::advance(Duration::from_secs(6)).await;
    for _ in 0..4 {
        limiter.handle_response(&response(200, &[]));
    }

    assert_eq!(limiter.wait_time(), ms(1000));
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_remaining_delays_next_request() {
    let limiter = AdaptiveRateLimiter::default();
    limiter.handle_response(&response(200, &[(RATE_LIMIT_REMAINING_HEADER, "0")]));

    let started = Instant::now();
    limiter.wait().await;

    assert!(started.elapsed() >= ms(1000));
}

#[tokio::test(start_paused = true)]
async fn test_wait_is_immediate_once_reset_has_passed() {
    let limiter = AdaptiveRateLimiter::default();
    limiter.handle_response(&response(200, &[(RATE_LIMIT_REMAINING_HEADER, "0")]));

    tokio::time::advance(ms(1500)).await;
    let started = Instant::now();
    limiter.wait().await;

    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_absurd_reset_header_does_not_stall_client() {
    let limiter = AdaptiveRateLimiter::default();
    let reset = i64::MAX.to_string();

    limiter.handle_response(&response(
        200,
        &[(RATE_LIMIT_REMAINING_HEADER, "0"), (RATE_LIMIT_RESET_HEADER, reset.as_str())],
    ));

    assert_eq!(limiter.time_until_reset(), DEFAULT_MAX_RESET_DELAY);
}

#[tokio::test(start_paused = true)]
async fn test_reset_header_extends_pause() {
    let limiter = AdaptiveRateLimiter::default();
    let reset = (Utc::now().timestamp() + 61).to_string();

    limiter.handle_response(&response(
        200,
        &[(RATE_LIMIT_REMAINING_HEADER, "0"), (RATE_LIMIT_RESET_HEADER, reset.as_str())],
    ));

    let started = Instant::now();
    limiter.wait().await;

    assert!(started.elapsed() >= Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_loosely_typed_responses_are_understood() {
    let limiter = AdaptiveRateLimiter::default();

    limiter.handle_response(&json!({ "status": "429", "headers": {} }));
    limiter.handle_response(&json!("random-value"));
    limiter.handle_response(&json!({ "status": 200, "headers": null }));

    assert_eq!(limiter.error_count(), 1);
    assert_eq!(limiter.time_until_reset(), ms(1000));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_waiters_all_hold_until_reset() {
    let limiter = Arc::new(AdaptiveRateLimiter::default());
    assert!(limiter.handle_error(&too_many_requests()));
    let started = Instant::now();

    let waiters = (0..3).map(|_| {
        let limiter = Arc::clone(&limiter);
        tokio::spawn(async move {
            limiter.wait().await;
            Instant::now()
        })
    });
    let finished = futures::future::join_all(waiters).await;

    for done in finished {
        assert!(done.unwrap() - started >= ms(1000));
    }
}

#[tokio::test(start_paused = true)]
async fn test_waiter_keeps_reset_observed_at_call_time() {
    let limiter = Arc::new(AdaptiveRateLimiter::default());
    limiter.handle_error(&too_many_requests());
    let started = Instant::now();

    let waiter = {
        let limiter = Arc::clone(&limiter);
        tokio::spawn(async move {
            limiter.wait().await;
            Instant::now()
        })
    };
    tokio::task::yield_now().await;

    tokio::time::sleep(ms(100)).await;
    limiter.handle_error(&too_many_requests());

    let done = waiter.await.unwrap();
    assert_eq!(done - started, ms(1000));
    assert!(limiter.time_until_reset() > Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_wait_leaves_limiter_untouched() {
    let limiter = AdaptiveRateLimiter::default();
    limiter.handle_error(&too_many_requests());

    let cancelled = tokio::time::timeout(ms(100), limiter.wait()).await;
    assert!(cancelled.is_err());
    assert_eq!(limiter.time_until_reset(), ms(900));

    let started = Instant::now();
    limiter.wait().await;
    assert_eq!(started.elapsed(), ms(900));
}

#[tokio::test(start_paused = true)]
async fn test_custom_bounds_are_respected() {
    let config = RateLimiterConfig::default()
        .min_wait(ms(200))
        .max_wait(ms(400))
        .initial_wait(ms(200))
        .increment(ms(150))
        .increase_threshold(1);
    let limiter = AdaptiveRateLimiter::new(config).unwrap();

    limiter.handle_error(&too_many_requests());
    assert_eq!(limiter.wait_time(), ms(350));
    limiter.handle_error(&too_many_requests());
    assert_eq!(limiter.wait_time(), ms(400));
}

#[tokio::test(start_paused = true)]
async fn test_null_limiter_never_blocks() {
    let limiter = NullRateLimiter::new();
    let started = Instant::now();

    limiter.handle_response(&response(429, &[(RATE_LIMIT_REMAINING_HEADER, "0")]));
    assert!(!limiter.handle_error(&too_many_requests()));
    limiter.wait().await;

    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_limiters_are_interchangeable_behind_trait_object() {
    let limiters: Vec<Arc<dyn RateLimiter>> = vec![
        Arc::new(AdaptiveRateLimiter::default()),
        Arc::new(NullRateLimiter::new()),
    ];

    let handled: Vec<bool> = limiters
        .iter()
        .map(|limiter| limiter.handle_error(&too_many_requests()))
        .collect();

    assert_eq!(handled, vec![true, false]);
}
