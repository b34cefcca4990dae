//! Integration tests for PluralKitClient.

use pluralkit_client::mocks::{MockResponse, MockTransport};
use pluralkit_client::resilience::{RateLimiterConfig, RATE_LIMIT_REMAINING_HEADER};
use pluralkit_client::transport::{HttpRequest, HttpTransport};
use pluralkit_client::{Field, PluralKitClient, PluralKitError, System, SystemGuildSettings};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_client(transport: Arc<MockTransport>) -> PluralKitClient {
    PluralKitClient::builder()
        .token("pk-test-token")
        .transport(transport as Arc<dyn HttpTransport>)
        .build()
        .unwrap()
}

fn system_payload() -> serde_json::Value {
    json!({
        "id": "exmpl",
        "uuid": "ca8ab1f7-5a88-4e53-ab6b-fde1cbf0f2d9",
        "name": "Example System",
        "color": "ff00aa",
        "created": "2020-01-12T02:00:20.879Z"
    })
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_request_is_retried_after_pause() {
    let transport = Arc::new(MockTransport::new());
    transport.queue(MockResponse::too_many_requests());
    transport.queue_json(&system_payload());
    let client = create_test_client(transport.clone());

    let system = client.systems().get("exmpl").await.unwrap();

    assert_eq!(system.name, Field::Value("Example System".to_string()));
    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].sent_at - requests[0].sent_at >= Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_remaining_delays_following_request() {
    let transport = Arc::new(MockTransport::new());
    transport.queue(
        MockResponse::json(&system_payload()).with_header(RATE_LIMIT_REMAINING_HEADER, "0"),
    );
    transport.queue_json(&system_payload());
    let client = create_test_client(transport.clone());

    client.systems().get("exmpl").await.unwrap();
    client.systems().get("exmpl").await.unwrap();

    let requests = transport.requests();
    assert!(requests[1].sent_at - requests[0].sent_at >= Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn test_unrelated_error_is_returned_without_retry() {
    let transport = Arc::new(MockTransport::new());
    transport.queue_error(404, "System not found.");
    let client = create_test_client(transport.clone());

    let err = client.systems().get("nope").await.unwrap_err();

    match err {
        PluralKitError::Api {
            status, message, ..
        } => {
            assert_eq!(status, 404);
            assert_eq!(message, "System not found.");
        }
        other => panic!("Expected Api error, got {other:?}"),
    }
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_retries_stop_after_max_retries() {
    let transport = Arc::new(MockTransport::new());
    transport.set_default(MockResponse::too_many_requests());
    let client = PluralKitClient::builder()
        .max_retries(1)
        .transport(transport.clone() as Arc<dyn HttpTransport>)
        .build()
        .unwrap();

    let err = client.execute(HttpRequest::get("systems/@me")).await.unwrap_err();

    assert_eq!(err.status(), Some(429));
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_rate_limiting_surfaces_429_immediately() {
    let transport = Arc::new(MockTransport::new());
    transport.queue(MockResponse::too_many_requests());
    transport.queue_json(&system_payload());
    let client = PluralKitClient::builder()
        .rate_limit(false)
        .transport(transport.clone() as Arc<dyn HttpTransport>)
        .build()
        .unwrap();
    let started = Instant::now();

    let err = client.systems().get("exmpl").await.unwrap_err();
    client.systems().get("exmpl").await.unwrap();

    assert_eq!(err.status(), Some(429));
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn test_patch_reports_every_validation_failure() {
    let transport = Arc::new(MockTransport::new());
    let client = create_test_client(transport.clone());
    let system = System {
        name: "x".repeat(101).into(),
        banner: "ftp://example.com/banner.png".to_string().into(),
        ..System::new()
    };

    let err = client.systems().patch(&system).await.unwrap_err();

    match err {
        PluralKitError::Validation { message } => assert_eq!(
            message,
            "Name must be 100 characters or less\nBanner URL must be a valid http or https URL"
        ),
        other => panic!("Expected validation error, got {other:?}"),
    }
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_patch_guild_settings_sends_only_set_fields() {
    let transport = Arc::new(MockTransport::new());
    transport.queue_json(&json!({ "guild": "42", "proxying_enabled": false }));
    let client = create_test_client(transport.clone());
    let settings = SystemGuildSettings {
        proxying_enabled: false.into(),
        avatar_url: Field::Null,
        ..SystemGuildSettings::for_guild("42")
    };

    let updated = client.systems().patch_guild_settings(&settings).await.unwrap();

    assert_eq!(updated.proxying_enabled, Field::Value(false));
    let body = transport.last_request().unwrap().json_body().unwrap();
    assert_eq!(
        body,
        json!({ "guild": "42", "proxying_enabled": false, "avatar_url": null })
    );
}

#[tokio::test]
async fn test_end_to_end_retry_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/systems/@me"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(json!({ "message": "429: too many requests", "retry_after": 50, "code": 0 })),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/systems/@me"))
        .and(header("Authorization", "pk-test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(system_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let client = PluralKitClient::builder()
        .token("pk-test-token")
        .base_url(server.uri())
        .rate_limiter_config(
            RateLimiterConfig::default()
                .initial_wait(Duration::from_millis(20))
                .min_wait(Duration::from_millis(20))
                .max_wait(Duration::from_millis(100)),
        )
        .build()
        .unwrap();
    let started = std::time::Instant::now();

    let system = client.systems().get("@me").await.unwrap();

    assert_eq!(system.id, Field::Value("exmpl".to_string()));
    assert!(started.elapsed() >= Duration::from_millis(20));
}
