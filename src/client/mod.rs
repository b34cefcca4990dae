//! PluralKit API client.
//!
//! Provides the main client interface and the request executor every
//! service sends through.

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::auth::{AuthProvider, NoAuth, TokenAuth};
use crate::config::{PluralKitConfig, PluralKitConfigBuilder};
use crate::errors::{PluralKitError, PluralKitResult};
use crate::resilience::{AdaptiveRateLimiter, NullRateLimiter, RateLimiter, RateLimiterConfig};
use crate::services::SystemsService;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, HttpTransportImpl};

/// The main PluralKit client.
///
/// # Example
///
/// ```rust,no_run
/// use pluralkit_client::PluralKitClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = PluralKitClient::builder()
///         .token("your-system-token")
///         .build()?;
///
///     let system = client.systems().get("@me").await?;
///     println!("{:?}", system.name);
///     Ok(())
/// }
/// ```
pub struct PluralKitClient {
    config: PluralKitConfig,
    executor: Arc<RequestExecutor>,
    systems_service: SystemsService,
}

impl PluralKitClient {
    /// Creates a new client builder.
    pub fn builder() -> PluralKitClientBuilder {
        PluralKitClientBuilder::new()
    }

    /// Creates a client from environment variables.
    ///
    /// See [`PluralKitConfig::from_env`] for the variables read.
    pub fn from_env() -> PluralKitResult<Self> {
        let config = PluralKitConfig::from_env()?;
        PluralKitClientBuilder::from_config(config).build()
    }

    /// Returns the systems service.
    pub fn systems(&self) -> &SystemsService {
        &self.systems_service
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PluralKitConfig {
        &self.config
    }

    /// Returns the rate limiter shared by all requests of this client.
    pub fn rate_limiter(&self) -> Arc<dyn RateLimiter> {
        Arc::clone(&self.executor.rate_limiter)
    }

    /// Sends a raw request through the rate limiter.
    pub async fn execute(&self, request: HttpRequest) -> PluralKitResult<HttpResponse> {
        self.executor.execute(request).await
    }
}

impl std::fmt::Debug for PluralKitClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluralKitClient")
            .field("config", &self.config)
            .field("rate_limiter", &self.executor.rate_limiter)
            .finish()
    }
}

/// Sends requests, gating each one on the rate limiter.
pub(crate) struct RequestExecutor {
    transport: Arc<dyn HttpTransport>,
    auth: Arc<dyn AuthProvider>,
    rate_limiter: Arc<dyn RateLimiter>,
    max_retries: u32,
}

impl RequestExecutor {
    pub(crate) fn new(
        transport: Arc<dyn HttpTransport>,
        auth: Arc<dyn AuthProvider>,
        rate_limiter: Arc<dyn RateLimiter>,
        max_retries: u32,
    ) -> Self {
        Self {
            transport,
            auth,
            rate_limiter,
            max_retries,
        }
    }

    /// Sends `request`, retrying while the rate limiter absorbs the failure
    /// and retries remain.
    #[instrument(skip(self, request), fields(method = ?request.method, path = %request.path))]
    pub(crate) async fn execute(&self, mut request: HttpRequest) -> PluralKitResult<HttpResponse> {
        self.auth.apply_auth(&mut request.headers);
        let mut retries = 0;

        loop {
            self.rate_limiter.wait().await;

            let error = match self.transport.send(request.clone()).await {
                Ok(response) if response.is_success() => {
                    self.rate_limiter.handle_response(&response);
                    return Ok(response);
                }
                Ok(response) => PluralKitError::from_response(response),
                Err(err) => err.into(),
            };

            if !self.rate_limiter.handle_error(&error) || retries >= self.max_retries {
                return Err(error);
            }

            retries += 1;
            debug!(attempt = retries, max_retries = self.max_retries, "Retrying rate limited request");
        }
    }
}

/// Builder for the PluralKit client.
pub struct PluralKitClientBuilder {
    config_builder: PluralKitConfigBuilder,
    transport: Option<Arc<dyn HttpTransport>>,
    auth: Option<Arc<dyn AuthProvider>>,
    rate_limiter: Option<Arc<dyn RateLimiter>>,
}

impl PluralKitClientBuilder {
    /// Creates a new client builder.
    pub fn new() -> Self {
        Self {
            config_builder: PluralKitConfigBuilder::new(),
            transport: None,
            auth: None,
            rate_limiter: None,
        }
    }

    /// Creates a builder from an existing configuration.
    pub fn from_config(config: PluralKitConfig) -> Self {
        let mut config_builder = PluralKitConfigBuilder::new()
            .base_url(&config.base_url)
            .timeout(config.timeout)
            .max_retries(config.max_retries)
            .user_agent(&config.user_agent)
            .rate_limit(config.rate_limit)
            .rate_limiter(config.rate_limiter.clone());
        if let Some(token) = config.token() {
            config_builder = config_builder.token(token);
        }

        Self {
            config_builder,
            ..Self::new()
        }
    }

    /// Sets the API token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.token(token);
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(base_url);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets the maximum number of rate limit retries.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config_builder = self.config_builder.max_retries(retries);
        self
    }

    /// Sets the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.user_agent(user_agent);
        self
    }

    /// Enables or disables client-side rate limiting.
    pub fn rate_limit(mut self, enabled: bool) -> Self {
        self.config_builder = self.config_builder.rate_limit(enabled);
        self
    }

    /// Sets the adaptive rate limiter configuration.
    pub fn rate_limiter_config(mut self, config: RateLimiterConfig) -> Self {
        self.config_builder = self.config_builder.rate_limiter(config);
        self
    }

    /// Sets a custom rate limiter, overriding `rate_limit` and
    /// `rate_limiter_config`.
    pub fn rate_limiter(mut self, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = Some(rate_limiter);
        self
    }

    /// Sets a custom transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets a custom auth provider.
    pub fn auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Builds the client.
    pub fn build(self) -> PluralKitResult<PluralKitClient> {
        let config = self.config_builder.build()?;

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(t) => t,
            None => Arc::new(
                HttpTransportImpl::new(&config.base_url, config.timeout, &config.user_agent)
                    .map_err(|e| PluralKitError::configuration(e.to_string()))?,
            ),
        };

        let auth: Arc<dyn AuthProvider> = match (self.auth, config.token()) {
            (Some(a), _) => a,
            (None, Some(token)) => Arc::new(TokenAuth::from_string(token)),
            (None, None) => Arc::new(NoAuth),
        };
        auth.validate()?;

        let rate_limiter: Arc<dyn RateLimiter> = match self.rate_limiter {
            Some(limiter) => limiter,
            None if config.rate_limit => {
                Arc::new(AdaptiveRateLimiter::new(config.rate_limiter.clone())?)
            }
            None => Arc::new(NullRateLimiter::new()),
        };

        let executor = Arc::new(RequestExecutor::new(
            transport,
            auth,
            rate_limiter,
            config.max_retries,
        ));
        let systems_service = SystemsService::new(Arc::clone(&executor));

        Ok(PluralKitClient {
            config,
            executor,
            systems_service,
        })
    }
}

impl Default for PluralKitClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockResponse, MockTransport};
    use crate::transport::TransportError;
    use std::time::Duration;
    use tokio::time::Instant;

    fn client_with(transport: Arc<MockTransport>) -> PluralKitClient {
        PluralKitClient::builder()
            .token("pk-test-token")
            .transport(transport)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_selects_null_limiter_when_disabled() {
        let client = PluralKitClient::builder()
            .rate_limit(false)
            .transport(Arc::new(MockTransport::new()))
            .build()
            .unwrap();

        assert!(format!("{:?}", client.rate_limiter()).contains("NullRateLimiter"));
    }

    #[test]
    fn test_builder_selects_adaptive_limiter_by_default() {
        let client = client_with(Arc::new(MockTransport::new()));

        assert!(format!("{:?}", client.rate_limiter()).contains("AdaptiveRateLimiter"));
    }

    #[tokio::test]
    async fn test_execute_applies_token() {
        let transport = Arc::new(MockTransport::new());
        transport.queue_json(&serde_json::json!({}));
        let client = client_with(Arc::clone(&transport));

        client.execute(HttpRequest::get("systems/@me")).await.unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(
            request.headers.get("Authorization").map(String::as_str),
            Some("pk-test-token")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_retries_rate_limited_request_after_waiting() {
        let transport = Arc::new(MockTransport::new());
        transport.queue(MockResponse::too_many_requests());
        transport.queue_json(&serde_json::json!({ "id": "exmpl" }));
        let client = client_with(Arc::clone(&transport));

        let response = client.execute(HttpRequest::get("systems/@me")).await.unwrap();

        assert_eq!(response.status, 200);
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].sent_at - requests[0].sent_at >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_gives_up_after_max_retries() {
        let transport = Arc::new(MockTransport::new());
        transport.set_default(MockResponse::too_many_requests());
        let client = PluralKitClient::builder()
            .transport(Arc::clone(&transport) as Arc<dyn HttpTransport>)
            .max_retries(2)
            .build()
            .unwrap();

        let result = client.execute(HttpRequest::get("systems/@me")).await;

        assert_eq!(result.unwrap_err().status(), Some(429));
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_execute_propagates_unrelated_errors_without_retry() {
        let transport = Arc::new(MockTransport::new());
        transport.queue_error(404, "System not found.");
        let client = client_with(Arc::clone(&transport));

        let result = client.execute(HttpRequest::get("systems/nope")).await;

        assert_eq!(result.unwrap_err().status(), Some(404));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_execute_propagates_transport_failures() {
        let transport = Arc::new(MockTransport::new());
        transport.queue_failure(TransportError::Connection {
            message: "refused".to_string(),
        });
        let client = client_with(Arc::clone(&transport));

        let result = client.execute(HttpRequest::get("systems/@me")).await;

        assert!(matches!(result, Err(PluralKitError::Network { .. })));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_null_limiter_does_not_retry_or_wait() {
        let transport = Arc::new(MockTransport::new());
        transport.queue(MockResponse::too_many_requests());
        let client = PluralKitClient::builder()
            .rate_limit(false)
            .transport(Arc::clone(&transport) as Arc<dyn HttpTransport>)
            .build()
            .unwrap();
        let started = Instant::now();

        let result = client.execute(HttpRequest::get("systems/@me")).await;

        assert_eq!(result.unwrap_err().status(), Some(429));
        assert_eq!(transport.request_count(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
