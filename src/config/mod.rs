//! Configuration module for the PluralKit client.
//!
//! Provides configuration management including the API token, base URL,
//! timeouts, retry bound and rate limiter settings.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

use crate::errors::{PluralKitError, PluralKitResult};
use crate::resilience::RateLimiterConfig;

/// Default base URL for the PluralKit API.
pub const DEFAULT_BASE_URL: &str = "https://api.pluralkit.me/v2";

/// Default request timeout (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of retries after a rate limited request.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default user agent.
pub const DEFAULT_USER_AGENT: &str = concat!("pluralkit-client/", env!("CARGO_PKG_VERSION"));

/// Configuration for the PluralKit client.
#[derive(Clone)]
pub struct PluralKitConfig {
    /// API token; only needed for private data and writes.
    pub(crate) token: Option<SecretString>,
    /// Base URL for API requests.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries of a request the rate limiter absorbed.
    pub max_retries: u32,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Whether client-side rate limiting is enabled.
    pub rate_limit: bool,
    /// Settings for the adaptive rate limiter.
    pub rate_limiter: RateLimiterConfig,
}

impl PluralKitConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> PluralKitConfigBuilder {
        PluralKitConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `PLURALKIT_TOKEN` (optional): API token
    /// - `PLURALKIT_BASE_URL` (optional): Custom base URL
    /// - `PLURALKIT_TIMEOUT` (optional): Request timeout in seconds
    /// - `PLURALKIT_MAX_RETRIES` (optional): Maximum rate limit retries
    /// - `PLURALKIT_RATE_LIMIT` (optional): `false` or `0` disables rate limiting
    pub fn from_env() -> PluralKitResult<Self> {
        let mut builder = PluralKitConfigBuilder::new();

        if let Ok(token) = std::env::var("PLURALKIT_TOKEN") {
            builder = builder.token(token);
        }

        if let Ok(base_url) = std::env::var("PLURALKIT_BASE_URL") {
            builder = builder.base_url(base_url);
        }

        if let Ok(timeout_str) = std::env::var("PLURALKIT_TIMEOUT") {
            if let Ok(timeout_secs) = timeout_str.parse::<u64>() {
                builder = builder.timeout(Duration::from_secs(timeout_secs));
            }
        }

        if let Ok(retries_str) = std::env::var("PLURALKIT_MAX_RETRIES") {
            if let Ok(retries) = retries_str.parse::<u32>() {
                builder = builder.max_retries(retries);
            }
        }

        if let Ok(enabled) = std::env::var("PLURALKIT_RATE_LIMIT") {
            builder = builder.rate_limit(parse_flag(&enabled));
        }

        builder.build()
    }

    /// Returns the token (exposing the secret).
    pub(crate) fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.expose_secret().as_str())
    }

    /// Returns the full URL for an endpoint.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl std::fmt::Debug for PluralKitConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluralKitConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

/// Builder for `PluralKitConfig`.
#[derive(Default)]
pub struct PluralKitConfigBuilder {
    token: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
    user_agent: Option<String>,
    rate_limit: Option<bool>,
    rate_limiter: Option<RateLimiterConfig>,
}

impl PluralKitConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the maximum number of rate limit retries.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Sets the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Enables or disables client-side rate limiting.
    pub fn rate_limit(mut self, enabled: bool) -> Self {
        self.rate_limit = Some(enabled);
        self
    }

    /// Sets the adaptive rate limiter configuration.
    pub fn rate_limiter(mut self, config: RateLimiterConfig) -> Self {
        self.rate_limiter = Some(config);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> PluralKitResult<PluralKitConfig> {
        let token = match self.token {
            Some(token) if token.trim().is_empty() => {
                return Err(PluralKitError::configuration("Token cannot be empty"));
            }
            other => other.map(SecretString::new),
        };

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let parsed = Url::parse(&base_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PluralKitError::configuration(format!(
                "Base URL must use http or https, got {}",
                parsed.scheme()
            )));
        }

        let rate_limiter = self.rate_limiter.unwrap_or_default();
        rate_limiter.validate()?;

        Ok(PluralKitConfig {
            token,
            base_url,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            user_agent: self
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            rate_limit: self.rate_limit.unwrap_or(true),
            rate_limiter,
        })
    }
}
