//! Error types for the PluralKit client.
//!
//! Separates failures that carry an HTTP response (and can therefore be
//! inspected by the rate limiter) from transport, configuration and
//! validation failures that never reach the wire.

use std::time::Duration;
use thiserror::Error;

use crate::transport::{HttpResponse, TransportError};

/// Result type alias for PluralKit operations.
pub type PluralKitResult<T> = Result<T, PluralKitError>;

/// Error type for PluralKit client operations.
#[derive(Debug, Error)]
pub enum PluralKitError {
    /// Configuration error (invalid base URL, limiter bounds, etc.)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },

    /// Authentication error (missing or rejected token).
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Error message.
        message: String,
    },

    /// Local validation of a record failed before sending it.
    #[error("Validation error: {message}")]
    Validation {
        /// All failing rule messages, newline separated.
        message: String,
    },

    /// The API answered with a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the body, or a generic one.
        message: String,
        /// PluralKit error code from the body, if any.
        code: Option<u32>,
        /// Server retry hint from the body, if any.
        retry_after: Option<Duration>,
        /// The full response, kept so callers can inspect headers.
        response: Box<HttpResponse>,
    },

    /// Network/connection error.
    #[error("Network error: {message}")]
    Network {
        /// Error message.
        message: String,
    },

    /// Timeout error.
    #[error("Request timeout after {timeout:?}")]
    Timeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
    },
}

/// Error body returned by the PluralKit API.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    /// Numeric PluralKit error code.
    pub code: Option<u32>,
    /// Human readable message.
    pub message: String,
    /// Retry hint in milliseconds, sent with 429 responses.
    pub retry_after: Option<u64>,
}

impl PluralKitError {
    /// Builds an API error from a non-success response.
    pub fn from_response(response: HttpResponse) -> Self {
        let (message, code, retry_after) =
            match serde_json::from_slice::<ApiErrorResponse>(&response.body) {
                Ok(body) => (
                    body.message,
                    body.code,
                    body.retry_after.map(Duration::from_millis),
                ),
                Err(_) => (format!("HTTP error: {}", response.status), None, None),
            };

        PluralKitError::Api {
            status: response.status,
            message,
            code,
            retry_after,
            response: Box::new(response),
        }
    }

    /// Returns the response embedded in this error, if any.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            PluralKitError::Api { response, .. } => Some(response.as_ref()),
            _ => None,
        }
    }

    /// Returns the HTTP status code, if this error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            PluralKitError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the PluralKit error code, if the body carried one.
    pub fn code(&self) -> Option<u32> {
        match self {
            PluralKitError::Api { code, .. } => *code,
            _ => None,
        }
    }

    /// Returns the server's retry hint, if the body carried one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            PluralKitError::Api { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        PluralKitError::Validation {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        PluralKitError::Configuration {
            message: message.into(),
        }
    }
}

impl From<TransportError> for PluralKitError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout { timeout } => PluralKitError::Timeout { timeout },
            other => PluralKitError::Network {
                message: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for PluralKitError {
    fn from(err: serde_json::Error) -> Self {
        PluralKitError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for PluralKitError {
    fn from(err: url::ParseError) -> Self {
        PluralKitError::Configuration {
            message: format!("Invalid URL: {}", err),
        }
    }
}
