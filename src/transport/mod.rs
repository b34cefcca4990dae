//! HTTP transport layer for the PluralKit client.
//!
//! Provides the HTTP transport abstraction and a `reqwest` backed
//! implementation. The rest of the crate only sees [`HttpRequest`] and
//! [`HttpResponse`], so tests can swap in [`crate::mocks::MockTransport`].

mod http;

pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, HttpTransportImpl};

use std::time::Duration;

/// Transport error types.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection error.
    #[error("Connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Timeout error.
    #[error("Timeout after {timeout:?}")]
    Timeout {
        /// Timeout duration.
        timeout: Duration,
    },

    /// Invalid response.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Error message.
        message: String,
    },
}
