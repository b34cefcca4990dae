//! Mock implementations for testing.
//!
//! Provides a scripted transport so the client, services and rate limiter
//! can be exercised without making real API calls.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use tokio::time::Instant;

use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};

/// A recorded request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Request path.
    pub path: String,
    /// Request body.
    pub body: Option<Vec<u8>>,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// When the transport received the request.
    pub sent_at: Instant,
}

impl RecordedRequest {
    /// Parses the recorded body as JSON.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_slice(body).ok())
    }
}

/// A mock response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl MockResponse {
    /// Creates a successful JSON response.
    pub fn json<T: serde::Serialize>(value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_default();
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());

        Self {
            status: 200,
            headers,
            body,
        }
    }

    /// Creates an error response in the PluralKit error format.
    pub fn error(status: u16, message: &str) -> Self {
        let error = serde_json::json!({
            "code": 0,
            "message": message,
        });

        Self::json(&error).with_status(status)
    }

    /// Creates a `429 Too Many Requests` response.
    pub fn too_many_requests() -> Self {
        Self::error(429, "429: too many requests")
    }

    /// Creates a response with custom status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Adds a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }
}

impl From<MockResponse> for HttpResponse {
    fn from(response: MockResponse) -> Self {
        HttpResponse {
            status: response.status,
            headers: response.headers,
            body: response.body,
        }
    }
}

/// Mock HTTP transport for testing.
///
/// Queued outcomes are returned in order; once the queue is empty the
/// default response (or a 500) is returned.
pub struct MockTransport {
    outcomes: Mutex<VecDeque<Result<MockResponse, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    default_response: Mutex<Option<MockResponse>>,
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            default_response: Mutex::new(None),
        }
    }

    /// Queues a response.
    pub fn queue(&self, response: MockResponse) {
        self.outcomes.lock().push_back(Ok(response));
    }

    /// Queues a JSON response.
    pub fn queue_json<T: serde::Serialize>(&self, value: &T) {
        self.queue(MockResponse::json(value));
    }

    /// Queues an error response.
    pub fn queue_error(&self, status: u16, message: &str) {
        self.queue(MockResponse::error(status, message));
    }

    /// Queues a transport failure.
    pub fn queue_failure(&self, error: TransportError) {
        self.outcomes.lock().push_back(Err(error));
    }

    /// Sets the default response.
    pub fn set_default(&self, response: MockResponse) {
        *self.default_response.lock() = Some(response);
    }

    /// Gets all recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Gets the last recorded request.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().last().cloned()
    }

    /// Returns the number of requests made.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn next_outcome(&self) -> Result<MockResponse, TransportError> {
        if let Some(outcome) = self.outcomes.lock().pop_front() {
            return outcome;
        }

        Ok(self
            .default_response
            .lock()
            .clone()
            .unwrap_or_else(|| MockResponse::error(500, "No mock response configured")))
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(RecordedRequest {
            method: request.method,
            path: request.path,
            body: request.body,
            headers: request.headers,
            sent_at: Instant::now(),
        });

        self.next_outcome().map(HttpResponse::from)
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("request_count", &self.request_count())
            .finish()
    }
}
