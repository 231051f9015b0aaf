//! The wire seam under the service client.
//!
//! [`Transport`] isolates the client's classification and telemetry logic
//! from the actual HTTP stack, so tests can substitute a scripted
//! transport. [`ReqwestTransport`] is the production implementation.

use bytes::Bytes;
use http::{HeaderMap, Method};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// A boxed future, used to keep [`Transport`] object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A fully-resolved outbound request, ready to put on the wire.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL, already joined from base URL and path.
    pub url: String,
    /// Headers to send, including propagated trace headers.
    pub headers: Vec<(String, String)>,
    /// Optional request body.
    pub body: Option<Bytes>,
}

/// The raw result of an outbound call.
///
/// Status classification happens in the client, not here; the transport
/// reports whatever the peer said.
#[derive(Debug, Clone)]
pub struct OutboundResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl OutboundResponse {
    /// Parses the response body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the underlying parse error if the body is not valid JSON.
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Failure modes the transport distinguishes.
///
/// The client maps these onto the framework error taxonomy; the split
/// matters because a timeout becomes a deadline failure while a refused
/// connection becomes an upstream failure.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The call did not complete within the allotted time.
    #[error("request timed out")]
    TimedOut,
    /// The peer could not be reached or the exchange broke mid-flight.
    #[error("connection failed: {0}")]
    Connect(String),
}

/// Sends outbound requests.
pub trait Transport: Send + Sync {
    /// Sends `request`, failing if it does not complete within `timeout`.
    fn send<'a>(
        &'a self,
        request: OutboundRequest,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<OutboundResponse, TransportError>>;
}

/// Production transport backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with a fresh connection pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for ReqwestTransport {
    fn send<'a>(
        &'a self,
        request: OutboundRequest,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<OutboundResponse, TransportError>> {
        Box::pin(async move {
            let mut builder = self
                .client
                .request(request.method, &request.url)
                .timeout(timeout);
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(classify_reqwest)?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let body = response.bytes().await.map_err(classify_reqwest)?;
            Ok(OutboundResponse {
                status,
                headers,
                body,
            })
        })
    }
}

fn classify_reqwest(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::TimedOut
    } else {
        TransportError::Connect(error.to_string())
    }
}
