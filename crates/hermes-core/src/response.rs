//! The transport-agnostic response shape.

use crate::error::{HermesError, HermesResult};
use bytes::Bytes;
use http::header::{CONTENT_TYPE, RETRY_AFTER};
use http::{HeaderMap, HeaderValue, StatusCode};
use serde::Serialize;

/// An outbound response: status, headers, body.
///
/// Responses are plain values moved through the chain; a stage that wants a
/// different response returns a new one, so the last replacement wins.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Creates an empty response with the given status.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Creates a JSON response by serializing `value`.
    ///
    /// Serialization failure is a fault, propagated so the dispatcher
    /// boundary reports it instead of sending a half-built body.
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> HermesResult<Self> {
        let body = serde_json::to_vec(value)
            .map_err(|e| HermesError::internal_with_source("response serialization failed", e))?;
        Ok(Self::new(status)
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(body))
    }

    /// Creates a JSON response from an already-built value. Infallible.
    #[must_use]
    pub fn json_value(status: StatusCode, value: &serde_json::Value) -> Self {
        Self::new(status)
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(value.to_string())
    }

    /// Creates a plain-text response.
    #[must_use]
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status)
            .with_header(
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            )
            .with_body(body.into())
    }

    /// Renders an error as a response carrying its envelope.
    ///
    /// Admission rejections get a `Retry-After` header so callers can back
    /// off instead of hammering a saturated service.
    #[must_use]
    pub fn from_error(error: &HermesError, trace_id: Option<&str>) -> Self {
        let envelope = error.to_envelope(trace_id);
        let body = serde_json::to_value(&envelope).unwrap_or_else(|_| {
            serde_json::json!({ "error": { "code": "INTERNAL_ERROR", "message": "Internal server error" } })
        });

        let mut response = Self::json_value(error.status_code(), &body);
        if let HermesError::AdmissionRejected {
            retry_after_seconds,
            ..
        } = error
        {
            if let Ok(value) = HeaderValue::from_str(&retry_after_seconds.to_string()) {
                response.headers.insert(RETRY_AFTER, value);
            }
        }
        response
    }

    /// Sets a header, returning the modified response.
    #[must_use]
    pub fn with_header(mut self, name: http::header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the body, returning the modified response.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the header map.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a mutable header map.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the body bytes.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Parses the body as JSON. Test helper.
    pub fn body_json(&self) -> HermesResult<serde_json::Value> {
        serde_json::from_slice(&self.body)
            .map_err(|e| HermesError::internal_with_source("response body is not JSON", e))
    }
}
