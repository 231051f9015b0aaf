//! Deadline-aware outbound service client.
//!
//! Every call resolves a logical service name, checks the request's
//! remaining deadline budget, propagates trace identity, and records a
//! span, including calls that never reach the network.

use crate::registry::ServiceRegistry;
use crate::transport::{OutboundRequest, OutboundResponse, Transport, TransportError};
use bytes::Bytes;
use hermes_core::{HermesError, HermesResult, RequestContext, SpanRecord};
use http::Method;
use std::sync::Arc;
use std::time::Instant;

/// Headers the client attaches to every outbound request.
pub mod headers {
    /// Carries the trace ID shared across all hops of a request.
    pub const TRACE_ID: &str = "x-trace-id";
    /// Carries the calling hop's span ID.
    pub const PARENT_SPAN: &str = "x-parent-span";
}

/// Per-request client for calling downstream services by name.
///
/// Built once per request with that request's [`RequestContext`], so every
/// outbound call inherits the trace identity and deadline without the
/// handler passing either around.
#[derive(Clone)]
pub struct ServiceClient {
    context: RequestContext,
    registry: Arc<ServiceRegistry>,
    transport: Arc<dyn Transport>,
}

impl ServiceClient {
    /// Creates a client bound to one request's context.
    #[must_use]
    pub fn new(
        context: RequestContext,
        registry: Arc<ServiceRegistry>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            context,
            registry,
            transport,
        }
    }

    /// Returns the request context this client is bound to.
    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Sends a GET to `path` on the named service.
    ///
    /// # Errors
    ///
    /// See [`ServiceClient::request`].
    pub async fn get(&self, service: &str, path: &str) -> HermesResult<OutboundResponse> {
        self.request(Method::GET, service, path, None).await
    }

    /// Sends a POST with a JSON body to `path` on the named service.
    ///
    /// # Errors
    ///
    /// See [`ServiceClient::request`].
    pub async fn post(
        &self,
        service: &str,
        path: &str,
        body: serde_json::Value,
    ) -> HermesResult<OutboundResponse> {
        self.request(Method::POST, service, path, Some(body)).await
    }

    /// Sends a PUT with a JSON body to `path` on the named service.
    ///
    /// # Errors
    ///
    /// See [`ServiceClient::request`].
    pub async fn put(
        &self,
        service: &str,
        path: &str,
        body: serde_json::Value,
    ) -> HermesResult<OutboundResponse> {
        self.request(Method::PUT, service, path, Some(body)).await
    }

    /// Sends a DELETE to `path` on the named service.
    ///
    /// # Errors
    ///
    /// See [`ServiceClient::request`].
    pub async fn delete(&self, service: &str, path: &str) -> HermesResult<OutboundResponse> {
        self.request(Method::DELETE, service, path, None).await
    }

    /// Calls `path` on the named service.
    ///
    /// The call is given the request's remaining deadline budget as its
    /// timeout; if the budget is already exhausted the call fails without
    /// touching the network. A span record is appended to the request
    /// context on every path, with status 0 when no response was produced.
    ///
    /// Responses with a 5xx status are translated into upstream failures;
    /// everything else, including 4xx, is returned unmodified for the
    /// caller to interpret.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unregistered service name, a
    /// deadline failure when the budget is exhausted or the call times out,
    /// and an upstream failure when the peer is unreachable or answers 5xx.
    pub async fn request(
        &self,
        method: Method,
        service: &str,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> HermesResult<OutboundResponse> {
        let started = Instant::now();
        let result = self.dispatch(&method, service, path, body).await;

        let status = result.as_ref().map_or(0, |response| response.status);
        self.context.record_span(SpanRecord {
            service: service.to_string(),
            path: path.to_string(),
            method: method.to_string(),
            elapsed: started.elapsed(),
            status,
        });
        tracing::debug!(
            trace_id = %self.context.trace_id(),
            service,
            path,
            status,
            "outbound call finished"
        );

        let response = result?;
        if response.status >= 500 {
            return Err(HermesError::upstream(
                format!("service '{service}' returned status {}", response.status),
                Some(service.to_string()),
            ));
        }
        Ok(response)
    }

    async fn dispatch(
        &self,
        method: &Method,
        service: &str,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> HermesResult<OutboundResponse> {
        let base_url = self.registry.resolve(service)?;
        let url = format!("{base_url}/{}", path.trim_start_matches('/'));

        let remaining = self.context.remaining();
        if remaining.is_zero() {
            return Err(HermesError::deadline_exceeded(format!(
                "deadline exhausted before calling '{service}'"
            )));
        }

        let mut headers = vec![
            (
                headers::TRACE_ID.to_string(),
                self.context.trace_id().to_string(),
            ),
            (
                headers::PARENT_SPAN.to_string(),
                self.context.span_id().to_string(),
            ),
        ];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }

        let request = OutboundRequest {
            method: method.clone(),
            url,
            headers,
            body: body.map(|value| Bytes::from(value.to_string())),
        };

        match self.transport.send(request, remaining).await {
            Ok(response) => Ok(response),
            Err(TransportError::TimedOut) => Err(HermesError::deadline_exceeded(format!(
                "call to '{service}' timed out"
            ))),
            Err(TransportError::Connect(detail)) => Err(HermesError::upstream(
                format!("call to '{service}' failed: {detail}"),
                Some(service.to_string()),
            )),
        }
    }
}

impl std::fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient")
            .field("trace_id", &self.context.trace_id())
            .field("services", &self.registry.len())
            .finish_non_exhaustive()
    }
}
