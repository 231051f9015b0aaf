//! Context propagation: trace identity, deadline, and the outbound client.

use crate::middleware::{BoxFuture, Middleware, Next, Outcome};
use crate::state::RequestState;
use hermes_client::{headers, ServiceClient, ServiceRegistry, Transport};
use hermes_core::{Request, RequestContext, TraceId};
use std::sync::Arc;
use std::time::Duration;

/// Builds the per-request context and service client.
///
/// An inbound `x-trace-id` header is reused so multi-hop requests share one
/// trace; otherwise a fresh trace ID is minted. The span ID is always fresh
/// for this hop, and the deadline is set to now plus the configured budget.
pub struct ContextPropagation {
    service_name: String,
    deadline_budget: Duration,
    registry: Arc<ServiceRegistry>,
    transport: Arc<dyn Transport>,
}

impl ContextPropagation {
    /// Creates the stage.
    #[must_use]
    pub fn new(
        service_name: impl Into<String>,
        deadline_budget: Duration,
        registry: Arc<ServiceRegistry>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            deadline_budget,
            registry,
            transport,
        }
    }
}

impl Middleware for ContextPropagation {
    fn name(&self) -> &'static str {
        "context"
    }

    fn process<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            let mut context = RequestContext::new(&self.service_name, self.deadline_budget);
            if let Some(inbound) = request.header(headers::TRACE_ID) {
                context = context.with_trace_id(TraceId::from(inbound));
            }

            tracing::debug!(
                trace_id = %context.trace_id(),
                span_id = %context.span_id(),
                method = %request.method(),
                path = request.path(),
                "request context established"
            );

            let client = ServiceClient::new(
                context.clone(),
                Arc::clone(&self.registry),
                Arc::clone(&self.transport),
            );
            state.set_context(context);
            state.set_client(client);

            next.run(state, request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_client::{OutboundRequest, OutboundResponse, TransportError};
    use hermes_core::Response;
    use http::{Method, StatusCode};

    struct NoopTransport;

    impl Transport for NoopTransport {
        fn send<'a>(
            &'a self,
            _request: OutboundRequest,
            _timeout: Duration,
        ) -> hermes_client::BoxFuture<'a, Result<OutboundResponse, TransportError>> {
            Box::pin(async {
                Ok(OutboundResponse {
                    status: 200,
                    headers: http::HeaderMap::new(),
                    body: bytes::Bytes::new(),
                })
            })
        }
    }

    fn stage() -> ContextPropagation {
        ContextPropagation::new(
            "catalog",
            Duration::from_secs(30),
            Arc::new(ServiceRegistry::new()),
            Arc::new(NoopTransport),
        )
    }

    #[tokio::test]
    async fn test_inbound_trace_id_reused() {
        let stage = stage();
        let mut state = RequestState::new();
        let request = Request::builder(Method::GET, "/")
            .header("x-trace-id", "inbound-trace")
            .build();

        let next = Next::handler(|state, _request| {
            let trace = state.context().unwrap().trace_id().to_string();
            Box::pin(async move { Ok(Response::text(StatusCode::OK, trace)) })
        });
        let response = stage.process(&mut state, request, next).await.unwrap();

        assert_eq!(response.body().as_ref(), b"inbound-trace");
        assert_eq!(state.context().unwrap().trace_id().as_str(), "inbound-trace");
    }

    #[tokio::test]
    async fn test_missing_trace_id_is_minted() {
        let stage = stage();
        let mut state = RequestState::new();
        let request = Request::builder(Method::GET, "/").build();

        let next = Next::handler(|_state, _request| {
            Box::pin(async { Ok(Response::new(StatusCode::OK)) })
        });
        stage.process(&mut state, request, next).await.unwrap();

        let context = state.context().unwrap();
        assert!(!context.trace_id().as_str().is_empty());
        assert!(!context.is_expired());
        assert!(context.remaining() <= Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_client_shares_request_trace() {
        let stage = stage();
        let mut state = RequestState::new();
        let request = Request::builder(Method::GET, "/")
            .header("x-trace-id", "t-1")
            .build();

        let next = Next::handler(|_state, _request| {
            Box::pin(async { Ok(Response::new(StatusCode::OK)) })
        });
        stage.process(&mut state, request, next).await.unwrap();

        let client = state.client().expect("client attached");
        assert_eq!(client.context().trace_id().as_str(), "t-1");
    }
}
