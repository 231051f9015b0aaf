//! The application: route registration, chain assembly, and dispatch.

use crate::handler::{ErasedHandler, HandlerContext, HandlerDescriptor};
use hermes_client::{ReqwestTransport, ServiceRegistry, Transport};
use hermes_config::HermesConfig;
use hermes_core::{HermesError, HermesResult, Request, Response};
use hermes_db::Database;
use hermes_middleware::stages::{
    AdmissionControl, ContextPropagation, SessionAcquisition, TransactionBoundary,
};
use hermes_middleware::{Chain, Middleware, RequestState};
use hermes_router::RouteTable;
use http::Method;
use std::sync::Arc;
use std::time::Instant;

/// One registered route: the descriptor, the erased handler, and any
/// route-specific middleware.
struct Route {
    descriptor: HandlerDescriptor,
    handler: Arc<dyn ErasedHandler>,
    stages: Chain,
}

/// An assembled application, ready to dispatch requests.
///
/// The chain order is fixed at build time: admission control outermost,
/// then context propagation, then application middleware in registration
/// order, then session acquisition and the transaction boundary when a
/// database is configured, and finally any route-specific middleware
/// directly around the handler.
///
/// # Example
///
/// ```
/// use hermes::{handler_fn, App, Json};
/// use http::Method;
/// use serde_json::json;
///
/// # fn main() -> hermes_core::HermesResult<()> {
/// let app = App::builder()
///     .route(
///         Method::GET,
///         "/health",
///         "health",
///         handler_fn(|_ctx| async { Ok(Json(json!({"status": "ok"}))) }),
///     )?
///     .build()?;
/// # let _ = app;
/// # Ok(())
/// # }
/// ```
pub struct App {
    routes: RouteTable<Route>,
    chain: Chain,
}

impl App {
    /// Starts building an application.
    #[must_use]
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Returns the names of the assembled chain stages, in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.chain.stage_names()
    }

    /// Dispatches one request and renders whatever comes back.
    ///
    /// Requests with no matching route are answered 404 before the chain
    /// runs, so unroutable traffic never consumes admission capacity.
    /// Chain errors are rendered through the error envelope here and
    /// nowhere else.
    pub async fn handle(&self, request: Request) -> Response {
        let method = request.method().clone();
        let path = request.path().to_string();
        let started = Instant::now();

        let Some(matched) = self.routes.resolve(&method, &path) else {
            tracing::debug!(http.method = %method, http.path = %path, "no route matched");
            let error = HermesError::not_found(format!("no route for {method} {path}"));
            return Response::from_error(&error, None);
        };
        let params = matched.params;
        let route = matched.value;
        let handler = Arc::clone(&route.handler);
        let descriptor = route.descriptor.clone();

        let mut chain = self.chain.clone();
        chain.extend(&route.stages);

        let mut state = RequestState::new();
        let outcome = chain
            .run(&mut state, request, move |state, request| {
                let (Some(context), Some(client)) = (state.context(), state.client()) else {
                    return Box::pin(async {
                        Err(HermesError::internal("request context missing at handler"))
                    });
                };
                let ctx = HandlerContext::new(
                    request,
                    params,
                    context.clone(),
                    client.clone(),
                    state.session(),
                );
                handler.call(ctx)
            })
            .await;

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let trace_id = state.context().map(|c| c.trace_id().to_string());

        match outcome {
            Ok(response) => {
                tracing::info!(
                    http.method = %method,
                    http.path = %path,
                    http.status_code = response.status().as_u16(),
                    handler = descriptor.name(),
                    duration_ms,
                    trace_id = trace_id.as_deref().unwrap_or(""),
                    "request completed"
                );
                response
            }
            Err(error) => {
                if error.status_code().is_server_error() {
                    tracing::error!(
                        http.method = %method,
                        http.path = %path,
                        http.status_code = error.status_code().as_u16(),
                        handler = descriptor.name(),
                        duration_ms,
                        trace_id = trace_id.as_deref().unwrap_or(""),
                        error = %error,
                        "request failed"
                    );
                } else {
                    tracing::info!(
                        http.method = %method,
                        http.path = %path,
                        http.status_code = error.status_code().as_u16(),
                        handler = descriptor.name(),
                        duration_ms,
                        trace_id = trace_id.as_deref().unwrap_or(""),
                        "request rejected"
                    );
                }
                Response::from_error(&error, trace_id.as_deref())
            }
        }
    }
}

/// Builder for [`App`].
pub struct AppBuilder {
    config: HermesConfig,
    registry: ServiceRegistry,
    transport: Arc<dyn Transport>,
    database: Option<Arc<dyn Database>>,
    stages: Chain,
    routes: RouteTable<Route>,
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppBuilder {
    /// Creates a builder with default configuration and transport.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HermesConfig::default(),
            registry: ServiceRegistry::new(),
            transport: Arc::new(ReqwestTransport::new()),
            database: None,
            stages: Chain::new(),
            routes: RouteTable::new(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn config(mut self, config: HermesConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a downstream service by logical name.
    #[must_use]
    pub fn service(mut self, name: impl Into<String>, base_url: impl Into<String>) -> Self {
        self.registry.register(name, base_url);
        self
    }

    /// Replaces the outbound transport. Tests use this to script responses.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Configures a database; adds session acquisition and the transaction
    /// boundary to the chain.
    #[must_use]
    pub fn database(mut self, database: Arc<dyn Database>) -> Self {
        self.database = Some(database);
        self
    }

    /// Appends an application middleware stage. Stages run in registration
    /// order, after the built-in admission and context stages.
    #[must_use]
    pub fn middleware<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(middleware);
        self
    }

    /// Registers a route.
    ///
    /// Exact templates always win over pattern templates; among pattern
    /// routes, the first registered match wins. Re-registering an exact
    /// template replaces the previous handler.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a malformed template.
    pub fn route(
        self,
        method: Method,
        template: &str,
        name: &str,
        handler: Arc<dyn ErasedHandler>,
    ) -> HermesResult<Self> {
        self.route_with(method, template, name, handler, Chain::new())
    }

    /// Registers a route with route-specific middleware, run innermost.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a malformed template.
    pub fn route_with(
        mut self,
        method: Method,
        template: &str,
        name: &str,
        handler: Arc<dyn ErasedHandler>,
        stages: Chain,
    ) -> HermesResult<Self> {
        let route = Route {
            descriptor: HandlerDescriptor::new(name, method.clone(), template),
            handler,
            stages,
        };
        self.routes.insert(method, template, route).map_err(|e| {
            HermesError::configuration(format!("invalid route template '{template}': {e}"))
        })?;
        Ok(self)
    }

    /// Validates the configuration and assembles the chain.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when validation fails.
    pub fn build(self) -> HermesResult<App> {
        self.config
            .validate()
            .map_err(|e| HermesError::configuration(e.to_string()))?;

        let mut registry = self.registry;
        for (name, base_url) in &self.config.services {
            registry.register(name.clone(), base_url.clone());
        }
        let registry = Arc::new(registry);

        let mut chain = Chain::new();
        chain.push(AdmissionControl::new(
            self.config.admission.capacity,
            self.config.admission.max_wait(),
        ));
        chain.push(ContextPropagation::new(
            self.config.service_name.clone(),
            self.config.deadline_budget(),
            registry,
            self.transport,
        ));
        chain.extend(&self.stages);
        if let Some(database) = self.database {
            chain.push(SessionAcquisition::new(database));
            chain.push(TransactionBoundary::new());
        }

        Ok(App {
            routes: self.routes,
            chain,
        })
    }
}
