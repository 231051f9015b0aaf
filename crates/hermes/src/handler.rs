//! Handler binding: what a route handler receives and how it is erased.
//!
//! The dispatcher binds each request to a [`HandlerContext`] carrying the
//! request, the captured path parameters, the request context, the outbound
//! client, and the persistence session when one is configured. Handlers are
//! stored type-erased behind [`ErasedHandler`]; [`handler_fn`] and
//! [`payload_handler`] adapt plain async functions into that shape.

use crate::respond::IntoResponse;
use hermes_client::ServiceClient;
use hermes_core::{FieldErrors, HermesError, HermesResult, Request, RequestContext, Response};
use hermes_db::Session;
use hermes_middleware::BoxFuture;
use hermes_router::Params;
use http::Method;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// Everything a handler gets for one request.
pub struct HandlerContext {
    request: Request,
    params: Params,
    context: RequestContext,
    client: ServiceClient,
    session: Option<Arc<dyn Session>>,
}

impl HandlerContext {
    pub(crate) fn new(
        request: Request,
        params: Params,
        context: RequestContext,
        client: ServiceClient,
        session: Option<Arc<dyn Session>>,
    ) -> Self {
        Self {
            request,
            params,
            context,
            client,
            session,
        }
    }

    /// Returns the inbound request.
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Returns the captured path parameters.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns the value captured for `name`.
    ///
    /// # Errors
    ///
    /// Returns an internal error when the template declares no such
    /// capture; route matching guarantees every declared capture is filled.
    pub fn param(&self, name: &str) -> HermesResult<&str> {
        self.params
            .get(name)
            .ok_or_else(|| HermesError::internal(format!("no path parameter '{name}'")))
    }

    /// Returns the request context (trace identity, deadline).
    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Returns the outbound service client bound to this request.
    #[must_use]
    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    /// Returns the persistence session.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the application has no database
    /// configured.
    pub fn session(&self) -> HermesResult<Arc<dyn Session>> {
        self.session
            .clone()
            .ok_or_else(|| HermesError::configuration("no database configured"))
    }
}

impl std::fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerContext")
            .field("path", &self.request.path())
            .field("params", &self.params)
            .field("trace_id", &self.context.trace_id())
            .finish_non_exhaustive()
    }
}

/// A type-erased route handler.
pub trait ErasedHandler: Send + Sync {
    /// Runs the handler for one bound request.
    fn call(&self, ctx: HandlerContext) -> BoxFuture<'static, HermesResult<Response>>;
}

/// What a route was bound to, computed once at registration.
#[derive(Debug, Clone)]
pub struct HandlerDescriptor {
    name: String,
    method: Method,
    template: String,
}

impl HandlerDescriptor {
    pub(crate) fn new(name: impl Into<String>, method: Method, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            template: template.into(),
        }
    }

    /// Returns the handler's registered name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the bound HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the route template the handler was registered under.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }
}

struct FnHandler<F, Fut, R> {
    func: F,
    _marker: PhantomData<fn() -> (Fut, R)>,
}

impl<F, Fut, R> ErasedHandler for FnHandler<F, Fut, R>
where
    F: Fn(HandlerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HermesResult<R>> + Send + 'static,
    R: IntoResponse + 'static,
{
    fn call(&self, ctx: HandlerContext) -> BoxFuture<'static, HermesResult<Response>> {
        let future = (self.func)(ctx);
        Box::pin(async move { future.await.and_then(IntoResponse::into_response) })
    }
}

/// Adapts an async function into an [`ErasedHandler`].
///
/// # Example
///
/// ```
/// use hermes::{handler_fn, Json};
/// use serde_json::json;
///
/// let handler = handler_fn(|ctx| async move {
///     let id = ctx.param("id")?.to_string();
///     Ok(Json(json!({ "id": id })))
/// });
/// # let _ = handler;
/// ```
pub fn handler_fn<F, Fut, R>(func: F) -> Arc<dyn ErasedHandler>
where
    F: Fn(HandlerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HermesResult<R>> + Send + 'static,
    R: IntoResponse + 'static,
{
    Arc::new(FnHandler {
        func,
        _marker: PhantomData,
    })
}

/// Structured input constructed from a parsed JSON payload.
///
/// Implementations report everything wrong with the payload at once through
/// [`FieldErrors`] rather than failing on the first bad field;
/// [`decode_field`] does the bookkeeping for the common cases.
///
/// # Example
///
/// ```
/// use hermes::{decode_field, FromPayload};
/// use hermes_core::{FieldErrors, HermesError, HermesResult};
///
/// struct NewItem {
///     name: String,
///     price: f64,
/// }
///
/// impl FromPayload for NewItem {
///     fn from_payload(value: &serde_json::Value) -> HermesResult<Self> {
///         let mut errors = FieldErrors::new();
///         let name = decode_field(value, "name", &mut errors);
///         let price = decode_field(value, "price", &mut errors);
///         match (name, price) {
///             (Some(name), Some(price)) if errors.is_empty() => Ok(Self { name, price }),
///             _ => Err(HermesError::validation_with_fields("invalid payload", errors)),
///         }
///     }
/// }
/// ```
pub trait FromPayload: Sized {
    /// Constructs the value, collecting field-level errors on failure.
    ///
    /// # Errors
    ///
    /// Returns a validation error carrying [`FieldErrors`] when the payload
    /// does not satisfy the type's requirements.
    fn from_payload(value: &serde_json::Value) -> HermesResult<Self>;
}

/// Decodes a required field, recording a field error instead of failing.
///
/// Returns `None` when the field is missing, null, or of the wrong shape;
/// the reason lands in `errors` under the field's name.
pub fn decode_field<T: DeserializeOwned>(
    value: &serde_json::Value,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<T> {
    match value.get(field) {
        None | Some(serde_json::Value::Null) => {
            errors.add(field, "is required");
            None
        }
        Some(raw) => match serde_json::from_value(raw.clone()) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                errors.add(field, e.to_string());
                None
            }
        },
    }
}

/// Decodes an optional field, recording a field error only on shape
/// mismatch. Missing and null both decode as `None`.
pub fn decode_optional_field<T: DeserializeOwned>(
    value: &serde_json::Value,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<Option<T>> {
    match value.get(field) {
        None | Some(serde_json::Value::Null) => Some(None),
        Some(raw) => match serde_json::from_value(raw.clone()) {
            Ok(decoded) => Some(Some(decoded)),
            Err(e) => {
                errors.add(field, e.to_string());
                None
            }
        },
    }
}

struct PayloadHandler<T, F, Fut, R> {
    func: F,
    _marker: PhantomData<fn(T) -> (Fut, R)>,
}

impl<T, F, Fut, R> ErasedHandler for PayloadHandler<T, F, Fut, R>
where
    T: FromPayload + Send + 'static,
    F: Fn(HandlerContext, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HermesResult<R>> + Send + 'static,
    R: IntoResponse + 'static,
{
    fn call(&self, ctx: HandlerContext) -> BoxFuture<'static, HermesResult<Response>> {
        // An unparseable body is a 400; a parsed body that fails
        // construction is a 422 with the collected field errors.
        let payload = ctx.request().json().and_then(|value| T::from_payload(&value));
        match payload {
            Ok(payload) => {
                let future = (self.func)(ctx, payload);
                Box::pin(async move { future.await.and_then(IntoResponse::into_response) })
            }
            Err(error) => Box::pin(async move { Err(error) }),
        }
    }
}

/// Adapts an async function taking a validated payload into an
/// [`ErasedHandler`].
pub fn payload_handler<T, F, Fut, R>(func: F) -> Arc<dyn ErasedHandler>
where
    T: FromPayload + Send + 'static,
    F: Fn(HandlerContext, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HermesResult<R>> + Send + 'static,
    R: IntoResponse + 'static,
{
    Arc::new(PayloadHandler {
        func,
        _marker: PhantomData,
    })
}
