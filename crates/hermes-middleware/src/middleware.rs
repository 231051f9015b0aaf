//! Core middleware trait and types.
//!
//! A middleware stage sees the request on the way in, the outcome on the
//! way out, and decides whether to continue down the chain. The outcome is
//! a [`Result`] rather than a bare response so stages like the transaction
//! boundary can distinguish success from failure before the dispatcher
//! renders anything.
//!
//! # Example
//!
//! ```
//! use hermes_middleware::{BoxFuture, Middleware, Next, Outcome, RequestState};
//! use hermes_core::Request;
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         state: &'a mut RequestState,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, Outcome> {
//!         Box::pin(async move {
//!             let started = std::time::Instant::now();
//!             let outcome = next.run(state, request).await;
//!             tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "handled");
//!             outcome
//!         })
//!     }
//! }
//! ```

use crate::state::RequestState;
use hermes_core::{HermesResult, Request, Response};
use std::future::Future;
use std::pin::Pin;

/// A boxed future, used throughout the chain to keep traits object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What flows back up the chain: a response, or an error still to be
/// rendered at the dispatcher boundary.
pub type Outcome = HermesResult<Response>;

/// A middleware stage.
///
/// # Invariants
///
/// - A stage calls `next.run()` at most once; not calling it short-circuits
///   the rest of the chain and the handler.
/// - A stage that propagates an error leaves rendering to the dispatcher
///   boundary; a stage that recovers locally returns `Ok` with its own
///   response.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the stage's name, used in logs.
    fn name(&self) -> &'static str;

    /// Processes the request, delegating to `next` to continue the chain.
    fn process<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome>;
}

/// The remainder of the chain, handed to each stage.
///
/// Consuming `run` makes "call next at most once" a compile-time property.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// More stages to run.
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    /// End of chain: the bound handler.
    Handler(Box<dyn FnOnce(&mut RequestState, Request) -> BoxFuture<'static, Outcome> + Send + 'a>),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that runs `middleware` and then the rest.
    #[must_use]
    pub fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates the terminal `Next` that invokes the handler.
    pub fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut RequestState, Request) -> BoxFuture<'static, Outcome> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Runs the next stage or the handler.
    pub async fn run(self, state: &mut RequestState, request: Request) -> Outcome {
        match self.inner {
            NextInner::Chain { middleware, next } => {
                middleware.process(state, request, *next).await
            }
            NextInner::Handler(handler) => handler(state, request).await,
        }
    }
}

/// A middleware built from a function, for stages too small to deserve a
/// struct.
///
/// # Example
///
/// The function must be generic over the chain lifetime, which closures
/// cannot express reliably; use an `fn` item:
///
/// ```
/// use hermes_middleware::{BoxFuture, FnMiddleware, Next, Outcome, RequestState};
/// use hermes_core::Request;
///
/// fn pass<'a>(
///     state: &'a mut RequestState,
///     request: Request,
///     next: Next<'a>,
/// ) -> BoxFuture<'a, Outcome> {
///     Box::pin(async move { next.run(state, request).await })
/// }
///
/// let stage = FnMiddleware::new("no-op", pass);
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a function-based middleware with the given name.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut RequestState, Request, Next<'a>) -> BoxFuture<'a, Outcome>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome> {
        (self.func)(state, request, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};

    fn request() -> Request {
        Request::builder(Method::GET, "/test").build()
    }

    #[tokio::test]
    async fn test_terminal_next_runs_handler() {
        let mut state = RequestState::new();
        let next = Next::handler(|_state, _request| {
            Box::pin(async { Ok(Response::new(StatusCode::OK)) })
        });

        let outcome = next.run(&mut state, request()).await;
        assert_eq!(outcome.unwrap().status(), StatusCode::OK);
    }

    fn mark<'a>(
        state: &'a mut RequestState,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            let outcome = next.run(state, request).await;
            outcome.map(|response| {
                response.with_header(
                    http::header::HeaderName::from_static("x-marker"),
                    http::HeaderValue::from_static("seen"),
                )
            })
        })
    }

    #[tokio::test]
    async fn test_fn_middleware_wraps_handler() {
        let stage = FnMiddleware::new("marker", mark);
        assert_eq!(stage.name(), "marker");

        let mut state = RequestState::new();
        let handler = Next::handler(|_state, _request| {
            Box::pin(async { Ok(Response::new(StatusCode::OK)) })
        });
        let next = Next::new(&stage, handler);

        let response = next.run(&mut state, request()).await.unwrap();
        assert_eq!(response.headers().get("x-marker").unwrap(), "seen");
    }

    fn forbid<'a>(
        _state: &'a mut RequestState,
        _request: Request,
        _next: Next<'a>,
    ) -> BoxFuture<'a, Outcome> {
        Box::pin(async { Ok(Response::new(StatusCode::FORBIDDEN)) })
    }

    #[tokio::test]
    async fn test_short_circuit_skips_handler() {
        let stage = FnMiddleware::new("gate", forbid);

        let mut state = RequestState::new();
        let handler = Next::handler(|_state, _request| {
            Box::pin(async {
                panic!("handler must not run");
            })
        });
        let next = Next::new(&stage, handler);

        let response = next.run(&mut state, request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
