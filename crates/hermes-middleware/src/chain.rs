//! Ordered middleware chain.
//!
//! The chain is assembled once at startup and shared across requests; per
//! request it is folded back-to-front into a [`Next`] with the bound
//! handler as the terminal stage.

use crate::middleware::{BoxFuture, Middleware, Next, Outcome};
use crate::state::RequestState;
use hermes_core::Request;
use std::sync::Arc;

/// A type-erased middleware stage.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An ordered list of middleware stages.
///
/// Stages run in registration order on the way in and in reverse order on
/// the way out.
#[derive(Clone, Default)]
pub struct Chain {
    stages: Vec<BoxedMiddleware>,
}

impl Chain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage to the end of the chain.
    pub fn push<M: Middleware>(&mut self, middleware: M) {
        self.stages.push(Arc::new(middleware));
    }

    /// Appends an already-boxed stage.
    pub fn push_boxed(&mut self, middleware: BoxedMiddleware) {
        self.stages.push(middleware);
    }

    /// Appends every stage of `other` to this chain.
    pub fn extend(&mut self, other: &Chain) {
        self.stages.extend(other.stages.iter().map(Arc::clone));
    }

    /// Runs `request` through the chain, ending at `handler`.
    pub async fn run<H>(&self, state: &mut RequestState, request: Request, handler: H) -> Outcome
    where
        H: FnOnce(&mut RequestState, Request) -> BoxFuture<'static, Outcome> + Send + 'static,
    {
        let next = self.fold(handler);
        next.run(state, request).await
    }

    /// Folds the stages back-to-front around the terminal handler.
    fn fold<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut RequestState, Request) -> BoxFuture<'static, Outcome> + Send + 'a,
    {
        let mut next = Next::handler(handler);
        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }

    /// Returns the stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|m| m.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if the chain has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("stages", &self.stage_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::Response;
    use http::{Method, StatusCode};
    use parking_lot::Mutex;

    struct OrderTracking {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Middleware for OrderTracking {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            state: &'a mut RequestState,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, Outcome> {
            Box::pin(async move {
                self.log.lock().push(format!("{}:enter", self.name));
                let outcome = next.run(state, request).await;
                self.log.lock().push(format!("{}:exit", self.name));
                outcome
            })
        }
    }

    fn request() -> Request {
        Request::builder(Method::GET, "/test").build()
    }

    #[tokio::test]
    async fn test_stages_run_in_order_and_unwind_in_reverse() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = Chain::new();
        chain.push(OrderTracking {
            name: "outer",
            log: Arc::clone(&log),
        });
        chain.push(OrderTracking {
            name: "inner",
            log: Arc::clone(&log),
        });

        let handler_log = Arc::clone(&log);
        let mut state = RequestState::new();
        let outcome = chain
            .run(&mut state, request(), move |_state, _request| {
                Box::pin(async move {
                    handler_log.lock().push("handler".to_string());
                    Ok(Response::new(StatusCode::OK))
                })
            })
            .await;

        assert_eq!(outcome.unwrap().status(), StatusCode::OK);
        assert_eq!(
            *log.lock(),
            vec![
                "outer:enter",
                "inner:enter",
                "handler",
                "inner:exit",
                "outer:exit"
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_chain_goes_straight_to_handler() {
        let chain = Chain::new();
        let mut state = RequestState::new();
        let outcome = chain
            .run(&mut state, request(), |_state, _request| {
                Box::pin(async { Ok(Response::new(StatusCode::NO_CONTENT)) })
            })
            .await;
        assert_eq!(outcome.unwrap().status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_error_unwinds_through_earlier_stages() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = Chain::new();
        chain.push(OrderTracking {
            name: "outer",
            log: Arc::clone(&log),
        });

        let mut state = RequestState::new();
        let outcome = chain
            .run(&mut state, request(), |_state, _request| {
                Box::pin(async { Err(hermes_core::HermesError::not_found("nope")) })
            })
            .await;

        assert!(outcome.is_err());
        // The stage saw the error pass back through.
        assert_eq!(*log.lock(), vec!["outer:enter", "outer:exit"]);
    }

    #[test]
    fn test_stage_names_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = Chain::new();
        chain.push(OrderTracking {
            name: "a",
            log: Arc::clone(&log),
        });
        chain.push(OrderTracking {
            name: "b",
            log,
        });
        assert_eq!(chain.stage_names(), vec!["a", "b"]);
        assert_eq!(chain.len(), 2);
    }
}
