//! Session acquisition: one persistence session per request.

use crate::middleware::{BoxFuture, Middleware, Next, Outcome};
use crate::state::RequestState;
use hermes_core::Request;
use hermes_db::Database;
use std::sync::Arc;

/// Acquires a session before the continuation and closes it after,
/// whichever way the request ends.
///
/// Acquisition failure propagates as an error without running anything
/// further down the chain. Close failure is logged but never overrides the
/// request's outcome.
pub struct SessionAcquisition {
    database: Arc<dyn Database>,
}

impl SessionAcquisition {
    /// Creates the stage over the given database.
    #[must_use]
    pub fn new(database: Arc<dyn Database>) -> Self {
        Self { database }
    }
}

impl Middleware for SessionAcquisition {
    fn name(&self) -> &'static str {
        "session"
    }

    fn process<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            let session = self.database.acquire_session().await?;
            state.set_session(Arc::clone(&session));

            let outcome = next.run(state, request).await;

            if let Err(error) = session.close().await {
                tracing::warn!(error = %error, "session close failed");
            }
            state.clear_session();
            outcome
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{HermesError, HermesResult, Response};
    use hermes_db::{MemoryDatabase, Session};
    use http::{Method, StatusCode};

    fn request() -> Request {
        Request::builder(Method::GET, "/items").build()
    }

    #[tokio::test]
    async fn test_session_attached_for_continuation_and_cleared_after() {
        let stage = SessionAcquisition::new(Arc::new(MemoryDatabase::new()));
        let mut state = RequestState::new();

        let next = Next::handler(|state, _request| {
            assert!(state.session().is_some(), "session visible to handler");
            Box::pin(async { Ok(Response::new(StatusCode::OK)) })
        });
        stage.process(&mut state, request(), next).await.unwrap();

        assert!(state.session().is_none(), "session cleared after close");
    }

    #[tokio::test]
    async fn test_session_closed_even_on_handler_error() {
        let stage = SessionAcquisition::new(Arc::new(MemoryDatabase::new()));
        let mut state = RequestState::new();

        let next = Next::handler(|state, _request| {
            let session = state.session().unwrap();
            Box::pin(async move {
                session
                    .execute(hermes_db::Statement::Get {
                        key: "k".to_string(),
                    })
                    .await?;
                Err::<Response, _>(HermesError::internal("boom"))
            })
        });

        let outcome = stage.process(&mut state, request(), next).await;
        assert!(outcome.is_err());
        assert!(state.session().is_none());
    }

    #[tokio::test]
    async fn test_acquisition_failure_short_circuits() {
        struct FailingDatabase;

        impl Database for FailingDatabase {
            fn acquire_session<'a>(
                &'a self,
            ) -> hermes_db::BoxFuture<'a, HermesResult<Arc<dyn Session>>> {
                Box::pin(async { Err(HermesError::internal("pool exhausted")) })
            }
        }

        let stage = SessionAcquisition::new(Arc::new(FailingDatabase));
        let mut state = RequestState::new();
        let next = Next::handler(|_state, _request| {
            Box::pin(async {
                panic!("continuation must not run without a session");
            })
        });

        let outcome = stage.process(&mut state, request(), next).await;
        assert!(outcome.is_err());
    }
}
