//! Transaction boundary: commit on success, roll back on failure.

use crate::middleware::{BoxFuture, Middleware, Next, Outcome};
use crate::state::RequestState;
use hermes_core::Request;

/// Wraps the continuation in a unit of work on the request's session.
///
/// A successful outcome commits; a failed one rolls back and the original
/// error keeps propagating. Commit failure replaces success with an error,
/// since the handler's writes were not made durable. Rollback failure is
/// logged but never masks the error that triggered it.
///
/// Runs inside [`SessionAcquisition`](crate::stages::SessionAcquisition);
/// without a session on the state it is a pass-through.
pub struct TransactionBoundary;

impl TransactionBoundary {
    /// Creates the stage.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for TransactionBoundary {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for TransactionBoundary {
    fn name(&self) -> &'static str {
        "transaction"
    }

    fn process<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            let Some(session) = state.session() else {
                return next.run(state, request).await;
            };

            let outcome = next.run(state, request).await;
            match outcome {
                Ok(response) => {
                    session.commit().await?;
                    Ok(response)
                }
                Err(error) => {
                    if let Err(rollback_error) = session.rollback().await {
                        tracing::error!(
                            error = %rollback_error,
                            "rollback failed after request error"
                        );
                    }
                    Err(error)
                }
            }
        })
    }
}
