//! Admission control: bounded concurrency with a wait budget.

use crate::middleware::{BoxFuture, Middleware, Next, Outcome};
use crate::state::RequestState;
use hermes_core::{HermesError, Request, Response};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Seconds callers are told to back off when rejected.
const RETRY_AFTER_SECONDS: u64 = 1;

/// Caps in-flight requests at a fixed capacity.
///
/// A request over capacity waits up to the wait budget for a permit; if
/// none frees up it is rejected with 503 and a `Retry-After` hint. The
/// permit is held for the rest of the chain, so it is released whichever
/// way the request ends, including cancellation.
pub struct AdmissionControl {
    semaphore: Arc<Semaphore>,
    max_wait: Duration,
}

impl AdmissionControl {
    /// Creates a controller admitting at most `capacity` concurrent
    /// requests, each waiting at most `max_wait` for admission.
    #[must_use]
    pub fn new(capacity: usize, max_wait: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            max_wait,
        }
    }

    /// Returns the number of requests that could be admitted right now.
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

impl Middleware for AdmissionControl {
    fn name(&self) -> &'static str {
        "admission"
    }

    fn process<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            let acquired = tokio::time::timeout(
                self.max_wait,
                Arc::clone(&self.semaphore).acquire_owned(),
            )
            .await;

            let permit = match acquired {
                Ok(Ok(permit)) => permit,
                // The semaphore is never closed while the dispatcher runs.
                Ok(Err(_)) => {
                    return Err(HermesError::internal("admission semaphore closed"));
                }
                Err(_) => {
                    tracing::warn!(
                        path = request.path(),
                        max_wait_ms = self.max_wait.as_millis() as u64,
                        "request rejected: capacity exhausted past wait budget"
                    );
                    let error = HermesError::admission_rejected(RETRY_AFTER_SECONDS);
                    return Ok(Response::from_error(&error, None));
                }
            };

            let outcome = next.run(state, request).await;
            drop(permit);
            outcome
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};
    use tokio::sync::Notify;

    fn request() -> Request {
        Request::builder(Method::GET, "/work").build()
    }

    /// Runs one request through the stage, parking inside the handler until
    /// `gate` fires.
    fn spawn_holder(
        stage: Arc<AdmissionControl>,
        gate: Arc<Notify>,
    ) -> tokio::task::JoinHandle<Outcome> {
        tokio::spawn(async move {
            let mut state = RequestState::new();
            let next = Next::handler(move |_state, _request| {
                Box::pin(async move {
                    gate.notified().await;
                    Ok(Response::new(StatusCode::OK))
                })
            });
            stage.process(&mut state, request(), next).await
        })
    }

    #[tokio::test]
    async fn test_under_capacity_passes_through() {
        let stage = AdmissionControl::new(2, Duration::from_millis(100));
        let mut state = RequestState::new();
        let next = Next::handler(|_state, _request| {
            Box::pin(async { Ok(Response::new(StatusCode::OK)) })
        });

        let outcome = stage.process(&mut state, request(), next).await;
        assert_eq!(outcome.unwrap().status(), StatusCode::OK);
        assert_eq!(stage.available_permits(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overflow_rejected_after_wait_budget() {
        let stage = Arc::new(AdmissionControl::new(1, Duration::from_millis(100)));
        let gate = Arc::new(Notify::new());
        let holder = spawn_holder(Arc::clone(&stage), Arc::clone(&gate));

        // Let the holder take the only permit.
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(stage.available_permits(), 0);

        let mut state = RequestState::new();
        let next = Next::handler(|_state, _request| {
            Box::pin(async {
                panic!("handler must not run for a rejected request");
            })
        });
        let response = stage
            .process(&mut state, request(), next)
            .await
            .expect("rejection is rendered locally");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers().get(http::header::RETRY_AFTER).unwrap(), "1");
        let body = response.body_json().unwrap();
        assert_eq!(body["error"]["code"], "ADMISSION_REJECTED");

        gate.notify_one();
        let held = holder.await.unwrap();
        assert_eq!(held.unwrap().status(), StatusCode::OK);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiter_admitted_when_permit_frees_within_budget() {
        let stage = Arc::new(AdmissionControl::new(1, Duration::from_millis(100)));
        let gate = Arc::new(Notify::new());
        let holder = spawn_holder(Arc::clone(&stage), Arc::clone(&gate));
        tokio::time::sleep(Duration::from_millis(1)).await;

        // Free the permit while the second request is still inside its
        // wait budget.
        let release = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                gate.notify_one();
            })
        };

        let mut state = RequestState::new();
        let next = Next::handler(|_state, _request| {
            Box::pin(async { Ok(Response::new(StatusCode::OK)) })
        });
        let outcome = stage.process(&mut state, request(), next).await;
        assert_eq!(outcome.unwrap().status(), StatusCode::OK);

        release.await.unwrap();
        holder.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_permit_released_after_handler_error() {
        let stage = AdmissionControl::new(1, Duration::from_millis(100));
        let mut state = RequestState::new();
        let next = Next::handler(|_state, _request| {
            Box::pin(async { Err(HermesError::internal("boom")) })
        });

        let outcome = stage.process(&mut state, request(), next).await;
        assert!(outcome.is_err());
        assert_eq!(stage.available_permits(), 1);
    }
}
