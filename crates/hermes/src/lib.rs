//! # Hermes
//!
//! A lightweight async service framework: a route table with exact and
//! pattern templates, a composable middleware chain, admission control
//! with a wait budget, per-request trace and deadline propagation, a
//! deadline-aware outbound service client, and a pluggable persistence
//! session with transactional request semantics.
//!
//! ## Quick start
//!
//! ```
//! use hermes::{handler_fn, App, Json};
//! use hermes_core::Request;
//! use http::Method;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> hermes_core::HermesResult<()> {
//! let app = App::builder()
//!     .route(
//!         Method::GET,
//!         "/items/{id}",
//!         "get_item",
//!         handler_fn(|ctx| async move {
//!             let id = ctx.param("id")?.to_string();
//!             Ok(Json(json!({ "id": id })))
//!         }),
//!     )?
//!     .build()?;
//!
//! let response = app.handle(Request::builder(Method::GET, "/items/7").build()).await;
//! assert_eq!(response.status(), http::StatusCode::OK);
//! # Ok(())
//! # }
//! ```
//!
//! ## Request flow
//!
//! ```text
//! Request → route resolution → Admission → Context → app middleware
//!           → [Session → Transaction] → route middleware → Handler
//! ```
//!
//! Errors propagate back up the chain as values; the dispatcher boundary
//! renders them into JSON envelopes exactly once.

mod app;
mod handler;
mod respond;

pub use app::{App, AppBuilder};
pub use handler::{
    decode_field, decode_optional_field, handler_fn, payload_handler, ErasedHandler, FromPayload,
    HandlerContext, HandlerDescriptor,
};
pub use respond::{IntoResponse, Json};

// Re-export the component crates under their concern names.
pub use hermes_client as client;
pub use hermes_config as config;
pub use hermes_core as core;
pub use hermes_db as db;
pub use hermes_middleware as middleware;
pub use hermes_router as router;
pub use hermes_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use hermes::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        decode_field, decode_optional_field, handler_fn, payload_handler, App, FromPayload,
        HandlerContext, IntoResponse, Json,
    };
    pub use hermes_client::{ServiceClient, ServiceRegistry};
    pub use hermes_config::{ConfigLoader, HermesConfig};
    pub use hermes_core::{
        FieldErrors, HermesError, HermesResult, Request, RequestContext, Response, TraceId,
    };
    pub use hermes_db::{Database, MemoryDatabase, Session, Statement};
    pub use hermes_middleware::{Chain, FnMiddleware, Middleware, Next, Outcome, RequestState};
    pub use hermes_telemetry::{init_logging, LogConfig};
}
