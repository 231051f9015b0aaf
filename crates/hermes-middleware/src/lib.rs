//! Composable middleware for Hermes.
//!
//! Requests flow through an ordered [`Chain`] of [`Middleware`] stages to a
//! terminal handler; the [`Outcome`] flows back in reverse order. Each
//! stage sees mutable [`RequestState`] where the built-in stages attach the
//! request context, the outbound service client, and the persistence
//! session.

mod chain;
mod middleware;
mod state;
pub mod stages;

pub use chain::{BoxedMiddleware, Chain};
pub use middleware::{BoxFuture, FnMiddleware, Middleware, Next, Outcome};
pub use state::RequestState;
