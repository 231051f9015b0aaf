//! Built-in middleware stages.
//!
//! The dispatcher wires these in a fixed order: admission control
//! outermost, then context propagation, then any application stages, with
//! session acquisition and the transaction boundary innermost when a
//! database is configured.

mod admission;
mod context;
mod session;
mod transaction;

pub use admission::AdmissionControl;
pub use context::ContextPropagation;
pub use session::SessionAcquisition;
pub use transaction::TransactionBoundary;
