//! Persistence collaborator surface for Hermes.
//!
//! The framework core needs exactly four capabilities from a persistence
//! engine: acquire a session, execute statements on it, and commit or roll
//! back the unit of work. [`Database`] and [`Session`] capture that
//! surface; [`MemoryDatabase`] is the bundled in-memory engine used by
//! tests and demos.

mod memory;
mod session;

pub use memory::{MemoryDatabase, MemorySession};
pub use session::{BoxFuture, Database, Session, Statement};
