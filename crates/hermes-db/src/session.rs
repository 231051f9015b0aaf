//! The persistence collaborator surface.
//!
//! Hermes treats the persistence engine as opaque: it acquires one session
//! per request, hands it to the handler, and commits or rolls back at the
//! transaction boundary. What a [`Statement`] means is the engine's
//! business.

use hermes_core::HermesResult;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed future, used to keep the collaborator traits object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A statement executed within a session.
///
/// The core never inspects statements; this enum is the vocabulary of the
/// bundled in-memory engine and of tests. Real engines define their own
/// statement text and map it behind the same trait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Stage a write of `value` under `key`.
    Put {
        /// Target key.
        key: String,
        /// Value to store.
        value: serde_json::Value,
    },
    /// Read the current value under `key`.
    Get {
        /// Key to read.
        key: String,
    },
    /// Stage a delete of `key`.
    Delete {
        /// Key to remove.
        key: String,
    },
}

/// A unit-of-work handle, exclusively owned by one request.
///
/// Writes are not visible outside the session until [`Session::commit`];
/// [`Session::rollback`] discards them. [`Session::close`] releases the
/// underlying resources and is safe to call after either.
pub trait Session: Send + Sync {
    /// Executes a statement, returning the read value for queries.
    fn execute<'a>(
        &'a self,
        statement: Statement,
    ) -> BoxFuture<'a, HermesResult<Option<serde_json::Value>>>;

    /// Makes the session's staged writes durable.
    fn commit<'a>(&'a self) -> BoxFuture<'a, HermesResult<()>>;

    /// Discards the session's staged writes.
    fn rollback<'a>(&'a self) -> BoxFuture<'a, HermesResult<()>>;

    /// Releases the session. Idempotent.
    fn close<'a>(&'a self) -> BoxFuture<'a, HermesResult<()>>;
}

/// Hands out sessions; the engine behind it is opaque.
pub trait Database: Send + Sync {
    /// Acquires a session scoped to one request.
    fn acquire_session<'a>(&'a self) -> BoxFuture<'a, HermesResult<Arc<dyn Session>>>;
}
