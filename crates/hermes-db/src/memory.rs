//! In-memory persistence engine with staged writes.
//!
//! Used by tests and demos to exercise the commit/rollback contract without
//! a real database. Writes stage inside the session and only reach the
//! shared store on commit, so a rolled-back request leaves no trace.

use crate::session::{BoxFuture, Database, Session, Statement};
use hermes_core::{HermesError, HermesResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared committed state.
type Store = Arc<Mutex<HashMap<String, serde_json::Value>>>;

/// An in-memory database handing out staged-write sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    store: Store,
}

impl MemoryDatabase {
    /// Creates an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the committed value under `key`, bypassing any session.
    ///
    /// Test helper: lets assertions observe exactly what a concurrent
    /// request would see.
    #[must_use]
    pub fn committed(&self, key: &str) -> Option<serde_json::Value> {
        self.store.lock().get(key).cloned()
    }

    /// Returns the number of committed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    /// Returns `true` if nothing has been committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }
}

impl Database for MemoryDatabase {
    fn acquire_session<'a>(&'a self) -> BoxFuture<'a, HermesResult<Arc<dyn Session>>> {
        let store = Arc::clone(&self.store);
        Box::pin(async move {
            let session: Arc<dyn Session> = Arc::new(MemorySession {
                store,
                staged: Mutex::new(Vec::new()),
                closed: AtomicBool::new(false),
            });
            Ok(session)
        })
    }
}

/// A staged write queued in a session.
#[derive(Debug, Clone)]
enum StagedWrite {
    Put(String, serde_json::Value),
    Delete(String),
}

/// One request's unit of work over the shared store.
#[derive(Debug)]
pub struct MemorySession {
    store: Store,
    staged: Mutex<Vec<StagedWrite>>,
    closed: AtomicBool,
}

impl MemorySession {
    fn ensure_open(&self) -> HermesResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(HermesError::internal("session used after close"));
        }
        Ok(())
    }

    /// Reads `key`, preferring this session's own staged writes over the
    /// committed store.
    fn read(&self, key: &str) -> Option<serde_json::Value> {
        for write in self.staged.lock().iter().rev() {
            match write {
                StagedWrite::Put(k, v) if k == key => return Some(v.clone()),
                StagedWrite::Delete(k) if k == key => return None,
                _ => {}
            }
        }
        self.store.lock().get(key).cloned()
    }
}

impl Session for MemorySession {
    fn execute<'a>(
        &'a self,
        statement: Statement,
    ) -> BoxFuture<'a, HermesResult<Option<serde_json::Value>>> {
        Box::pin(async move {
            self.ensure_open()?;
            match statement {
                Statement::Put { key, value } => {
                    self.staged.lock().push(StagedWrite::Put(key, value));
                    Ok(None)
                }
                Statement::Get { key } => Ok(self.read(&key)),
                Statement::Delete { key } => {
                    self.staged.lock().push(StagedWrite::Delete(key));
                    Ok(None)
                }
            }
        })
    }

    fn commit<'a>(&'a self) -> BoxFuture<'a, HermesResult<()>> {
        Box::pin(async move {
            self.ensure_open()?;
            let staged: Vec<StagedWrite> = self.staged.lock().drain(..).collect();
            let mut store = self.store.lock();
            for write in staged {
                match write {
                    StagedWrite::Put(key, value) => {
                        store.insert(key, value);
                    }
                    StagedWrite::Delete(key) => {
                        store.remove(&key);
                    }
                }
            }
            Ok(())
        })
    }

    fn rollback<'a>(&'a self) -> BoxFuture<'a, HermesResult<()>> {
        Box::pin(async move {
            self.ensure_open()?;
            self.staged.lock().clear();
            Ok(())
        })
    }

    fn close<'a>(&'a self) -> BoxFuture<'a, HermesResult<()>> {
        Box::pin(async move {
            let already_closed = self.closed.swap(true, Ordering::SeqCst);
            if !already_closed && !self.staged.lock().is_empty() {
                tracing::warn!("session closed with uncommitted writes; discarding");
                self.staged.lock().clear();
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn session_for(db: &MemoryDatabase) -> Arc<dyn Session> {
        db.acquire_session().await.expect("acquire session")
    }

    #[tokio::test]
    async fn test_write_invisible_until_commit() {
        let db = MemoryDatabase::new();
        let session = session_for(&db).await;

        session
            .execute(Statement::Put {
                key: "item:1".to_string(),
                value: json!({"name": "Milk"}),
            })
            .await
            .unwrap();

        assert!(db.committed("item:1").is_none());
        session.commit().await.unwrap();
        assert_eq!(db.committed("item:1").unwrap()["name"], "Milk");
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let db = MemoryDatabase::new();
        let session = session_for(&db).await;

        session
            .execute(Statement::Put {
                key: "item:1".to_string(),
                value: json!(1),
            })
            .await
            .unwrap();
        session.rollback().await.unwrap();
        session.commit().await.unwrap();

        assert!(db.committed("item:1").is_none());
        assert!(db.is_empty());
    }

    #[tokio::test]
    async fn test_session_reads_its_own_staged_writes() {
        let db = MemoryDatabase::new();
        let session = session_for(&db).await;

        session
            .execute(Statement::Put {
                key: "k".to_string(),
                value: json!("staged"),
            })
            .await
            .unwrap();

        let read = session
            .execute(Statement::Get {
                key: "k".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(read.unwrap(), json!("staged"));
    }

    #[tokio::test]
    async fn test_staged_delete_shadows_committed_value() {
        let db = MemoryDatabase::new();
        let writer = session_for(&db).await;
        writer
            .execute(Statement::Put {
                key: "k".to_string(),
                value: json!(1),
            })
            .await
            .unwrap();
        writer.commit().await.unwrap();

        let session = session_for(&db).await;
        session
            .execute(Statement::Delete {
                key: "k".to_string(),
            })
            .await
            .unwrap();

        let read = session
            .execute(Statement::Get {
                key: "k".to_string(),
            })
            .await
            .unwrap();
        assert!(read.is_none());
        // Not committed, so the shared store still has it.
        assert!(db.committed("k").is_some());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let db = MemoryDatabase::new();
        let a = session_for(&db).await;
        let b = session_for(&db).await;

        a.execute(Statement::Put {
            key: "k".to_string(),
            value: json!("from-a"),
        })
        .await
        .unwrap();

        let read = b
            .execute(Statement::Get {
                key: "k".to_string(),
            })
            .await
            .unwrap();
        assert!(read.is_none());
    }

    #[tokio::test]
    async fn test_use_after_close_fails() {
        let db = MemoryDatabase::new();
        let session = session_for(&db).await;

        session.close().await.unwrap();
        // close is idempotent
        session.close().await.unwrap();

        let result = session
            .execute(Statement::Get {
                key: "k".to_string(),
            })
            .await;
        assert!(result.is_err());
        assert!(session.commit().await.is_err());
    }
}
