//! Transactional executor: the single funnel for all database access.
//!
//! Reads run against pooled connections and may proceed concurrently (WAL
//! mode); writes are serialized through an async mutex and wrapped in one
//! exclusive transaction each. Every operation runs on the blocking pool so
//! callers suspend instead of blocking their own context.

use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use tokio::sync::Mutex;
use tokio::task;

use crate::error::VerdantError;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct Executor {
    pool: DbPool,
    write_lock: Arc<Mutex<()>>,
}

impl Executor {
    pub(crate) fn new(pool: DbPool) -> Self {
        Executor {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Run a read against the latest committed snapshot.
    pub async fn read<T, F>(&self, f: F) -> Result<T, VerdantError>
    where
        F: FnOnce(&Connection) -> Result<T, VerdantError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.pool.get()?;
        run_blocking(move || f(&conn)).await
    }

    /// Run `f` inside one exclusive transaction. Commits only if `f` returned
    /// `Ok`; any other exit path rolls back when the transaction drops.
    ///
    /// The mutex guarantees a single writer transaction in flight at a time
    /// at this layer; SQLite's own locking backs it up underneath.
    pub async fn write<T, F>(&self, f: F) -> Result<T, VerdantError>
    where
        F: FnOnce(&Transaction) -> Result<T, VerdantError> + Send + 'static,
        T: Send + 'static,
    {
        let _writer = self.write_lock.lock().await;
        let mut conn = self.pool.get()?;

        run_blocking(move || {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let out = f(&tx)?;
            tx.commit()?;
            Ok(out)
        })
        .await
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, VerdantError>
where
    F: FnOnce() -> Result<T, VerdantError> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(f)
        .await
        .map_err(|e| VerdantError::Error(format!("database task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use tempfile::TempDir;

    async fn test_executor() -> (TempDir, Executor) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("verdant.db"), None).unwrap();
        let executor = db.executor().clone();
        (dir, executor)
    }

    fn specimen_count(conn: &Connection) -> Result<i64, VerdantError> {
        let n = conn.query_row("SELECT COUNT(*) FROM specimen", [], |row| row.get(0))?;
        Ok(n)
    }

    #[tokio::test]
    async fn write_commits_on_success() {
        let (_dir, executor) = test_executor().await;

        executor
            .write(|tx| {
                tx.execute("INSERT INTO specimen (name) VALUES ('Fern')", [])?;
                Ok(())
            })
            .await
            .unwrap();

        let count = executor.read(|conn| specimen_count(conn)).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn write_rolls_back_when_body_fails() {
        let (_dir, executor) = test_executor().await;

        let result: Result<(), VerdantError> = executor
            .write(|tx| {
                tx.execute("INSERT INTO specimen (name) VALUES ('Fern')", [])?;
                Err(VerdantError::Error("boom".into()))
            })
            .await;
        assert!(result.is_err());

        let count = executor.read(|conn| specimen_count(conn)).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn writes_apply_in_call_order() {
        let (_dir, executor) = test_executor().await;

        for name in ["a", "b", "c"] {
            executor
                .write(move |tx| {
                    tx.execute("INSERT INTO specimen (name) VALUES (?)", [name])?;
                    Ok(())
                })
                .await
                .unwrap();
        }

        let names: Vec<String> = executor
            .read(|conn| {
                let mut stmt = conn.prepare("SELECT name FROM specimen ORDER BY id")?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                let mut out = Vec::new();
                for row in rows {
                    out.push(row?);
                }
                Ok(out)
            })
            .await
            .unwrap();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
