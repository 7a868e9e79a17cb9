//! Database bootstrap and open-time lifecycle.
//!
//! Opening the database runs the same sequence every time: copy the bundled
//! database image into place if no database file exists yet, build the
//! connection pool with the standing pragmas, then bring the stored schema
//! version up to [`SCHEMA_VERSION`] through the migration engine.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use log::info;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::error::VerdantError;
use crate::executor::Executor;
use crate::migrations;
use crate::schema::SCHEMA_VERSION;

const COPY_BUF_SIZE: usize = 8 * 1024;

/// Copy the bundled database image to `destination` on first run.
///
/// A file already present at `destination` is a live, possibly-migrated
/// database: leave it alone. A missing asset is fatal; the caller cannot
/// continue without a database.
pub fn ensure_prepopulated(destination: &Path, bundled_asset: &Path) -> Result<(), VerdantError> {
    if destination.exists() {
        return Ok(());
    }

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut input = File::open(bundled_asset)?;
    let mut output = File::create(destination)?;
    let mut buffer = [0u8; COPY_BUF_SIZE];
    loop {
        let read = input.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        output.write_all(&buffer[..read])?;
    }
    output.flush()?;

    info!("Prepopulated database copied to {}", destination.display());
    Ok(())
}

/// Process-wide database handle: owns the pool and the executor built on it.
///
/// Constructed once by the application-lifetime context and passed to the
/// components that need it; nothing looks it up globally, and no component
/// outside the executor opens a competing connection.
pub struct Database {
    executor: Executor,
}

impl Database {
    /// Open (and if necessary bootstrap and migrate) the database at `db_path`.
    pub fn open(db_path: &Path, bundled_asset: Option<&Path>) -> Result<Self, VerdantError> {
        match bundled_asset {
            Some(asset) => ensure_prepopulated(db_path, asset)?,
            None => {
                if let Some(parent) = db_path.parent() {
                    fs::create_dir_all(parent)?;
                }
            }
        }

        let manager = SqliteConnectionManager::file(db_path).with_init(configure_connection);
        let pool = r2d2::Pool::new(manager)?;

        {
            let mut conn = pool.get()?;
            let stored = migrations::schema_version(&conn)?;
            if stored > SCHEMA_VERSION {
                return Err(VerdantError::Error(format!(
                    "database schema version {stored} is newer than this build ({SCHEMA_VERSION})"
                )));
            }
            if stored < SCHEMA_VERSION {
                migrations::upgrade(&mut conn, stored, SCHEMA_VERSION)?;
            }
        }

        info!("Database opened at: {}", db_path.display());
        Ok(Database {
            executor: Executor::new(pool),
        })
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }
}

/// Standing pragmas, set on every pooled connection.
fn configure_connection(conn: &mut Connection) -> Result<(), rusqlite::Error> {
    // journal_mode returns the resulting mode as a row
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_row| Ok(()))?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    // Search predicates promise case-sensitive substring matching
    conn.pragma_update(None, "case_sensitive_like", "ON")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_fresh_database_migrates_to_current() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("data").join("verdant.db");
        let _db = Database::open(&db_path, None).unwrap();

        let conn = Connection::open(&db_path).unwrap();
        assert_eq!(migrations::schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn bootstrap_copies_asset_once() {
        let dir = TempDir::new().unwrap();
        let asset = dir.path().join("bundled.db");
        let dest = dir.path().join("databases").join("verdant.db");

        fs::write(&asset, b"bundled-image-bytes").unwrap();

        ensure_prepopulated(&dest, &asset).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"bundled-image-bytes");

        // Second call must not overwrite a live database.
        fs::write(&dest, b"migrated-live-database").unwrap();
        ensure_prepopulated(&dest, &asset).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"migrated-live-database");
    }

    #[test]
    fn missing_asset_is_fatal() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("verdant.db");
        let missing = dir.path().join("nope.db");

        let result = ensure_prepopulated(&dest, &missing);
        assert!(result.is_err());
        assert!(!dest.exists() || fs::metadata(&dest).unwrap().len() == 0);
    }

    #[test]
    fn open_with_prepopulated_asset() {
        let dir = TempDir::new().unwrap();

        // Build an "asset": a database already migrated to v1.
        let asset = dir.path().join("bundled.db");
        {
            let mut conn = Connection::open(&asset).unwrap();
            migrations::upgrade(&mut conn, 0, 1).unwrap();
        }

        // First open copies it and upgrades the copy the rest of the way.
        let db_path = dir.path().join("verdant.db");
        let _db = Database::open(&db_path, Some(&asset)).unwrap();

        let conn = Connection::open(&db_path).unwrap();
        assert_eq!(migrations::schema_version(&conn).unwrap(), SCHEMA_VERSION);

        // The asset itself stayed at v1.
        let asset_conn = Connection::open(&asset).unwrap();
        assert_eq!(migrations::schema_version(&asset_conn).unwrap(), 1);
    }

    #[test]
    fn newer_database_is_refused() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("verdant.db");
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
                .unwrap();
        }

        let result = Database::open(&db_path, None);
        assert!(result.is_err());
    }
}
