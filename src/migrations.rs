//! Versioned, transactional schema-migration engine.
//!
//! The stored schema version is SQLite's own `PRAGMA user_version`, not a
//! custom table. Upgrades move strictly forward, one integer step at a time,
//! each step in its own transaction: the upgrade script (if any), then the
//! seed script (if any), then the version stamp. A failed statement rolls the
//! whole step back, so a partially-applied version is never observable.

use log::debug;
use rusqlite::Connection;

use crate::error::VerdantError;
use crate::schema::{self, MigrationStep};
use crate::splitter::split_statements;

/// Read the stored schema version.
pub fn schema_version(conn: &Connection) -> Result<i32, VerdantError> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(version)
}

/// Apply every migration step in `(old_version, new_version]`, in ascending
/// order. Calling with `old_version >= new_version` is a programming error:
/// it asserts in debug builds and does nothing in release builds.
pub fn upgrade(
    conn: &mut Connection,
    old_version: i32,
    new_version: i32,
) -> Result<(), VerdantError> {
    upgrade_with(conn, old_version, new_version, schema::step_for)
}

/// Engine body, parameterized over the step resolver so tests can inject
/// failing or missing steps.
pub(crate) fn upgrade_with<R>(
    conn: &mut Connection,
    old_version: i32,
    new_version: i32,
    resolve: R,
) -> Result<(), VerdantError>
where
    R: Fn(i32) -> Option<MigrationStep>,
{
    debug_assert!(
        old_version < new_version,
        "out-of-order migration call: {old_version} -> {new_version}"
    );

    for v in (old_version + 1)..=new_version {
        let step = resolve(v).unwrap_or(MigrationStep {
            upgrade_sql: None,
            seed_sql: None,
        });

        // A version with neither script is a gap in the chain: a release
        // defect, never silently skipped.
        if step.upgrade_sql.is_none() && step.seed_sql.is_none() {
            return Err(VerdantError::Error(format!(
                "migration chain has no scripts targeting version {v}"
            )));
        }

        // One atomic transaction per version step. Dropping the transaction
        // without commit (any `?` below) rolls everything back.
        let tx = conn.transaction()?;

        if let Some(sql) = step.upgrade_sql {
            exec_script(&tx, sql)?;
            debug!("database schema upgrade {v} done");
        }
        if let Some(sql) = step.seed_sql {
            exec_script(&tx, sql)?;
            debug!("database data update {v} done");
        }

        // Stamp the version inside the step's transaction so the stored
        // version always reflects a fully-committed chain, even across a
        // crash between steps.
        tx.pragma_update(None, "user_version", v)?;
        tx.commit()?;
    }

    Ok(())
}

fn exec_script(conn: &Connection, script: &str) -> Result<(), VerdantError> {
    for stmt in split_statements(script) {
        conn.execute(&stmt, [])?;
    }
    Ok(())
}
