//! Forward-only schema migrations for the roster tables.
//!
//! # Responsibility
//! - Create `company`, `employee` and `phone` with their composite keys.
//! - Bring older database files up to the version this binary expects.
//!
//! # Invariants
//! - Versions are strictly increasing and mirrored to `PRAGMA user_version`.
//! - All pending steps commit together or not at all.
//! - A file written by a newer binary is refused, never downgraded.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

/// One schema step: `(version, sql)`.
type Step = (u32, &'static str);

const STEPS: &[Step] = &[
    (1, include_str!("0001_init.sql")),
    (2, include_str!("0002_phone_employee_index.sql")),
];

/// Returns the schema version this binary migrates to.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |&(version, _)| version)
}

/// Applies every step newer than the connection's `user_version`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is ahead of this binary.
/// - `Sqlite` when a step fails; the file keeps its previous version.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let to_version = latest_version();

    if from_version > to_version {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: to_version,
        });
    }

    let pending: Vec<Step> = STEPS
        .iter()
        .copied()
        .filter(|&(version, _)| version > from_version)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, sql) in pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
        debug!("event=db_migrate module=db status=step version={version}");
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        from_version, to_version
    );
    Ok(())
}
