//! Connection readiness checks and write scoping shared by repositories.

use crate::db::migrations::latest_version;
use crate::repo::error::{RepoError, RepoResult};
use log::error;
use rusqlite::{Connection, Transaction, TransactionBehavior};

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("company", &["id", "name"]),
    ("employee", &["company_id", "employee_number", "name"]),
    ("phone", &["number", "company_id", "employee_number"]),
];

/// Rejects connections that were not opened through `db::open_*`.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

/// Runs `work` atomically.
///
/// Inside an open transaction `work` runs under a savepoint that is rolled
/// back on error, so a caller recovering from the error keeps no partial
/// writes. Otherwise `work` gets its own IMMEDIATE transaction.
pub(crate) fn in_write_scope<T>(
    conn: &Connection,
    work: impl FnOnce(&Connection) -> RepoResult<T>,
) -> RepoResult<T> {
    if !conn.is_autocommit() {
        conn.execute_batch("SAVEPOINT roster_write;")?;
        return match work(conn) {
            Ok(value) => {
                conn.execute_batch("RELEASE roster_write;")?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) =
                    conn.execute_batch("ROLLBACK TO roster_write; RELEASE roster_write;")
                {
                    error!(
                        "event=write_scope module=repo status=error error_code=savepoint_rollback_failed error={}",
                        rollback_err
                    );
                }
                Err(err)
            }
        };
    }

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let value = work(&tx)?;
    tx.commit()?;
    Ok(value)
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
