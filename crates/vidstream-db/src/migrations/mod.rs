//! Embedded schema migrations.
//!
//! Each migration is a SQL script compiled into the binary. Applied versions
//! are recorded in `schema_migrations`; a catalog written by a newer build
//! is refused instead of being opened with a schema this build does not know.

use rusqlite::{params, Connection};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration {version} ({name}) failed: {source}")]
    Failed {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },

    #[error("Catalog schema version {found} is newer than supported version {supported}")]
    NewerSchema { found: u32, supported: u32 },
}

/// `(version, name, sql)`, in ascending version order.
const MIGRATIONS: &[(u32, &str, &str)] = &[(1, "initial", include_str!("001_initial.sql"))];

/// Bring the schema up to date. Returns the number of migrations applied.
pub fn run_migrations(conn: &Connection) -> Result<usize, MigrationError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )?;

    let found = schema_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(MigrationError::NewerSchema { found, supported });
    }

    let mut applied = 0;
    for &(version, name, sql) in MIGRATIONS.iter().filter(|(v, _, _)| *v > found) {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)
            .and_then(|()| {
                tx.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    params![version, name],
                )
            })
            .map_err(|source| MigrationError::Failed {
                version,
                name,
                source,
            })?;
        tx.commit()?;

        tracing::debug!(version, name, "Applied migration");
        applied += 1;
    }

    Ok(applied)
}

fn schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_migrations", [], |row| {
        row.get(0)
    })
}

fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |&(version, _, _)| version)
}
