//! Schema versioning for the event journal.
//!
//! The version lives in the `metadata` table. Opening a journal creates the
//! schema if needed and records [`CURRENT_VERSION`]; a database stamped with
//! a newer version is refused rather than written with an older layout.

use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Error, Result};

use super::schema::SCHEMA_STATEMENTS;

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// The schema version this build writes.
pub const CURRENT_VERSION: i32 = 1;

/// Create the schema and stamp it with [`CURRENT_VERSION`].
///
/// # Errors
///
/// Returns an error if schema creation fails, or if the stored version is
/// unreadable or newer than this build understands.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    let stored = schema_version(conn)?;
    if stored > CURRENT_VERSION {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {stored} is newer than supported version {CURRENT_VERSION}"
            ),
        });
    }

    let tx = conn.unchecked_transaction()?;
    for statement in SCHEMA_STATEMENTS {
        tx.execute(statement, [])?;
    }
    if stored < CURRENT_VERSION {
        debug!("Stamping journal schema version {CURRENT_VERSION}");
        set_schema_version(&tx, CURRENT_VERSION)?;
    }
    tx.commit()?;
    Ok(())
}

/// The stored schema version, 0 for a fresh database.
///
/// # Errors
///
/// Returns an error if the metadata table cannot be read or holds a
/// non-numeric version.
pub fn schema_version(conn: &Connection) -> Result<i32> {
    let has_metadata: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='metadata')",
        [],
        |row| row.get(0),
    )?;
    if !has_metadata {
        return Ok(0);
    }

    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    match value {
        None => Ok(0),
        Some(v) => v.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {v}"),
        }),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}
