//! Local event journal.
//!
//! Events are kept in `SQLite`. The payload is stored as JSON text and the
//! location, when present, as the compact codec bytes, so a row holds exactly
//! what a downstream uploader would send.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::config::{Config, JournalConfig};
use crate::error::{Error, Result};
use crate::event::{Event, EventPayload};
use crate::location::{self, LocationRecord};

const SELECT_COLUMNS: &str = "SELECT id, timestamp, name, payload, location FROM events";

/// Persistent store for analytics events.
#[derive(Debug)]
pub struct EventJournal {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
    /// Apply [`LocationRecord::check_ranges`] before recording.
    strict_ranges: bool,
}

impl EventJournal {
    /// Open or create a journal at the given path.
    ///
    /// Creates parent directories and initializes the schema as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening event journal at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Event journal opened at {}", path.display());
        Ok(Self {
            path,
            conn,
            strict_ranges: false,
        })
    }

    /// Open an in-memory journal.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
            strict_ranges: false,
        })
    }

    /// Open the journal described by a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::open(config.database_path())?.with_strict_ranges(config.journal.strict_ranges))
    }

    /// Enable or disable range checking of locations on [`record`](Self::record).
    #[must_use]
    pub fn with_strict_ranges(mut self, strict: bool) -> Self {
        self.strict_ranges = strict;
        self
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store an event and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is invalid, its location fails the
    /// range check while strict ranges are on, or the insert fails.
    pub fn record(&self, event: &Event) -> Result<i64> {
        event.validate()?;
        if self.strict_ranges {
            if let Some(location) = &event.location {
                location.check_ranges()?;
            }
        }

        let payload = serde_json::to_string(&event.payload)?;
        let location = event.location.as_ref().map(location::encode);

        self.conn.execute(
            "INSERT INTO events (timestamp, name, payload, location) VALUES (?1, ?2, ?3, ?4)",
            params![event.timestamp.timestamp_micros(), event.name, payload, location],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(
            "Recorded event {} '{}' ({}, location: {})",
            id,
            event.name,
            event.payload.kind(),
            event
                .location
                .as_ref()
                .map_or_else(|| "none".to_string(), LocationRecord::to_debug_string)
        );
        Ok(id)
    }

    /// Get an event by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored row cannot be decoded.
    pub fn get(&self, id: i64) -> Result<Option<Event>> {
        let row = self
            .conn
            .query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), [id], StoredRow::read)
            .optional()?;
        row.map(StoredRow::into_event).transpose()
    }

    /// The most recent events, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row cannot be decoded.
    pub fn recent(&self, limit: usize) -> Result<Vec<Event>> {
        self.query(
            &format!("{SELECT_COLUMNS} ORDER BY timestamp DESC, id DESC LIMIT ?1"),
            params![limit_param(limit)],
        )
    }

    /// Events with the given name, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row cannot be decoded.
    pub fn by_name(&self, name: &str, limit: usize) -> Result<Vec<Event>> {
        self.query(
            &format!("{SELECT_COLUMNS} WHERE name = ?1 ORDER BY timestamp DESC, id DESC LIMIT ?2"),
            params![name, limit_param(limit)],
        )
    }

    /// Events logged within `[since, until]`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row cannot be decoded.
    pub fn by_time_range(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Event>> {
        self.query(
            &format!(
                "{SELECT_COLUMNS} WHERE timestamp >= ?1 AND timestamp <= ?2 \
                 ORDER BY timestamp DESC, id DESC LIMIT ?3"
            ),
            params![
                since.timestamp_micros(),
                until.timestamp_micros(),
                limit_param(limit)
            ],
        )
    }

    /// Events that carry a location, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row cannot be decoded.
    pub fn with_location(&self, limit: usize) -> Result<Vec<Event>> {
        self.query(
            &format!(
                "{SELECT_COLUMNS} WHERE location IS NOT NULL \
                 ORDER BY timestamp DESC, id DESC LIMIT ?1"
            ),
            params![limit_param(limit)],
        )
    }

    /// Count all stored events.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete an event by id. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM events WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Delete events older than `max_age`. Returns how many were removed.
    ///
    /// An age reaching back past the earliest representable time removes
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn prune_older_than(&self, max_age: Duration) -> Result<usize> {
        let Some(cutoff) = Utc::now().checked_sub_signed(max_age) else {
            debug!("Retention age {max_age} predates any storable event, nothing to prune");
            return Ok(0);
        };
        let affected = self.conn.execute(
            "DELETE FROM events WHERE timestamp < ?1",
            [cutoff.timestamp_micros()],
        )?;

        if affected > 0 {
            info!("Pruned {} old events", affected);
        }
        Ok(affected)
    }

    /// Keep only the newest `keep_count` events. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn prune_keep_recent(&self, keep_count: usize) -> Result<usize> {
        let affected = self.conn.execute(
            r"
            DELETE FROM events WHERE id NOT IN (
                SELECT id FROM events ORDER BY timestamp DESC, id DESC LIMIT ?1
            )
            ",
            [limit_param(keep_count)],
        )?;

        if affected > 0 {
            info!("Pruned {} events to keep {} recent", affected, keep_count);
        }
        Ok(affected)
    }

    /// Apply the retention limits of a journal configuration: age first, then count.
    ///
    /// # Errors
    ///
    /// Returns an error if either prune fails.
    pub fn apply_retention(&self, config: &JournalConfig) -> Result<usize> {
        let mut removed = 0;
        if let Some(max_age) = config.max_age() {
            removed += self.prune_older_than(max_age)?;
        }
        if let Some(max_events) = config.max_events() {
            removed += self.prune_keep_recent(max_events)?;
        }
        Ok(removed)
    }

    /// Summary statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<JournalStats> {
        let total_events = self.count()?;
        let located_events: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM events WHERE location IS NOT NULL",
            [],
            |row| row.get(0),
        )?;

        let (oldest, newest): (Option<i64>, Option<i64>) = self.conn.query_row(
            "SELECT MIN(timestamp), MAX(timestamp) FROM events",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(JournalStats {
            total_events,
            located_events,
            oldest_event: oldest.and_then(DateTime::from_timestamp_micros),
            newest_event: newest.and_then(DateTime::from_timestamp_micros),
            db_size_bytes,
        })
    }

    fn query(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, StoredRow::read)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(StoredRow::into_event).collect()
    }
}

/// Statistics about the journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalStats {
    /// Total number of events stored.
    pub total_events: i64,
    /// Events that carry a location.
    pub located_events: i64,
    /// Timestamp of the oldest event.
    pub oldest_event: Option<DateTime<Utc>>,
    /// Timestamp of the newest event.
    pub newest_event: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

/// A row as stored, before payload and location are decoded.
struct StoredRow {
    id: i64,
    timestamp_us: i64,
    name: String,
    payload: String,
    location: Option<Vec<u8>>,
}

impl StoredRow {
    fn read(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp_us: row.get(1)?,
            name: row.get(2)?,
            payload: row.get(3)?,
            location: row.get(4)?,
        })
    }

    fn into_event(self) -> Result<Event> {
        let timestamp = DateTime::from_timestamp_micros(self.timestamp_us).unwrap_or_else(|| {
            warn!(
                "Event {} has out-of-range timestamp {}us, using epoch",
                self.id, self.timestamp_us
            );
            DateTime::<Utc>::default()
        });
        let payload: EventPayload = serde_json::from_str(&self.payload)?;
        let location = self
            .location
            .as_deref()
            .map(location::decode)
            .transpose()?;

        Ok(Event {
            id: Some(self.id),
            timestamp,
            name: self.name,
            payload,
            location,
        })
    }
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
