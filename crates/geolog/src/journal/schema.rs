//! `SQLite` schema definitions for the event journal.

/// SQL statement to create the events table.
///
/// `timestamp` is microseconds since the Unix epoch. `payload` holds the JSON
/// form of the event payload; `location` holds the compact location
/// encoding, or NULL when the event has none.
pub const CREATE_EVENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp INTEGER NOT NULL,
    name TEXT NOT NULL,
    payload TEXT NOT NULL,
    location BLOB
)
";

/// Index backing the newest-first listings and age pruning.
pub const CREATE_TIMESTAMP_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp DESC)
";

/// Index for lookups by event name.
pub const CREATE_NAME_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_events_name ON events(name)
";

/// Partial index over the events that carry a location.
pub const CREATE_LOCATED_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_events_located
ON events(timestamp DESC) WHERE location IS NOT NULL
";

/// Key/value table holding the schema version.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_EVENTS_TABLE,
    CREATE_TIMESTAMP_INDEX,
    CREATE_NAME_INDEX,
    CREATE_LOCATED_INDEX,
    CREATE_METADATA_TABLE,
];
