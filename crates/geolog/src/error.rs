//! Error types for geolog.
//!
//! The location codec reports its own [`DecodeError`]; everything that
//! touches storage, configuration or event validation goes through
//! [`Error`].

use std::path::PathBuf;
use thiserror::Error;

use crate::location::{DecodeError, RangeError};

/// The main error type for geolog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Location Errors ===
    /// A stored or received location could not be decoded.
    #[error("location decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// A location failed the opt-in range check.
    #[error("location rejected: {0}")]
    Range(#[from] RangeError),

    // === Event Errors ===
    /// An event cannot be recorded as given.
    #[error("invalid event: {message}")]
    InvalidEvent {
        /// Description of the problem.
        message: String,
    },

    /// A stored payload could not be serialized or read back.
    #[error("payload encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    // === Journal Errors ===
    /// The journal database could not be opened or created.
    #[error("cannot open journal at {path}: {source}")]
    DatabaseOpen {
        /// Database file, or `:memory:`.
        path: PathBuf,
        /// What `SQLite` reported.
        #[source]
        source: rusqlite::Error,
    },

    /// A journal statement failed.
    #[error("journal query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// The journal schema could not be brought up to date.
    #[error("journal schema: {message}")]
    DatabaseMigration {
        /// What went wrong.
        message: String,
    },

    /// The directory holding the journal could not be created.
    #[error("cannot create journal directory {path}: {source}")]
    DirectoryCreate {
        /// Directory that was being created.
        path: PathBuf,
        /// The I/O failure.
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// A configuration source could not be read or parsed.
    #[error("cannot load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration values are out of bounds.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Which value is wrong and why.
        message: String,
    },
}

/// A specialized Result type for geolog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new invalid event error.
    #[must_use]
    pub fn invalid_event(message: impl Into<String>) -> Self {
        Self::InvalidEvent {
            message: message.into(),
        }
    }

    /// Check if this error came from the location codec.
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}
