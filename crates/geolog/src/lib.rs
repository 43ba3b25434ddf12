//! `geolog` - compact location encoding and a local analytics event journal
//!
//! The core of the crate is [`location`]: a [`LocationRecord`] type with
//! independently optional field groups and a lossy fixed-point binary codec
//! that packs a reading into at most 32 bytes. Around it, [`event`] and
//! [`journal`] provide named analytics events that carry those encoded
//! locations and a `SQLite` store to keep them in.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod event;
pub mod journal;
pub mod location;
pub mod logging;

pub use config::Config;
pub use error::{Error, Result};
pub use event::{Event, EventPayload};
pub use journal::{EventJournal, JournalStats};
pub use location::{decode, encode, DecodeError, LocationRecord, Presence, Source};
pub use logging::init_logging;
