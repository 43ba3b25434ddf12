//! Settings for the event journal.
//!
//! Configuration is layered with figment: built-in defaults, then an optional
//! TOML file, then `GEOLOG_`-prefixed environment variables.

use std::path::PathBuf;

use chrono::Duration;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File looked up under the platform config directory.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory name used under both config and data roots.
const DATA_DIR_NAME: &str = "geolog";

/// Journal file created in the data directory.
const DATABASE_FILE_NAME: &str = "events.db";

/// Upper bound on retention, about a century.
const MAX_RETENTION_DAYS: u32 = 36_500;

/// Top-level settings.
///
/// Sources, highest precedence first:
/// 1. Environment variables (prefixed with `GEOLOG_`)
/// 2. TOML config file at `<config dir>/geolog/config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Event journal configuration.
    pub journal: JournalConfig,
}

/// Event journal configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Journal database location.
    /// Defaults to `<data dir>/geolog/events.db`.
    pub database_path: Option<PathBuf>,
    /// Maximum number of events to retain. 0 keeps everything.
    pub max_events: usize,
    /// Maximum age of events in days. 0 keeps everything.
    pub max_age_days: u32,
    /// Reject events whose location lies outside geographic bounds.
    pub strict_ranges: bool,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            max_events: 100_000,
            max_age_days: 30,
            strict_ranges: false,
        }
    }
}

impl Config {
    /// Load settings from the default file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings, reading `config_path` instead of the default file when given.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("GEOLOG_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/geolog/config.toml`.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// `<local data dir>/geolog`.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Check bounds that serde cannot express.
    ///
    /// # Errors
    ///
    /// [`Error::ConfigValidation`] when retention exceeds a century.
    pub fn validate(&self) -> Result<()> {
        if self.journal.max_age_days > MAX_RETENTION_DAYS {
            return Err(Error::ConfigValidation {
                message: format!(
                    "max_age_days ({}) cannot exceed {MAX_RETENTION_DAYS}",
                    self.journal.max_age_days
                ),
            });
        }
        Ok(())
    }

    /// The configured journal path, or `events.db` in the data directory.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.journal
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}

impl JournalConfig {
    /// The retention age, `None` when unlimited.
    #[must_use]
    pub fn max_age(&self) -> Option<Duration> {
        (self.max_age_days > 0).then(|| Duration::days(i64::from(self.max_age_days)))
    }

    /// The retention count, `None` when unlimited.
    #[must_use]
    pub fn max_events(&self) -> Option<usize> {
        (self.max_events > 0).then_some(self.max_events)
    }
}
