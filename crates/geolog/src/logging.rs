//! Optional `tracing` setup for applications embedding geolog.
//!
//! The journal emits events under the [`LOG_TARGET`] target and never
//! installs a subscriber on its own. Hosts that already configure `tracing`
//! need nothing from this module. Hosts that don't can call
//! [`init_logging`] once at startup, or fold [`journal_filter`] into their
//! own subscriber stack.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Target under which the journal logs.
pub const LOG_TARGET: &str = "geolog";

/// A filter passing geolog's events at `level` and above.
///
/// `RUST_LOG`, when set and valid, replaces the default directive entirely.
#[must_use]
pub fn journal_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{LOG_TARGET}={level}")))
}

/// Install a global formatting subscriber filtered by [`journal_filter`].
///
/// Returns `false` if a global subscriber was already in place, in which
/// case nothing changes.
///
/// ```no_run
/// use tracing::Level;
///
/// if !geolog::init_logging(Level::DEBUG) {
///     eprintln!("host already configured tracing");
/// }
/// ```
pub fn init_logging(level: Level) -> bool {
    tracing_subscriber::registry()
        .with(journal_filter(level))
        .with(fmt::layer().with_target(true))
        .try_init()
        .is_ok()
}

/// Route warnings to the test harness output.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
