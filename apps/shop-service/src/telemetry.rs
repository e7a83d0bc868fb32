//! Logging setup.
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - Show debug messages
//! - `RUST_LOG=coinshop_db=trace` - Trace the ledger store only
//! - Default: derived from `log.env` (see [`LogConfig::default_filter`])

use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Installs the global `tracing` subscriber.
///
/// `local` logs human-readable text, `dev` and `prod` log JSON. Calling
/// this twice is harmless: the second call logs a warning and keeps the
/// first subscriber.
pub fn init_tracing(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = if config.use_json() {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}
