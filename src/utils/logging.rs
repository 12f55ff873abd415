//! Logging utilities
//!
//! Provides logging setup and configuration.

use env_logger::Env;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// Setup logging for the adapter binary
///
/// Honours `RUST_LOG`; falls back to `info`. Calling it twice is harmless.
pub fn setup_logging() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER))
        .format_timestamp_millis()
        .try_init();
}
