//! Logging setup
//!
//! Installs a `tracing-subscriber` fmt layer. `RUST_LOG` wins over the
//! configured default filter. `log` records from the engine crate are picked up
//! through the subscriber's log bridge.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber; calling it twice is harmless
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
