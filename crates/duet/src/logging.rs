//! Logging setup for the server binary.

use tracing_subscriber::EnvFilter;

/// Installs a `tracing` subscriber writing to stdout.
///
/// `RUST_LOG` wins when set; otherwise every target logs at
/// `default_level` (e.g. `"info"`, `"debug"`).
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
