//! Tracing subscriber setup for the binaries.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Installs a `fmt` subscriber.
///
/// `RUST_LOG` wins over the configured filter, e.g.
/// `RUST_LOG=kasir=trace` for everything from the kasir crates.
pub fn init_tracing(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.filter));

    // A subscriber may already be installed (tests, embedding shells).
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
