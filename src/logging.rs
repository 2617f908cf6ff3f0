//! Tracing setup shared by both binaries.
//!
//! Output goes to stderr so the JSON-RPC stream on stdout stays clean.
//! `RUST_LOG`, when set, wins over the configured level.

use tracing_subscriber::EnvFilter;

/// Builds the filter: `RUST_LOG` if present, otherwise `level`, otherwise `info`.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init(level: &str) {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(level, "logging initialised");
    }
}
