//! Log output for hosts embedding the plugin crates

use std::io;
use tracing_subscriber::{EnvFilter, fmt};

/// Install a compact stderr subscriber
///
/// Respects `RUST_LOG` and falls back to `info`. Safe to call more than once;
/// later calls are ignored.
pub fn init_logging() {
    init_logging_with("info");
}

/// Same as [`init_logging`] with a caller-chosen fallback filter
pub fn init_logging_with(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(io::stderr)
        .try_init();
}
