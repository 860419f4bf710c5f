//! Logging setup.

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber for the `tracing` macros used across the
/// crate.
///
/// Reads the `RUST_LOG` environment variable (defaults to "info" level).
/// Calling it again after a subscriber is installed does nothing.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .try_init();
}
