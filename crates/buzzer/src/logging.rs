//! Log output setup.
//!
//! Library code only emits `tracing` events. Binaries call [`init`] once at
//! startup to print them.

use tracing_subscriber::EnvFilter;

/// Installs a formatted stderr subscriber filtered by `RUST_LOG`, falling
/// back to `info`.
pub fn init() {
    init_with_default("info");
}

/// Like [`init`], with a custom fallback filter (e.g. `"buzzer=debug"`).
///
/// Does nothing if a global subscriber is already installed.
pub fn init_with_default(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
