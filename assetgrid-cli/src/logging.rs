//! Diagnostic output for the binary.
//!
//! Library crates log through the `log` facade; the subscriber installed here
//! picks those records up and writes them to stderr, leaving stdout free.

use tracing_subscriber::{EnvFilter, fmt};

/// Filter applied when `RUST_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber.
///
/// Honours `RUST_LOG`, falling back to `info`. Calling this twice is harmless:
/// the second installation is ignored.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let installed = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if installed.is_err() {
        log::debug!("logging already initialised");
    }
}
