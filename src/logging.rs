//! Tracing subscriber setup
//!
//! Library code only emits `tracing` events; binaries and hosts decide where
//! they go. [`init`] is a convenience for both.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive
pub const LOG_ENV: &str = "BUNDLE_UPDATER_LOG";

/// Install a stderr fmt subscriber.
///
/// The filter comes from `BUNDLE_UPDATER_LOG` when set, otherwise `info`
/// (`debug` when `verbose`). Does nothing if a global subscriber already
/// exists.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_from_env(default_level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn filter_from_env(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new(default_level))
}
