//! Log output for binaries and tests.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Environment variable holding filter directives, e.g. `sdrchain=trace`.
pub const LOG_ENV: &str = "SDRCHAIN_LOG";

/// Install a compact `fmt` subscriber.
///
/// `default` applies when `SDRCHAIN_LOG` is unset or invalid. Returns false
/// if a global subscriber was already installed, which is harmless.
pub fn init(default: LevelFilter) -> bool {
    let format = fmt::layer().with_level(true).with_target(true).compact();

    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .try_init()
        .is_ok();
    if !installed {
        debug!("logger already initialized");
    }
    installed
}
