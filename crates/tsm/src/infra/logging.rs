//! Tracing subscriber setup.

use std::io;

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "TSM_LOG";

/// Install the global subscriber writing to stderr.
///
/// With `verbosity == 0` the filter comes from [`LOG_ENV`] and defaults to `warn`; `-v` and
/// `-vv` force `info` and `debug`.
pub fn init(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
