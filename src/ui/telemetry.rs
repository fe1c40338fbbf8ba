//! ui::telemetry
//!
//! Diagnostic logging through `tracing`.
//!
//! Logs go to stderr so they never mix with command output. The level comes
//! from the verbosity flags unless `MACTL_LOG` holds an `EnvFilter`
//! directive, which then wins (`MACTL_LOG=mactl::process=debug`).

use std::io::IsTerminal;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use super::output::Verbosity;

/// Environment variable overriding the log filter.
pub const LOG_ENV: &str = "MACTL_LOG";

/// Whether `MACTL_LOG` enables debug or trace output for any target.
pub fn debug_from_env() -> bool {
    std::env::var(LOG_ENV).is_ok_and(|directives| wants_debug(&directives))
}

fn wants_debug(directives: &str) -> bool {
    EnvFilter::try_new(directives)
        .ok()
        .and_then(|filter| filter.max_level_hint())
        .is_some_and(|level| level >= LevelFilter::DEBUG)
}

/// Install the global subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_level()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity == Verbosity::Debug)
        .without_time()
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();
}
