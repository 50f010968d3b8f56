//! Structured logging for the command line front end.
//!
//! Logs go to stderr so that stdout carries only results.

use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

fn filter_from_config(config: &CliConfig) -> EnvFilter {
    EnvFilter::new(config.log_level.as_filter_str())
}

/// Initialise the tracing subscriber for the configured log level.
///
/// Log level precedence (highest to lowest):
///
/// 1. CLI `--log-level`
/// 2. `PREDICATE_EVAL_LOG_LEVEL`
/// 3. The default level, `warn`
///
/// A subscriber installed earlier stays in place; the first one wins.
pub fn init_logging(config: &CliConfig) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter_from_config(config))
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
