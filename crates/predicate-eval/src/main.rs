//! `predicate-eval` binary.
//!
//! Exits with 0 when the evaluated condition holds, 1 when it does not and 2
//! on configuration, parse or I/O errors.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use eyre::Context;
use tracing::error;

use predicate_eval::cli::{Cli, run};
use predicate_eval::config::CliConfig;
use predicate_eval::error::ConfigError;
use predicate_eval::logging::init_logging;

const FAILURE: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&CliConfig::default());
            error!(error = %e, "invalid configuration");
            return ExitCode::from(FAILURE);
        }
    };
    init_logging(&config);

    let mut stdout = io::stdout().lock();
    let result = run(&cli.command, &config, &mut stdout)
        .and_then(|outcome| {
            stdout.flush().wrap_err("failed to flush stdout")?;
            Ok(outcome)
        });
    match result {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(FAILURE)
        }
    }
}

fn build_config(cli: &Cli) -> Result<CliConfig, ConfigError> {
    let config = CliConfig::from_env()?;
    Ok(config.apply_overrides(cli.log_level, cli.command.stop_token()))
}
