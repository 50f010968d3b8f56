//! Command line configuration parsed from environment variables.
//!
//! Every setting can be provided through a variable prefixed with
//! `PREDICATE_EVAL_`; explicit command line options take precedence.

use std::env;
use std::str::FromStr;

use crate::error::ConfigError;

/// Environment variable holding the log level.
pub const LOG_LEVEL_VAR: &str = "PREDICATE_EVAL_LOG_LEVEL";
/// Environment variable holding the default stop literal.
pub const STOP_TOKEN_VAR: &str = "PREDICATE_EVAL_STOP_TOKEN";

/// Verbosity of the diagnostics written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Lexer and parser internals.
    Trace,
    /// Parsed conditions, bindings and results.
    Debug,
    /// Command progress.
    Info,
    /// Only suspicious input; keeps scripted runs quiet.
    #[default]
    Warn,
    /// Failures only.
    Error,
}

impl LogLevel {
    const NAMES: [(&'static str, Self); 5] = [
        ("trace", Self::Trace),
        ("debug", Self::Debug),
        ("info", Self::Info),
        ("warn", Self::Warn),
        ("error", Self::Error),
    ];

    /// Directive understood by `tracing_subscriber::EnvFilter`.
    #[must_use]
    pub const fn as_filter_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = if s.eq_ignore_ascii_case("warning") { "warn" } else { s };
        Self::NAMES
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, level)| *level)
            .ok_or_else(|| {
                ConfigError::InvalidConfig(format!(
                    "unknown log level '{s}', expected trace, debug, info, warn or error"
                ))
            })
    }
}

/// Settings shared by every subcommand.
///
/// # Environment Variables
///
/// - `PREDICATE_EVAL_LOG_LEVEL`: log level (trace, debug, info, warn, error)
/// - `PREDICATE_EVAL_STOP_TOKEN`: literal ending every parsed condition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log level written to stderr.
    pub log_level: LogLevel,
    /// Literal that ends a condition; `None` parses the whole input.
    pub stop_token: Option<String>,
}

impl CliConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidConfig` if an environment variable contains
    /// an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which resolves variable names.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidConfig` if a variable contains an invalid
    /// value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_level = lookup(LOG_LEVEL_VAR)
            .map(|val| val.parse())
            .transpose()?
            .unwrap_or_default();
        let stop_token = lookup(STOP_TOKEN_VAR).filter(|token| !token.is_empty());

        Ok(Self {
            log_level,
            stop_token,
        })
    }

    /// Apply optional overrides to an existing configuration.
    ///
    /// An empty stop literal override clears a literal set in the
    /// environment.
    #[must_use]
    pub fn apply_overrides(
        mut self,
        log_level: Option<LogLevel>,
        stop_token: Option<String>,
    ) -> Self {
        if let Some(level) = log_level {
            self.log_level = level;
        }

        if let Some(token) = stop_token {
            self.stop_token = (!token.is_empty()).then_some(token);
        }

        self
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[rstest]
    #[case("trace", LogLevel::Trace)]
    #[case("Debug", LogLevel::Debug)]
    #[case("INFO", LogLevel::Info)]
    #[case("warning", LogLevel::Warn)]
    #[case("error", LogLevel::Error)]
    fn log_level_parses_case_insensitively(#[case] text: &str, #[case] expected: LogLevel) {
        assert_eq!(text.parse::<LogLevel>().ok(), Some(expected));
    }

    #[test]
    fn log_level_rejects_invalid_values() {
        let err = "loud".parse::<LogLevel>().unwrap_err();
        assert!(err.to_string().contains("unknown log level 'loud'"));
    }

    #[test]
    fn defaults_apply_without_variables() {
        let config = CliConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.log_level.as_filter_str(), "warn");
    }

    #[test]
    fn reads_prefixed_variables() {
        let config = CliConfig::from_lookup(lookup(&[
            (LOG_LEVEL_VAR, "debug"),
            (STOP_TOKEN_VAR, "{"),
        ]))
        .unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.stop_token.as_deref(), Some("{"));
    }

    #[test]
    fn rejects_invalid_log_level_variable() {
        let result = CliConfig::from_lookup(lookup(&[(LOG_LEVEL_VAR, "chatty")]));
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn overrides_take_precedence() {
        let config = CliConfig::from_lookup(lookup(&[(STOP_TOKEN_VAR, "{")]))
            .unwrap()
            .apply_overrides(Some(LogLevel::Trace), Some(String::new()));
        assert_eq!(config.log_level, LogLevel::Trace);
        assert_eq!(config.stop_token, None);
    }
}
