//! Error types raised while assembling the command line configuration.

use thiserror::Error;

/// Errors detected before any predicate is parsed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable or option carried an unusable value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A `--bind` argument was not of the form `NAME=VALUE`.
    #[error("invalid binding '{0}', expected NAME=VALUE")]
    InvalidBinding(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_error_displays_message() {
        let error = ConfigError::InvalidConfig("unknown log level".to_owned());
        assert_eq!(error.to_string(), "invalid configuration: unknown log level");
    }

    #[test]
    fn invalid_binding_error_names_the_argument() {
        let error = ConfigError::InvalidBinding("weight".to_owned());
        assert_eq!(
            error.to_string(),
            "invalid binding 'weight', expected NAME=VALUE"
        );
    }
}
