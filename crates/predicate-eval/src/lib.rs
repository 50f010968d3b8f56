//! Command line front end for `predicate-expr`.
//!
//! The `predicate-eval` binary parses a condition, then either evaluates it
//! against bindings given as `--bind NAME=VALUE` options or a JSON file, lists
//! the variables it references, or prints its canonical form.
//!
//! # Configuration
//!
//! - `PREDICATE_EVAL_LOG_LEVEL`: log verbosity (trace, debug, info, warn,
//!   error)
//! - `PREDICATE_EVAL_STOP_TOKEN`: literal ending every parsed condition
//!
//! Command line options override both variables.

pub mod bindings;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
mod output;
