//! Command dispatch for the `predicate-eval` entrypoint.

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use eyre::{Context, Result};
use predicate_expr::{Predicate, PredicateParser};
use tracing::{debug, info};

use crate::bindings::{collect_bindings, parse_binding};
use crate::config::{CliConfig, LogLevel};
use crate::output::{EvalReport, write_expression, write_report, write_result, write_variables};

/// Parse, explain and evaluate boolean predicate expressions.
#[derive(Parser, Debug)]
#[command(name = "predicate-eval", version, about)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a condition against variable bindings.
    Eval(EvalArgs),
    /// List the variables a condition references.
    Variables(ParseArgs),
    /// Print the canonical form of a parsed condition.
    Explain(ParseArgs),
}

impl Commands {
    /// Stop literal given on the command line, if any.
    #[must_use]
    pub fn stop_token(&self) -> Option<String> {
        match self {
            Self::Eval(args) => args.parse.stop_token.clone(),
            Self::Variables(args) | Self::Explain(args) => args.stop_token.clone(),
        }
    }
}

/// Options controlling how a condition is parsed.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Condition to parse.
    pub expression: String,
    /// Literal that ends the condition; an empty value disables it.
    #[arg(long, value_name = "LITERAL")]
    pub stop_token: Option<String>,
    /// Restrict variables to the given names.
    #[arg(long = "allow", value_name = "NAME")]
    pub allow: Vec<String>,
    /// Let the given variables stand alone as `NAME == true`.
    #[arg(long = "boolean", value_name = "NAME")]
    pub boolean: Vec<String>,
}

/// Options of the `eval` subcommand.
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Parsing options.
    #[command(flatten)]
    pub parse: ParseArgs,
    /// Bind a value to a variable; repeat a name to bind several values.
    #[arg(long = "bind", value_name = "NAME=VALUE", value_parser = parse_binding)]
    pub bind: Vec<(String, String)>,
    /// JSON object mapping names to a string or an array of strings.
    #[arg(long, value_name = "FILE")]
    pub bindings: Option<PathBuf>,
    /// Emit a JSON report instead of `true` or `false`.
    #[arg(long)]
    pub json: bool,
}

/// Result of a successfully executed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The command finished, or the evaluated condition holds.
    Success,
    /// The evaluated condition does not hold.
    Unsatisfied,
}

impl Outcome {
    /// Process exit code reported for the outcome.
    #[must_use]
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Unsatisfied => 1,
        }
    }
}

/// Run `command`, writing results to `out`.
///
/// Parsing options shared with the environment, such as the stop literal,
/// are read from `config`, which already carries command line overrides.
///
/// # Errors
///
/// Returns an error when the condition cannot be parsed, bindings cannot be
/// loaded, or output cannot be written.
pub fn run(command: &Commands, config: &CliConfig, out: &mut dyn Write) -> Result<Outcome> {
    match command {
        Commands::Eval(args) => handle_eval(args, config, out),
        Commands::Variables(args) => {
            let predicate = parse_condition(args, config)?;
            write_variables(out, predicate.variables())?;
            Ok(Outcome::Success)
        }
        Commands::Explain(args) => {
            let predicate = parse_condition(args, config)?;
            write_expression(out, predicate.expression())?;
            Ok(Outcome::Success)
        }
    }
}

fn handle_eval(args: &EvalArgs, config: &CliConfig, out: &mut dyn Write) -> Result<Outcome> {
    let predicate = parse_condition(&args.parse, config)?;
    let bindings = collect_bindings(args.bindings.as_deref(), &args.bind)?;
    debug!(variables = bindings.len(), "loaded bindings");

    let result = predicate.evaluate(&bindings);
    info!(condition = predicate.condition(), result, "evaluated predicate");

    if args.json {
        write_report(out, &EvalReport::new(&predicate, result))?;
    } else {
        write_result(out, result)?;
    }
    Ok(if result {
        Outcome::Success
    } else {
        Outcome::Unsatisfied
    })
}

fn parse_condition(args: &ParseArgs, config: &CliConfig) -> Result<Predicate> {
    let mut parser = PredicateParser::new();
    if let Some(token) = &config.stop_token {
        parser = parser.stop_token(token.as_str());
    }
    if !args.allow.is_empty() {
        parser = parser.allow_variables(args.allow.iter().cloned());
    }
    if !args.boolean.is_empty() {
        parser = parser.allow_boolean_variables(args.boolean.iter().cloned());
    }

    let predicate = parser
        .parse(&args.expression)
        .wrap_err_with(|| format!("failed to parse condition {:?}", args.expression))?;
    debug!(
        condition = predicate.condition(),
        variables = ?predicate.variables(),
        "parsed predicate"
    );
    Ok(predicate)
}
