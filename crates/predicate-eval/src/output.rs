//! Helpers for rendering command output.

use std::io::Write;

use eyre::{Context, Result};
use predicate_expr::{Expression, Predicate};
use serde::Serialize;

/// Machine-readable report of one evaluation.
#[derive(Debug, Serialize)]
pub(crate) struct EvalReport<'a> {
    condition: &'a str,
    expression: String,
    variables: &'a [String],
    result: bool,
}

impl<'a> EvalReport<'a> {
    pub(crate) fn new(predicate: &'a Predicate, result: bool) -> Self {
        Self {
            condition: predicate.condition(),
            expression: predicate.expression().to_string(),
            variables: predicate.variables(),
            result,
        }
    }
}

pub(crate) fn write_result(writer: &mut dyn Write, result: bool) -> Result<()> {
    writeln!(writer, "{result}").wrap_err("failed to write evaluation result")
}

pub(crate) fn write_report(writer: &mut dyn Write, report: &EvalReport<'_>) -> Result<()> {
    serde_json::to_writer(&mut *writer, report).wrap_err("failed to serialise evaluation report")?;
    writeln!(writer).wrap_err("failed to terminate evaluation report")
}

pub(crate) fn write_variables(writer: &mut dyn Write, variables: &[String]) -> Result<()> {
    for variable in variables {
        writeln!(writer, "{variable}")
            .wrap_err_with(|| format!("failed to write variable {variable}"))?;
    }
    Ok(())
}

pub(crate) fn write_expression(writer: &mut dyn Write, expression: &Expression) -> Result<()> {
    writeln!(writer, "{expression}").wrap_err("failed to write expression")
}
