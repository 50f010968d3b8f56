//! Variable bindings assembled from `--bind` options and JSON files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use eyre::{Context, Result};
use serde::Deserialize;

use crate::error::ConfigError;

/// Values bound to each variable; repeated names accumulate values.
pub type Bindings = BTreeMap<String, Vec<String>>;

#[derive(Deserialize)]
#[serde(untagged)]
enum BindingValue {
    One(String),
    Many(Vec<String>),
}

impl From<BindingValue> for Vec<String> {
    fn from(value: BindingValue) -> Self {
        match value {
            BindingValue::One(value) => vec![value],
            BindingValue::Many(values) => values,
        }
    }
}

/// Split a `NAME=VALUE` argument at its first `=`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidBinding` when the `=` is missing or the name
/// is empty.
pub fn parse_binding(arg: &str) -> Result<(String, String), ConfigError> {
    match arg.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_owned(), value.to_owned()))
        }
        _ => Err(ConfigError::InvalidBinding(arg.to_owned())),
    }
}

/// Parse a JSON object mapping names to a string or an array of strings.
///
/// # Errors
///
/// Returns an error when `json` is not such an object.
pub fn parse_bindings_json(json: &str) -> Result<Bindings> {
    let raw: BTreeMap<String, BindingValue> = serde_json::from_str(json)
        .wrap_err("bindings must map names to a string or an array of strings")?;
    Ok(raw
        .into_iter()
        .map(|(name, value)| (name, value.into()))
        .collect())
}

/// Merge the optional bindings file with `--bind` pairs, file values first.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed.
pub fn collect_bindings(file: Option<&Path>, pairs: &[(String, String)]) -> Result<Bindings> {
    let mut bindings = file.map(read_bindings_file).transpose()?.unwrap_or_default();
    for (name, value) in pairs {
        bindings.entry(name.clone()).or_default().push(value.clone());
    }
    Ok(bindings)
}

fn read_bindings_file(path: &Path) -> Result<Bindings> {
    let json = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read bindings file {}", path.display()))?;
    parse_bindings_json(&json).wrap_err_with(|| format!("invalid bindings file {}", path.display()))
}
