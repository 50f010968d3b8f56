//! The reusable result of parsing a condition.

use std::fmt;
use std::str::FromStr;

use crate::ast::Expression;
use crate::bindings::ValueProvider;
use crate::errors::PredicateError;

/// A parsed condition together with the text it was parsed from.
///
/// Predicates are immutable and can be shared between threads and evaluated
/// concurrently against independent providers.
///
/// # Examples
/// ```
/// use predicate_expr::{Predicate, single_bounded};
///
/// let predicate: Predicate = "win_version = null".parse()
///     .expect("example ensures fallible call succeeds");
/// assert_eq!(predicate.variables(), ["win_version"]);
/// assert!(predicate.evaluate(&single_bounded(|_| None)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    condition: String,
    root: Expression,
    variables: Vec<String>,
}

impl Predicate {
    pub(crate) fn new(condition: String, root: Expression) -> Self {
        let variables = root.variables();
        Self {
            condition,
            root,
            variables,
        }
    }

    /// Test the predicate against the values bound by `provider`.
    #[must_use]
    pub fn evaluate<P: ValueProvider + ?Sized>(&self, provider: &P) -> bool {
        self.root.evaluate(provider)
    }

    /// The consumed source text, including a terminating stop literal.
    #[must_use]
    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// Variables referenced by the condition, ordered by first occurrence.
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Root of the parsed expression tree.
    #[must_use]
    pub fn expression(&self) -> &Expression {
        &self.root
    }

    /// Consume the predicate, keeping only its expression tree.
    #[must_use]
    pub fn into_expression(self) -> Expression {
        self.root
    }
}

/// Displays the consumed source text as written.
impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.condition)
    }
}

impl FromStr for Predicate {
    type Err = PredicateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse(s)
    }
}
