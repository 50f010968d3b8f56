//! Expression tree produced by the parser and its evaluation rules.
//!
//! Every variable resolves to a *set* of string values through a
//! [`ValueProvider`]. Positive comparisons hold when at least one value
//! matches; `!=` holds only when every value differs, which makes it true for
//! unbound variables as well.

use std::cmp::Ordering;
use std::fmt;

use regex::Regex;

use crate::bindings::ValueProvider;
use crate::compare::compare_number_aware;
use crate::lexer::{NUMBER_VALUE, TokenKind, tokenize};
use crate::text::QUOTES;

/// Comparison operators other than the regular-expression match `~=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `=` or `==`
    Eq,
    /// `!=`, encoded as "less or greater"
    Ne,
}

impl CompareOp {
    /// Parse an operator token; `~=` is not a [`CompareOp`].
    ///
    /// # Examples
    /// ```
    /// use predicate_expr::CompareOp;
    /// assert_eq!(CompareOp::parse("="), Some(CompareOp::Eq));
    /// assert_eq!(CompareOp::parse("~="), None);
    /// ```
    #[must_use]
    pub fn parse(operator: &str) -> Option<Self> {
        match operator {
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Lte),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Gte),
            "=" | "==" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            _ => None,
        }
    }

    /// Whether a value ordered before the operand satisfies the operator.
    #[must_use]
    pub const fn accepts_less(self) -> bool {
        matches!(self, Self::Lt | Self::Lte | Self::Ne)
    }

    /// Whether a value equal to the operand satisfies the operator.
    #[must_use]
    pub const fn accepts_equal(self) -> bool {
        matches!(self, Self::Lte | Self::Gte | Self::Eq)
    }

    /// Whether a value ordered after the operand satisfies the operator.
    #[must_use]
    pub const fn accepts_greater(self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Ne)
    }

    /// Whether `ordering` (value compared to operand) satisfies the operator.
    #[must_use]
    pub const fn accepts(self, ordering: Ordering) -> bool {
        match ordering {
            Ordering::Less => self.accepts_less(),
            Ordering::Equal => self.accepts_equal(),
            Ordering::Greater => self.accepts_greater(),
        }
    }

    /// Canonical source spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// The `null` literal; only paired with `==` or `!=`.
    Null,
    /// A numeric literal, kept with its source spelling.
    Number {
        /// Source text of the literal.
        text: String,
        /// Parsed value.
        value: f64,
    },
    /// A bare or unquoted string literal.
    Text(String),
}

/// `variable <op> operand` node.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    variable: String,
    op: CompareOp,
    operand: Operand,
}

impl Comparison {
    /// Callers guarantee that a `Null` operand is only paired with `Eq`/`Ne`.
    pub(crate) fn new(variable: String, op: CompareOp, operand: Operand) -> Self {
        Self {
            variable,
            op,
            operand,
        }
    }

    /// Name of the compared variable.
    #[must_use]
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Comparison operator.
    #[must_use]
    pub fn op(&self) -> CompareOp {
        self.op
    }

    /// Right-hand operand.
    #[must_use]
    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    fn evaluate<P: ValueProvider + ?Sized>(&self, provider: &P) -> bool {
        let values = provider.lookup(&self.variable);
        match self.operand {
            Operand::Null => values.is_empty() == self.op.accepts_equal(),
            _ if self.op == CompareOp::Ne => values.iter().all(|value| self.accepts(value)),
            _ => values.iter().any(|value| self.accepts(value)),
        }
    }

    fn accepts(&self, value: &str) -> bool {
        let ordering = match &self.operand {
            Operand::Null => return false,
            Operand::Number { text, value: number } => parse_number(value).map_or_else(
                || compare_number_aware(value, text),
                |parsed| parsed.total_cmp(number),
            ),
            Operand::Text(text) => compare_number_aware(value, text),
        };
        self.op.accepts(ordering)
    }
}

fn parse_number(value: &str) -> Option<f64> {
    NUMBER_VALUE
        .is_match(value)
        .then(|| value.parse().ok())
        .flatten()
}

/// `variable ~= pattern` node; a value matches only if the whole value
/// matches the pattern.
#[derive(Debug, Clone)]
pub struct RegexMatch {
    variable: String,
    source: String,
    regex: Regex,
}

impl RegexMatch {
    pub(crate) fn new(variable: String, source: String) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!(r"\A(?:{source})\z"))?;
        Ok(Self {
            variable,
            source,
            regex,
        })
    }

    /// Name of the matched variable.
    #[must_use]
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// The pattern as written, without the implicit anchors.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.source
    }

    fn evaluate<P: ValueProvider + ?Sized>(&self, provider: &P) -> bool {
        provider
            .lookup(&self.variable)
            .iter()
            .any(|value| self.regex.is_match(value))
    }
}

impl PartialEq for RegexMatch {
    fn eq(&self, other: &Self) -> bool {
        self.variable == other.variable && self.source == other.source
    }
}

/// Parsed predicate expression.
///
/// Trees built by the parser never contain `And`/`Or` nodes with fewer than
/// two children. Evaluation is total: unbound variables evaluate against an
/// empty value set.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `true` or `false` literal.
    Constant(bool),
    /// Negation of the inner expression.
    Not(Box<Expression>),
    /// Holds when every child holds.
    And(Vec<Expression>),
    /// Holds when any child holds.
    Or(Vec<Expression>),
    /// Comparison of a variable against an operand.
    Compare(Comparison),
    /// Regular-expression match of a variable.
    Matches(RegexMatch),
}

impl Expression {
    /// Evaluate the expression against the given bindings.
    ///
    /// # Examples
    /// ```
    /// use std::collections::HashMap;
    /// use predicate_expr::parse;
    ///
    /// let predicate = parse("ports != audio").expect("example ensures fallible call succeeds");
    /// let mut values = HashMap::new();
    /// values.insert("ports".to_string(), vec!["usb3".to_string(), "audio".to_string()]);
    /// assert!(!predicate.expression().evaluate(&values));
    /// ```
    #[must_use]
    pub fn evaluate<P: ValueProvider + ?Sized>(&self, provider: &P) -> bool {
        match self {
            Self::Constant(value) => *value,
            Self::Not(inner) => !inner.evaluate(provider),
            Self::And(children) => children.iter().all(|child| child.evaluate(provider)),
            Self::Or(children) => children.iter().any(|child| child.evaluate(provider)),
            Self::Compare(comparison) => comparison.evaluate(provider),
            Self::Matches(matcher) => matcher.evaluate(provider),
        }
    }

    /// Variables referenced by the expression, ordered by first occurrence.
    #[must_use]
    pub fn variables(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut Vec<String>) {
        match self {
            Self::Constant(_) => {}
            Self::Not(inner) => inner.collect_variables(out),
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.collect_variables(out);
                }
            }
            Self::Compare(comparison) => push_unique(out, comparison.variable()),
            Self::Matches(matcher) => push_unique(out, matcher.variable()),
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And(_) | Self::Or(_) | Self::Not(_) => write!(f, "({self})"),
            _ => write!(f, "{self}"),
        }
    }
}

fn push_unique(out: &mut Vec<String>, variable: &str) {
    if !out.iter().any(|known| known == variable) {
        out.push(variable.to_owned());
    }
}

// True when `text` lexes back as a single bare string token.
fn is_bare_word(text: &str) -> bool {
    matches!(
        tokenize(text, None).as_deref(),
        Ok([word, eof]) if word.kind == TokenKind::Text
            && word.start == 0
            && word.end == text.len()
            && eof.kind == TokenKind::Eof
    ) && !text.starts_with(QUOTES)
}

fn write_literal(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    if is_bare_word(text) {
        return f.write_str(text);
    }
    f.write_str("\"")?;
    for c in text.chars() {
        if c == '"' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("\"")
}

/// Renders a canonical form that parses back to an equal expression.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => write!(f, "{value}"),
            Self::Not(inner) => {
                f.write_str("NOT ")?;
                inner.fmt_operand(f)
            }
            Self::And(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" AND ")?;
                    }
                    match child {
                        Self::And(_) | Self::Or(_) => write!(f, "({child})")?,
                        _ => write!(f, "{child}")?,
                    }
                }
                Ok(())
            }
            Self::Or(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" OR ")?;
                    }
                    match child {
                        Self::Or(_) => write!(f, "({child})")?,
                        _ => write!(f, "{child}")?,
                    }
                }
                Ok(())
            }
            Self::Compare(comparison) => {
                write_literal(f, comparison.variable())?;
                write!(f, " {} ", comparison.op())?;
                match comparison.operand() {
                    Operand::Null => f.write_str("null"),
                    Operand::Number { text, .. } => f.write_str(text),
                    Operand::Text(text) => write_literal(f, text),
                }
            }
            Self::Matches(matcher) => {
                write_literal(f, matcher.variable())?;
                f.write_str(" ~= ")?;
                write_literal(f, matcher.pattern())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn bindings(pairs: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(name, values)| {
                (
                    (*name).to_owned(),
                    values.iter().map(|v| (*v).to_owned()).collect(),
                )
            })
            .collect()
    }

    fn compare(variable: &str, op: CompareOp, operand: Operand) -> Expression {
        Expression::Compare(Comparison::new(variable.to_owned(), op, operand))
    }

    fn text(value: &str) -> Operand {
        Operand::Text(value.to_owned())
    }

    #[test]
    fn maps_operators_to_accept_flags() {
        let flags = |op: CompareOp| (op.accepts_less(), op.accepts_equal(), op.accepts_greater());
        assert_eq!(flags(CompareOp::Lt), (true, false, false));
        assert_eq!(flags(CompareOp::Lte), (true, true, false));
        assert_eq!(flags(CompareOp::Gt), (false, false, true));
        assert_eq!(flags(CompareOp::Gte), (false, true, true));
        assert_eq!(flags(CompareOp::Eq), (false, true, false));
        assert_eq!(flags(CompareOp::Ne), (true, false, true));
    }

    #[test]
    fn null_operand_tests_for_presence() {
        let empty = bindings(&[]);
        let bound = bindings(&[("p", &["i5"])]);
        let is_null = compare("p", CompareOp::Eq, Operand::Null);
        let not_null = compare("p", CompareOp::Ne, Operand::Null);
        assert!(is_null.evaluate(&empty));
        assert!(!not_null.evaluate(&empty));
        assert!(!is_null.evaluate(&bound));
        assert!(not_null.evaluate(&bound));
    }

    #[test]
    fn not_equal_requires_every_value_to_differ() {
        let values = bindings(&[("ports", &["usb3", "audio"])]);
        assert!(!compare("ports", CompareOp::Ne, text("audio")).evaluate(&values));
        assert!(compare("ports", CompareOp::Ne, text("lightning")).evaluate(&values));
        assert!(compare("missing", CompareOp::Ne, text("audio")).evaluate(&values));
    }

    #[test]
    fn positive_operators_need_one_matching_value() {
        let values = bindings(&[("ports", &["usb3", "audio"])]);
        assert!(compare("ports", CompareOp::Eq, text("AUDIO")).evaluate(&values));
        assert!(!compare("missing", CompareOp::Eq, text("audio")).evaluate(&values));
    }

    #[test]
    fn numeric_operands_fall_back_to_text_for_non_numbers() {
        let number = Operand::Number {
            text: "10".to_owned(),
            value: 10.0,
        };
        let values = bindings(&[("size", &["9.5"]), ("name", &["file9"])]);
        assert!(compare("size", CompareOp::Lt, number.clone()).evaluate(&values));
        // "file9" vs "10" compares as text: 'f' sorts after the digit run
        assert!(compare("name", CompareOp::Gt, number).evaluate(&values));
    }

    fn matches(variable: &str, pattern: &str) -> Expression {
        let matcher = RegexMatch::new(variable.to_owned(), pattern.to_owned())
            .unwrap_or_else(|err| panic!("pattern should compile: {err}"));
        Expression::Matches(matcher)
    }

    #[test]
    fn regex_must_match_whole_value() {
        let values = bindings(&[("ports", &["usb3"])]);
        assert!(!matches("ports", "usb").evaluate(&values));
        assert!(matches("ports", r"usb\d").evaluate(&values));
        assert!(matches("ports", "(?i)USB.*").evaluate(&values));
    }

    #[test]
    fn empty_junctions_follow_vacuous_truth() {
        let values = bindings(&[]);
        assert!(Expression::And(Vec::new()).evaluate(&values));
        assert!(!Expression::Or(Vec::new()).evaluate(&values));
    }

    #[test]
    fn collects_variables_in_first_occurrence_order() {
        let expr = Expression::Or(vec![
            compare("b", CompareOp::Eq, text("1")),
            Expression::Not(Box::new(Expression::And(vec![
                compare("a", CompareOp::Eq, text("1")),
                compare("b", CompareOp::Eq, text("2")),
            ]))),
            Expression::Constant(true),
        ]);
        assert_eq!(expr.variables(), vec!["b".to_owned(), "a".to_owned()]);
    }

    #[test]
    fn displays_canonical_form() {
        let expr = Expression::And(vec![
            Expression::Or(vec![
                compare("cpu", CompareOp::Eq, text("i5")),
                compare("cpu", CompareOp::Eq, text("i7")),
            ]),
            Expression::Not(Box::new(compare("price", CompareOp::Gt, text("2.000,00 €")))),
            compare("tag", CompareOp::Ne, Operand::Null),
            compare("label", CompareOp::Eq, text("true")),
        ]);
        assert_eq!(
            expr.to_string(),
            r#"(cpu == i5 OR cpu == i7) AND NOT price > "2.000,00 €" AND tag != null AND label == "true""#
        );
    }
}
