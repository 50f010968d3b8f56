//! Recursive-descent parser compiling predicate text into an [`Expression`].
//!
//! Grammar, from lowest to highest precedence:
//!
//! ```text
//! Or       := And (('OR' | '|' | '||') And)*
//! And      := Not (('AND' | '&' | '&&') Not)*
//! Not      := ('!' | 'NOT') Brackets | Brackets
//! Brackets := '(' Or ')' | Compare
//! Compare  := 'true' | 'false' | Variable Operator Operand | BooleanVariable
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::ast::{CompareOp, Comparison, Expression, Operand, RegexMatch};
use crate::errors::{ParseError, PredicateError};
use crate::lexer::{Token, TokenKind, tokenize};
use crate::predicate::Predicate;
use crate::text::{QUOTES, unquote};

/// Deepest bracket nesting accepted before parsing fails.
pub const MAX_NESTING_DEPTH: usize = 256;

type NameFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Configurable parser for predicate expressions.
///
/// A parser is cheap to clone and may be reused for any number of inputs.
///
/// # Examples
/// ```
/// use predicate_expr::{PredicateParser, ValueBindings};
///
/// let parser = PredicateParser::new()
///     .stop_token("{")
///     .allow_variables(["weight", "ports"]);
/// let predicate = parser
///     .parse("weight <= 2 { Hello World }")
///     .expect("example ensures fallible call succeeds");
/// assert_eq!(predicate.condition(), "weight <= 2 {");
/// assert!(predicate.evaluate(&ValueBindings::new().constant("weight", "1.25")));
/// assert!(parser.parse("price > 2").is_err());
/// ```
#[derive(Clone, Default)]
pub struct PredicateParser {
    stop_token: Option<String>,
    allowed_variables: Option<NameFilter>,
    boolean_variables: Option<NameFilter>,
}

impl PredicateParser {
    /// Create a parser without stop literal or variable restrictions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// End the expression at the first occurrence of `literal` between tokens.
    ///
    /// An empty literal disables the stop literal. A literal made of
    /// whitespace is still found inside a longer whitespace run.
    #[must_use]
    pub fn stop_token(mut self, literal: impl Into<String>) -> Self {
        let literal = literal.into();
        self.stop_token = (!literal.is_empty()).then_some(literal);
        self
    }

    /// Reject variables for which `is_allowed` returns `false`.
    #[must_use]
    pub fn check_variables<F>(mut self, is_allowed: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.allowed_variables = Some(Arc::new(is_allowed));
        self
    }

    /// Reject every variable not contained in `names`.
    #[must_use]
    pub fn allow_variables<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = name_set(names);
        self.check_variables(move |name| names.contains(name))
    }

    /// Let variables accepted by `is_boolean` stand alone as `variable == true`.
    #[must_use]
    pub fn boolean_variables<F>(mut self, is_boolean: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.boolean_variables = Some(Arc::new(is_boolean));
        self
    }

    /// Let each of `names` stand alone as `variable == true`.
    #[must_use]
    pub fn allow_boolean_variables<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = name_set(names);
        self.boolean_variables(move |name| names.contains(name))
    }

    /// Parse `text` into a reusable [`Predicate`].
    ///
    /// # Errors
    /// Returns [`PredicateError::Lex`] when the input contains an unknown
    /// symbol and [`PredicateError::Parse`] when the tokens violate the
    /// grammar, including trailing tokens after a complete expression.
    pub fn parse(&self, text: &str) -> Result<Predicate, PredicateError> {
        self.parse_inner(text)
            .inspect(|predicate| {
                log::debug!(
                    "parsed predicate {:?} referencing {:?}",
                    predicate.condition(),
                    predicate.variables()
                );
            })
            .inspect_err(|err| log::debug!("rejected predicate {text:?}: {err}"))
    }

    fn parse_inner(&self, text: &str) -> Result<Predicate, PredicateError> {
        let tokens = tokenize(text, self.stop_token.as_deref())?;
        let mut parser = Parser {
            options: self,
            tokens,
            index: 0,
            depth: 0,
        };
        let root = parser.parse_or()?;
        let eof = parser.consume(TokenKind::Eof)?;
        let condition = text.get(..eof.end).unwrap_or(text);
        Ok(Predicate::new(condition.to_owned(), root))
    }
}

fn name_set<I, S>(names: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

impl fmt::Debug for PredicateParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateParser")
            .field("stop_token", &self.stop_token)
            .field("checks_variables", &self.allowed_variables.is_some())
            .field("has_boolean_variables", &self.boolean_variables.is_some())
            .finish()
    }
}

/// Parse `text` with a default [`PredicateParser`].
///
/// # Errors
/// See [`PredicateParser::parse`].
///
/// # Examples
/// ```
/// use std::collections::HashMap;
/// use predicate_expr::parse;
///
/// let predicate = parse("weight >= 1 && weight <= 2 AND processor != i5")
///     .expect("example ensures fallible call succeeds");
/// let values = HashMap::from([
///     ("weight".to_owned(), vec!["1.25".to_owned()]),
///     ("processor".to_owned(), vec!["i7".to_owned()]),
/// ]);
/// assert!(predicate.evaluate(&values));
/// ```
pub fn parse(text: &str) -> Result<Predicate, PredicateError> {
    PredicateParser::new().parse(text)
}

struct Parser<'p, 'a> {
    options: &'p PredicateParser,
    tokens: Vec<Token<'a>>,
    index: usize,
    depth: usize,
}

impl<'a> Parser<'_, 'a> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.index)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|token| token.kind)
    }

    fn position(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map_or(0, |token| token.start)
    }

    fn next(&mut self) -> Result<Token<'a>, ParseError> {
        let token = self
            .peek()
            .copied()
            .ok_or_else(|| ParseError::new("cannot read beyond end of input", self.position()))?;
        self.index += 1;
        Ok(token)
    }

    fn consume(&mut self, expected: TokenKind) -> Result<Token<'a>, ParseError> {
        let token = self.next()?;
        if token.kind == expected {
            Ok(token)
        } else {
            Err(unexpected(&token, expected.as_str()))
        }
    }

    fn consume_if(&mut self, expected: TokenKind) -> bool {
        let matched = self.peek_kind() == Some(expected);
        if matched {
            self.index += 1;
        }
        matched
    }

    fn parse_or(&mut self) -> Result<Expression, ParseError> {
        let mut nodes = vec![self.parse_and()?];
        while self.consume_if(TokenKind::Or) {
            nodes.push(self.parse_and()?);
        }
        Ok(collapse(nodes, Expression::Or))
    }

    fn parse_and(&mut self) -> Result<Expression, ParseError> {
        let mut nodes = vec![self.parse_not()?];
        while self.consume_if(TokenKind::And) {
            nodes.push(self.parse_not()?);
        }
        Ok(collapse(nodes, Expression::And))
    }

    fn parse_not(&mut self) -> Result<Expression, ParseError> {
        if self.consume_if(TokenKind::Not) {
            let inner = self.parse_brackets()?;
            return Ok(Expression::Not(Box::new(inner)));
        }
        self.parse_brackets()
    }

    fn parse_brackets(&mut self) -> Result<Expression, ParseError> {
        let start = self.position();
        if self.consume_if(TokenKind::Open) {
            if self.depth >= MAX_NESTING_DEPTH {
                return Err(ParseError::new("expression nested too deeply", start));
            }
            self.depth += 1;
            let inner = self.parse_or()?;
            self.depth -= 1;
            self.consume(TokenKind::Close)?;
            return Ok(inner);
        }
        self.parse_compare()
    }

    fn parse_compare(&mut self) -> Result<Expression, ParseError> {
        if self.consume_if(TokenKind::True) {
            return Ok(Expression::Constant(true));
        }
        if self.consume_if(TokenKind::False) {
            return Ok(Expression::Constant(false));
        }

        let variable = self.consume_variable()?;
        if self.peek_kind() != Some(TokenKind::Compare) && self.is_boolean_variable(&variable) {
            let operand = Operand::Text("true".to_owned());
            return Ok(Expression::Compare(Comparison::new(
                variable,
                CompareOp::Eq,
                operand,
            )));
        }

        let operator = self.consume(TokenKind::Compare)?;
        if operator.text == "~=" {
            return self.parse_regex(variable);
        }
        let op = CompareOp::parse(operator.text).ok_or_else(|| {
            ParseError::new(format!("unknown operator {}", operator.text), operator.start)
        })?;
        let operand = self.parse_operand(op)?;
        Ok(Expression::Compare(Comparison::new(variable, op, operand)))
    }

    fn parse_regex(&mut self, variable: String) -> Result<Expression, ParseError> {
        let token = self.next()?;
        let source = match token.kind {
            TokenKind::Text => unquote(token.text, &QUOTES).into_owned(),
            TokenKind::Number | TokenKind::True | TokenKind::False => token.text.to_owned(),
            _ => return Err(unexpected(&token, "regular expression")),
        };
        RegexMatch::new(variable, source)
            .map(Expression::Matches)
            .map_err(|err| {
                ParseError::new(
                    format!("invalid regular expression {}: {err}", token.text),
                    token.start,
                )
            })
    }

    fn parse_operand(&mut self, op: CompareOp) -> Result<Operand, ParseError> {
        let token = self.next()?;
        match token.kind {
            TokenKind::Null if matches!(op, CompareOp::Eq | CompareOp::Ne) => Ok(Operand::Null),
            TokenKind::Null => Err(ParseError::new(
                "'null' can only be compared with '==' or '!='",
                token.start,
            )),
            TokenKind::Number => {
                let value = token.text.parse().map_err(|_| {
                    ParseError::new(format!("invalid number {}", token.text), token.start)
                })?;
                Ok(Operand::Number {
                    text: token.text.to_owned(),
                    value,
                })
            }
            TokenKind::Text => Ok(Operand::Text(unquote(token.text, &QUOTES).into_owned())),
            TokenKind::True | TokenKind::False => Ok(Operand::Text(token.text.to_owned())),
            _ => Err(unexpected(&token, "string or number")),
        }
    }

    fn consume_variable(&mut self) -> Result<String, ParseError> {
        let token = self.next()?;
        if !matches!(
            token.kind,
            TokenKind::Text | TokenKind::Number | TokenKind::Null
        ) {
            return Err(unexpected(&token, "variable"));
        }
        let variable = unquote(token.text, &QUOTES).into_owned();
        let allowed = self
            .options
            .allowed_variables
            .as_ref()
            .is_none_or(|is_allowed| is_allowed(&variable));
        if !allowed {
            return Err(ParseError::new(
                format!("unknown variable {variable}"),
                token.start,
            ));
        }
        Ok(variable)
    }

    fn is_boolean_variable(&self, variable: &str) -> bool {
        self.options
            .boolean_variables
            .as_ref()
            .is_some_and(|is_boolean| is_boolean(variable))
    }
}

fn collapse(nodes: Vec<Expression>, junction: fn(Vec<Expression>) -> Expression) -> Expression {
    <[Expression; 1]>::try_from(nodes).map_or_else(junction, |[single]| single)
}

fn unexpected(token: &Token<'_>, expected: &str) -> ParseError {
    let message = if token.kind == TokenKind::Eof && token.text.is_empty() {
        format!("unexpected end of input, expected {expected}")
    } else {
        format!("unexpected token '{}', expected {expected}", token.text)
    };
    ParseError::new(message, token.start)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests assert on parser results")]
mod tests {
    use super::*;
    use rstest::rstest;

    fn root(text: &str) -> Expression {
        parse(text).unwrap().into_expression()
    }

    fn parse_error(parser: &PredicateParser, text: &str) -> ParseError {
        match parser.parse(text).unwrap_err() {
            PredicateError::Parse(err) => err,
            PredicateError::Lex(err) => panic!("expected a parse error, got {err}"),
        }
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = root("a == 1 OR b == 2 AND c == 3");
        let Expression::Or(children) = expr else {
            panic!("expected an OR node");
        };
        assert_eq!(children.len(), 2);
        assert!(matches!(children.get(1), Some(Expression::And(inner)) if inner.len() == 2));
    }

    #[test]
    fn single_operands_collapse() {
        assert!(matches!(root("((a == 1))"), Expression::Compare(_)));
    }

    #[test]
    fn not_applies_to_the_following_bracket_only() {
        let expr = root("NOT a == 1 AND b == 2");
        let Expression::And(children) = expr else {
            panic!("expected an AND node");
        };
        assert!(matches!(children.first(), Some(Expression::Not(_))));
    }

    #[rstest]
    #[case("true", Expression::Constant(true))]
    #[case("false", Expression::Constant(false))]
    fn parses_boolean_literals(#[case] text: &str, #[case] expected: Expression) {
        assert_eq!(root(text), expected);
    }

    #[test]
    fn accepts_boolean_literals_as_operands() {
        let Expression::Compare(comparison) = root("flag == true") else {
            panic!("expected a comparison");
        };
        assert_eq!(comparison.operand(), &Operand::Text("true".to_owned()));
    }

    #[test]
    fn unquotes_variable_names() {
        let Expression::Compare(comparison) = root("'unit price' < 10") else {
            panic!("expected a comparison");
        };
        assert_eq!(comparison.variable(), "unit price");
    }

    #[rstest]
    #[case("x < null", "'null' can only be compared with '==' or '!='", 4)]
    #[case("x >= null", "'null' can only be compared with '==' or '!='", 5)]
    #[case("x ==", "unexpected end of input, expected string or number", 4)]
    #[case("x == (", "unexpected token '(', expected string or number", 5)]
    #[case("x y", "unexpected token 'y', expected comparison operator", 2)]
    #[case("a == 1 b == 2", "unexpected token 'b', expected end of input", 7)]
    #[case("((a == 1)", "unexpected end of input, expected ')'", 9)]
    #[case("(a == 1 OR", "unexpected end of input, expected variable", 10)]
    #[case("ports ~= '('", "invalid regular expression '('", 9)]
    fn reports_grammar_violations(
        #[case] text: &str,
        #[case] message: &str,
        #[case] position: usize,
    ) {
        let err = parse_error(&PredicateParser::new(), text);
        assert!(
            err.message.starts_with(message),
            "{:?} does not start with {message:?}",
            err.message
        );
        assert_eq!(err.position, position);
    }

    #[test]
    fn rejects_unknown_variables_at_their_token() {
        let parser = PredicateParser::new().allow_variables(["processor", "ports"]);
        let err = parse_error(&parser, "ports = usb OR price > '2.000,00 €'");
        assert_eq!(err.message, "unknown variable price");
        assert_eq!(err.position, 15);
    }

    #[test]
    fn boolean_variables_stand_alone() {
        let parser = PredicateParser::new().allow_boolean_variables(["touch"]);
        assert!(parser.parse("touch AND ssd == 1").is_ok());
        let err = parse_error(&parser, "ssd AND touch");
        assert_eq!(err.message, "unexpected token 'AND', expected comparison operator");
        assert_eq!(err.position, 4);

        let expr = parser.parse("NOT touch").unwrap().into_expression();
        let Expression::Not(inner) = expr else {
            panic!("expected a NOT node");
        };
        assert_eq!(inner.to_string(), r#"touch == "true""#);
    }

    #[test]
    fn stop_token_inside_brackets_is_an_error() {
        let parser = PredicateParser::new().stop_token("{");
        let err = parse_error(&parser, "(processor == i5 { OR processor == i7)");
        assert_eq!(err.message, "unexpected token '{', expected ')'");
        assert_eq!(err.position, 17);
    }

    #[test]
    fn limits_bracket_nesting() {
        let nested = |depth: usize| format!("{}a == 1{}", "(".repeat(depth), ")".repeat(depth));
        assert!(parse(&nested(MAX_NESTING_DEPTH)).is_ok());

        let err = parse_error(&PredicateParser::new(), &nested(5000));
        assert_eq!(err.message, "expression nested too deeply");
        assert_eq!(err.position, MAX_NESTING_DEPTH);
    }

    #[test]
    fn empty_stop_token_is_ignored() {
        let predicate = PredicateParser::new()
            .stop_token("")
            .parse("a == b")
            .unwrap();
        assert_eq!(predicate.condition(), "a == b");
    }
}
