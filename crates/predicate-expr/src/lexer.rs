//! Lexer turning predicate source text into typed tokens.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::LexError;

/// Kind of a lexed [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// End of input, or the configured stop literal.
    Eof,
    /// Whitespace run; never forwarded to the parser.
    Whitespace,
    /// `(`
    Open,
    /// `)`
    Close,
    /// One of `<`, `<=`, `>`, `>=`, `=`, `==`, `!=`, `~=`.
    Compare,
    /// `OR`, `|` or `||`.
    Or,
    /// `AND`, `&` or `&&`.
    And,
    /// `NOT` or `!`.
    Not,
    /// The `null` literal.
    Null,
    /// The `true` literal.
    True,
    /// The `false` literal.
    False,
    /// Decimal number with optional sign and fraction.
    Number,
    /// Bare word or quoted string.
    Text,
}

impl TokenKind {
    /// Human-readable name used in parse error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eof => "end of input",
            Self::Whitespace => "whitespace",
            Self::Open => "'('",
            Self::Close => "')'",
            Self::Compare => "comparison operator",
            Self::Or => "OR",
            Self::And => "AND",
            Self::Not => "NOT",
            Self::Null => "null",
            Self::True => "true",
            Self::False => "false",
            Self::Number => "number",
            Self::Text => "string",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token borrowed from the lexed input.
///
/// `start` and `end` are byte offsets into the original input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Token classification.
    pub kind: TokenKind,
    /// Matched source text.
    pub text: &'a str,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

/// Pattern matching a whole decimal number, shared with value comparison.
#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
pub(crate) static NUMBER_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+\-]?[0-9]+(?:\.[0-9]+)?$").expect("valid number regex")
});

// Order matters: the permissive text pattern must come last so keywords and
// operators are never swallowed by it.
#[expect(clippy::expect_used, reason = "patterns are compile-time constants")]
static TOKEN_TABLE: LazyLock<Vec<(TokenKind, Regex)>> = LazyLock::new(|| {
    [
        (TokenKind::Whitespace, r"^\s+"),
        (TokenKind::Open, r"^\("),
        (TokenKind::Close, r"^\)"),
        (TokenKind::Compare, r"^(?:<=?|>=?|==?|!=|~=)"),
        (TokenKind::Or, r"^(?:OR\b|\|\|?)"),
        (TokenKind::And, r"^(?:AND\b|&&?)"),
        (TokenKind::Not, r"^(?:NOT\b|!)"),
        (TokenKind::Null, r"^null\b"),
        (TokenKind::True, r"^true\b"),
        (TokenKind::False, r"^false\b"),
        (TokenKind::Number, r"^[+\-]?[0-9]+(?:\.[0-9]+)?\b"),
        (
            TokenKind::Text,
            r#"^(?:\w[^\s()!=<>|&"']*|"(?:[^\n"\\]|\\.)*"|'(?:[^\n'\\]|\\.)*')"#,
        ),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).expect("valid token regex")))
    .collect()
});

fn next_token(rest: &str, offset: usize) -> Option<Token<'_>> {
    TOKEN_TABLE.iter().find_map(|(kind, regex)| {
        regex
            .find(rest)
            .filter(|m| !m.is_empty())
            .map(|m| Token {
                kind: *kind,
                text: m.as_str(),
                start: offset,
                end: offset + m.end(),
            })
    })
}

/// Split `input` into tokens, dropping whitespace.
///
/// The result always ends with a [`TokenKind::Eof`] token. When `stop` is a
/// non-empty literal and the input at a token boundary starts with it, lexing
/// ends there and the end-of-input token spans the stop literal; the rest of
/// the input is never looked at.
///
/// # Errors
/// Returns [`LexError`] when no token matches at some offset.
///
/// # Examples
/// ```
/// use predicate_expr::{TokenKind, tokenize};
/// let tokens = tokenize("weight <= 2 { tail", Some("{"))
///     .expect("example ensures fallible call succeeds");
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     [TokenKind::Text, TokenKind::Compare, TokenKind::Number, TokenKind::Eof]
/// );
/// ```
pub fn tokenize<'a>(input: &'a str, stop: Option<&str>) -> Result<Vec<Token<'a>>, LexError> {
    let stop = stop.filter(|literal| !literal.is_empty());
    let mut tokens = Vec::new();
    let mut offset = 0;

    loop {
        let rest = input.get(offset..).unwrap_or_default();
        if let Some(literal) = stop.filter(|literal| rest.starts_with(*literal)) {
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: rest.get(..literal.len()).unwrap_or_default(),
                start: offset,
                end: offset + literal.len(),
            });
            break;
        }
        if rest.is_empty() {
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: rest,
                start: offset,
                end: offset,
            });
            break;
        }

        let token = next_token(rest, offset).ok_or_else(|| LexError::new(offset, rest))?;
        if token.kind == TokenKind::Whitespace {
            // A whitespace stop literal must not be swallowed by the run.
            offset += stop
                .and_then(|literal| token.text.find(literal))
                .unwrap_or(token.text.len());
            continue;
        }
        offset = token.end;
        tokens.push(token);
    }

    log::trace!("lexed {} token(s) from {input:?}", tokens.len());
    Ok(tokens)
}
