//! Error types surfaced while lexing and parsing predicate expressions.

use thiserror::Error;

/// Maximum number of characters of remaining input quoted in a [`LexError`].
pub(crate) const PREVIEW_LEN: usize = 20;

/// Raised when the lexer finds no token at the current offset.
///
/// # Examples
/// ```
/// use predicate_expr::LexError;
/// let err = LexError::new(4, "$$$");
/// assert_eq!(err.to_string(), "unknown symbol: $$$ at byte 4 (zero-based)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown symbol: {preview} at byte {position} (zero-based)")]
pub struct LexError {
    /// Byte offset of the unrecognised input.
    pub position: usize,
    /// Remaining input, truncated with an ellipsis.
    pub preview: String,
}

impl LexError {
    /// Create a lex error, truncating `remaining` to a short preview.
    #[must_use]
    pub fn new(position: usize, remaining: &str) -> Self {
        Self {
            position,
            preview: ellipsis(remaining, PREVIEW_LEN),
        }
    }
}

/// Raised for any grammar violation found while parsing.
///
/// # Examples
/// ```
/// use predicate_expr::ParseError;
/// let err = ParseError::new("unknown variable price", 0);
/// assert_eq!(err.position, 0);
/// assert_eq!(err.to_string(), "unknown variable price at byte 0 (zero-based)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at byte {position} (zero-based)")]
pub struct ParseError {
    /// Description of the violation, without position information.
    pub message: String,
    /// Byte offset of the offending token.
    pub position: usize,
}

impl ParseError {
    /// Create a parse error for the token starting at `position`.
    #[must_use]
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// Errors returned by [`crate::PredicateParser::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateError {
    /// The input contains a character sequence no token matches.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// The token stream does not follow the grammar.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl PredicateError {
    /// Byte offset at which parsing failed.
    #[must_use]
    pub fn position(&self) -> usize {
        match self {
            Self::Lex(err) => err.position,
            Self::Parse(err) => err.position,
        }
    }
}

/// Truncate `text` to at most `max_chars` characters, ending with `...` when
/// anything was cut off.
pub(crate) fn ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_parse_error_with_position() {
        let err = ParseError::new("unexpected token", 7);
        assert_eq!(err.to_string(), "unexpected token at byte 7 (zero-based)");
    }

    #[test]
    fn truncates_long_previews() {
        let err = LexError::new(0, "$ this is a rather long remainder");
        assert_eq!(err.preview, "$ this is a rathe...");
        assert_eq!(err.preview.chars().count(), PREVIEW_LEN);
    }

    #[test]
    fn keeps_short_previews() {
        assert_eq!(ellipsis("$x", PREVIEW_LEN), "$x");
    }

    #[test]
    fn forwards_inner_display() {
        let inner = ParseError::new("missing clause", 3);
        let err = PredicateError::from(inner.clone());
        assert_eq!(err.to_string(), inner.to_string());
        assert_eq!(err.position(), 3);
    }
}
