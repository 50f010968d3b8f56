//! String helpers shared by the lexer and parser.

use std::borrow::Cow;

/// Quote characters accepted around variable names and operands.
pub(crate) const QUOTES: [char; 2] = ['"', '\''];

/// Strip the surrounding quotes from `text` when it starts with one of
/// `quotes` and ends with the same, unescaped, quote character.
///
/// Inside the quotes a backslash escapes the quote character and the backslash
/// itself; any other backslash is kept verbatim. Unquoted text is returned
/// unchanged. A lone quote character unquotes to the empty string.
pub(crate) fn unquote<'a>(text: &'a str, quotes: &[char]) -> Cow<'a, str> {
    let Some(quote) = text.chars().next().filter(|c| quotes.contains(c)) else {
        return Cow::Borrowed(text);
    };
    if text.len() == quote.len_utf8() {
        return Cow::Borrowed("");
    }
    let Some(inner) = text
        .strip_prefix(quote)
        .and_then(|rest| rest.strip_suffix(quote))
    else {
        return Cow::Borrowed(text);
    };
    let trailing_backslashes = inner.chars().rev().take_while(|c| *c == '\\').count();
    if trailing_backslashes & 1 == 1 {
        // the closing quote is escaped, so the text is not quoted at all
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        let escaped = if c == '\\' {
            chars.next_if(|next| *next == '\\' || *next == quote)
        } else {
            None
        };
        out.push(escaped.unwrap_or(c));
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("plain", "plain")]
    #[case("'single'", "single")]
    #[case("\"double\"", "double")]
    #[case("'2.000,00 €'", "2.000,00 €")]
    #[case("''", "")]
    #[case("'", "")]
    #[case(r#""say \"hi\"""#, "say \"hi\"")]
    #[case(r"'a\\b'", r"a\b")]
    #[case(r"'usb\d'", r"usb\d")]
    #[case("'mixed\"", "'mixed\"")]
    #[case(r"'open\'", r"'open\'")]
    fn unquotes_like_the_lexer_expects(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(unquote(input, &QUOTES), expected);
    }

    #[test]
    fn borrows_unquoted_text() {
        assert!(matches!(unquote("i5", &QUOTES), Cow::Borrowed("i5")));
    }
}
