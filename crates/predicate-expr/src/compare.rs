//! Case-insensitive, number-aware string ordering.
//!
//! Runs of ASCII digits are compared as whole integers rather than character
//! by character, so `file9` sorts before `file10`. When a digit run meets a
//! non-digit character, the run sorts as if it were the character `'0'`.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Compare two strings ignoring case and treating digit runs as numbers.
///
/// # Examples
/// ```
/// use std::cmp::Ordering;
/// use predicate_expr::compare_number_aware;
///
/// assert_eq!(compare_number_aware("file9", "file10"), Ordering::Less);
/// assert_eq!(compare_number_aware("USB3", "usb3"), Ordering::Equal);
/// assert_eq!(compare_number_aware("i7", "i5"), Ordering::Greater);
/// ```
#[must_use]
pub fn compare_number_aware(left: &str, right: &str) -> Ordering {
    let mut left = left.chars().peekable();
    let mut right = right.chars().peekable();

    loop {
        let (l, r) = match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => (l, r),
        };

        match (l.is_ascii_digit(), r.is_ascii_digit()) {
            (true, true) => {
                let ord = compare_digit_runs(&take_digits(&mut left), &take_digits(&mut right));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (true, false) => return '0'.cmp(&r),
            (false, true) => return l.cmp(&'0'),
            (false, false) => {
                let ord = fold_case(l).cmp(&fold_case(r));
                if ord != Ordering::Equal {
                    return ord;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        run.push(c);
    }
    run
}

// Compares digit runs of arbitrary length without overflow.
fn compare_digit_runs(left: &str, right: &str) -> Ordering {
    let left = left.trim_start_matches('0');
    let right = right.trim_start_matches('0');
    left.len().cmp(&right.len()).then_with(|| left.cmp(right))
}

fn fold_case(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
