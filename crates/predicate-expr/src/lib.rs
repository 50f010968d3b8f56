//! Boolean predicate expressions over multi-valued string bindings.
//!
//! A condition such as `weight >= 1 && weight <= 2 AND processor != i5` is
//! parsed once into an immutable [`Predicate`] and then evaluated against any
//! [`ValueProvider`], which maps each variable to zero or more string values.
//!
//! ```
//! use predicate_expr::{ValueBindings, parse};
//!
//! let predicate = parse("ports ~= '(?i).*USB.*' AND price > '2.000,00 €'")
//!     .expect("example ensures fallible call succeeds");
//! let bindings = ValueBindings::new()
//!     .constants("ports", ["usb3", "audio"])
//!     .constant("price", "2.795,00 €");
//! assert!(predicate.evaluate(&bindings));
//! ```

mod ast;
mod bindings;
mod compare;
mod errors;
mod lexer;
mod parser;
mod predicate;
mod text;

pub use ast::{CompareOp, Comparison, Expression, Operand, RegexMatch};
pub use bindings::{
    FromFn, SingleBounded, ValueBindings, ValueProvider, from_fn, single_bounded,
};
pub use compare::compare_number_aware;
pub use errors::{LexError, ParseError, PredicateError};
pub use lexer::{Token, TokenKind, tokenize};
pub use parser::{MAX_NESTING_DEPTH, PredicateParser, parse};
pub use predicate::Predicate;
