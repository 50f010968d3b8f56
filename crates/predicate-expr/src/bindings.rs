//! Variable bindings consumed by predicate evaluation.
//!
//! A [`ValueProvider`] maps a variable name to the values currently bound to
//! it. Providers must be deterministic and free of side effects for the
//! duration of one evaluation, since a variable may be looked up more than
//! once per expression.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

const NO_VALUES: &[String] = &[];

/// Source of the values bound to each variable.
pub trait ValueProvider {
    /// Values bound to `variable`, or an empty slice when it is unbound.
    fn lookup(&self, variable: &str) -> Cow<'_, [String]>;
}

impl<T: ValueProvider + ?Sized> ValueProvider for &T {
    fn lookup(&self, variable: &str) -> Cow<'_, [String]> {
        (**self).lookup(variable)
    }
}

impl<S: BuildHasher> ValueProvider for HashMap<String, Vec<String>, S> {
    fn lookup(&self, variable: &str) -> Cow<'_, [String]> {
        Cow::Borrowed(self.get(variable).map_or(NO_VALUES, Vec::as_slice))
    }
}

impl ValueProvider for BTreeMap<String, Vec<String>> {
    fn lookup(&self, variable: &str) -> Cow<'_, [String]> {
        Cow::Borrowed(self.get(variable).map_or(NO_VALUES, Vec::as_slice))
    }
}

/// Provider backed by a lookup closure; see [`from_fn`].
#[derive(Clone, Copy)]
pub struct FromFn<F>(F);

/// Wrap a closure returning all values of a variable as a provider.
///
/// # Examples
/// ```
/// use predicate_expr::{from_fn, parse};
///
/// let predicate = parse("ports = audio").expect("example ensures fallible call succeeds");
/// let provider = from_fn(|name: &str| match name {
///     "ports" => vec!["usb3".to_owned(), "audio".to_owned()],
///     _ => Vec::new(),
/// });
/// assert!(predicate.evaluate(&provider));
/// ```
#[must_use]
pub fn from_fn<F>(lookup: F) -> FromFn<F>
where
    F: Fn(&str) -> Vec<String>,
{
    FromFn(lookup)
}

impl<F> ValueProvider for FromFn<F>
where
    F: Fn(&str) -> Vec<String>,
{
    fn lookup(&self, variable: &str) -> Cow<'_, [String]> {
        Cow::Owned((self.0)(variable))
    }
}

/// Provider for variables holding at most one value; see [`single_bounded`].
#[derive(Clone, Copy)]
pub struct SingleBounded<F>(F);

/// Adapt a closure returning an optional single value per variable.
///
/// # Examples
/// ```
/// use std::collections::HashMap;
/// use predicate_expr::{parse, single_bounded};
///
/// let values = HashMap::from([("weight", "1.25")]);
/// let predicate = parse("weight <= 2").expect("example ensures fallible call succeeds");
/// assert!(predicate.evaluate(&single_bounded(|name| {
///     values.get(name).map(|value| (*value).to_owned())
/// })));
/// ```
#[must_use]
pub fn single_bounded<F>(lookup: F) -> SingleBounded<F>
where
    F: Fn(&str) -> Option<String>,
{
    SingleBounded(lookup)
}

impl<F> ValueProvider for SingleBounded<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn lookup(&self, variable: &str) -> Cow<'_, [String]> {
        Cow::Owned((self.0)(variable).into_iter().collect())
    }
}

type Supplier = Box<dyn Fn() -> Vec<String> + Send + Sync>;

enum Binding {
    Constant(Vec<String>),
    Supplier(Supplier),
}

/// Builder binding variables to constants or to lazily invoked suppliers.
///
/// Suppliers run on every lookup, so a binding can track external state such
/// as a getter on some other object.
///
/// # Examples
/// ```
/// use predicate_expr::{ValueBindings, parse};
///
/// let bindings = ValueBindings::new()
///     .constant("processor", "i5")
///     .constants("ports", ["audio", "usb"])
///     .values("weight", || vec!["1".to_owned(), "3".to_owned()]);
/// let predicate = parse("(processor == i5 OR weight >= 1.5) && (weight <= 2 OR ports = audio)")
///     .expect("example ensures fallible call succeeds");
/// assert!(predicate.evaluate(&bindings));
/// ```
#[derive(Default)]
pub struct ValueBindings {
    bindings: HashMap<String, Binding>,
}

impl ValueBindings {
    /// Create an empty set of bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `variable` to a single constant value.
    #[must_use]
    pub fn constant(self, variable: impl Into<String>, value: impl Into<String>) -> Self {
        self.bind(variable, Binding::Constant(vec![value.into()]))
    }

    /// Bind `variable` to a set of constant values.
    #[must_use]
    pub fn constants<I, S>(self, variable: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.bind(variable, Binding::Constant(values))
    }

    /// Bind `variable` to a supplier of at most one value.
    #[must_use]
    pub fn value<F>(self, variable: impl Into<String>, supplier: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        let supplier: Supplier = Box::new(move || supplier().into_iter().collect());
        self.bind(variable, Binding::Supplier(supplier))
    }

    /// Bind `variable` to a supplier of any number of values.
    #[must_use]
    pub fn values<F>(self, variable: impl Into<String>, supplier: F) -> Self
    where
        F: Fn() -> Vec<String> + Send + Sync + 'static,
    {
        self.bind(variable, Binding::Supplier(Box::new(supplier)))
    }

    /// Whether `variable` has a binding, regardless of its current values.
    #[must_use]
    pub fn is_bound(&self, variable: &str) -> bool {
        self.bindings.contains_key(variable)
    }

    fn bind(mut self, variable: impl Into<String>, binding: Binding) -> Self {
        self.bindings.insert(variable.into(), binding);
        self
    }
}

impl ValueProvider for ValueBindings {
    fn lookup(&self, variable: &str) -> Cow<'_, [String]> {
        match self.bindings.get(variable) {
            Some(Binding::Constant(values)) => Cow::Borrowed(values.as_slice()),
            Some(Binding::Supplier(supplier)) => Cow::Owned(supplier()),
            None => Cow::Borrowed(NO_VALUES),
        }
    }
}

impl fmt::Debug for ValueBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.bindings.keys().collect();
        names.sort();
        f.debug_struct("ValueBindings")
            .field("variables", &names)
            .finish()
    }
}
