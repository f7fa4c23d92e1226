//! Parse error types.
//!
//! This module provides [`ParseError`] for single failures and
//! [`ParseErrors`] for the ordered list a failed parse reports.

use std::fmt::{self, Display};

use stillwater::prelude::*;

use crate::path::{ErrorPath, PathSegment};

/// Where in a nested structure a failure occurred.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorCause {
    /// Dotted/indexed path such as `address.city` or `tags.2`.
    pub key: Option<String>,
}

/// A single parse failure.
///
/// `ParseError` carries:
/// - **message**: the human-readable failure, prefixed with the dotted key once
///   the error has propagated out of a composite node (`"address.city: ..."`)
/// - **cause**: the key of the failing value, absent at the root
/// - **code**: machine-readable classification (`invalid_type`, `refinement`, ...)
/// - **got** / **expected**: optional detail for renderers
///
/// # Example
///
/// ```rust
/// use sift::{ParseError, PathSegment};
///
/// let error = ParseError::new("must be positive")
///     .with_code("refinement")
///     .prefixed(PathSegment::field("age"))
///     .prefixed(PathSegment::field("person"));
///
/// assert_eq!(error.key(), Some("person.age"));
/// assert_eq!(error.message, "person.age: must be positive");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Human-readable error message, including the path prefix when nested.
    pub message: String,
    /// Location of the failure relative to the schema that reported it.
    pub cause: Option<ErrorCause>,
    /// Machine-readable error code.
    pub code: String,
    /// The actual value that was received (formatted as string).
    pub got: Option<String>,
    /// Description of what was expected.
    pub expected: Option<String>,
    path: ErrorPath,
    reason: String,
}

impl ParseError {
    /// Creates a root-level error with the given message.
    ///
    /// The error code defaults to "validation_error".
    pub fn new(message: impl Into<String>) -> Self {
        let reason = message.into();
        Self {
            message: reason.clone(),
            cause: None,
            code: "validation_error".to_string(),
            got: None,
            expected: None,
            path: ErrorPath::root(),
            reason,
        }
    }

    /// Sets the error code and returns self for chaining.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Sets the "got" (actual value) field and returns self for chaining.
    pub fn with_got(mut self, got: impl Into<String>) -> Self {
        self.got = Some(got.into());
        self
    }

    /// Sets the "expected" field and returns self for chaining.
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Returns this error re-rooted one level up, under `segment`.
    ///
    /// The key and the message prefix are rebuilt from the full path, so
    /// repeated prefixing yields `a.b.c: reason` rather than nested prefixes.
    pub fn prefixed(mut self, segment: PathSegment) -> Self {
        self.path = self.path.prepend(segment);
        let key = self.path.to_string();
        self.message = format!("{}: {}", key, self.reason);
        self.cause = Some(ErrorCause { key: Some(key) });
        self
    }

    /// The dotted key of the failing value, if nested.
    pub fn key(&self) -> Option<&str> {
        self.cause.as_ref().and_then(|c| c.key.as_deref())
    }

    /// The structured path of the failing value.
    pub fn path(&self) -> &ErrorPath {
        &self.path
    }

    /// The message without any path prefix.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref expected) = self.expected {
            write!(f, " (expected: {})", expected)?;
        }
        if let Some(ref got) = self.got {
            write!(f, " (got: {})", got)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ParseError>();
    assert_sync::<ParseError>();
};

/// A non-empty, ordered collection of parse errors.
///
/// The first element is the representative error; under the collect-all
/// policy the rest follow in the order fields and elements were visited.
///
/// # Combining Errors
///
/// ```rust
/// use sift::{ParseError, ParseErrors};
/// use stillwater::prelude::*;
///
/// let errors = ParseErrors::single(ParseError::new("first"))
///     .combine(ParseErrors::single(ParseError::new("second")));
///
/// assert_eq!(errors.len(), 2);
/// assert_eq!(errors.first().message, "first");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParseErrors(NonEmptyVec<ParseError>);

impl ParseErrors {
    /// Creates a `ParseErrors` containing a single error.
    pub fn single(error: ParseError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Returns the number of errors in this collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the contained errors.
    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.0.iter()
    }

    /// Returns the representative (first) error.
    pub fn first(&self) -> &ParseError {
        self.0.head()
    }

    /// Returns all errors reported at the given dotted key.
    pub fn at_key(&self, key: &str) -> Vec<&ParseError> {
        self.0.iter().filter(|e| e.key() == Some(key)).collect()
    }

    /// Returns all errors with the specified error code.
    pub fn with_code(&self, code: &str) -> Vec<&ParseError> {
        self.0.iter().filter(|e| e.code == code).collect()
    }

    /// Returns every error re-rooted under `segment`, order preserved.
    pub fn prefixed(self, segment: &PathSegment) -> Self {
        Self::from_vec(
            self.into_iter()
                .map(|e| e.prefixed(segment.clone()))
                .collect(),
        )
    }

    /// Converts this collection into a `Vec<ParseError>`.
    pub fn into_vec(self) -> Vec<ParseError> {
        self.0.into_vec()
    }

    /// Creates a `ParseErrors` from a `Vec<ParseError>`.
    ///
    /// # Panics
    ///
    /// Panics if the provided vec is empty.
    pub fn from_vec(errors: Vec<ParseError>) -> Self {
        Self(NonEmptyVec::from_vec(errors).expect("ParseErrors requires at least one error"))
    }
}

impl Semigroup for ParseErrors {
    fn combine(self, other: Self) -> Self {
        ParseErrors(self.0.combine(other.0))
    }
}

impl Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Parsing failed with {} error(s):", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a ParseError;
    type IntoIter = Box<dyn Iterator<Item = &'a ParseError> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.0.iter())
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ParseErrors>();
    assert_sync::<ParseErrors>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_error_has_no_cause() {
        let error = ParseError::new("bad value");

        assert_eq!(error.message, "bad value");
        assert_eq!(error.code, "validation_error");
        assert!(error.cause.is_none());
        assert!(error.key().is_none());
        assert!(error.path().is_root());
    }

    #[test]
    fn test_builder_fields() {
        let error = ParseError::new("must be positive")
            .with_code("refinement")
            .with_got("-5")
            .with_expected("value > 0");

        assert_eq!(error.code, "refinement");
        assert_eq!(error.got, Some("-5".to_string()));
        assert_eq!(error.expected, Some("value > 0".to_string()));
    }

    #[test]
    fn test_prefix_builds_key_and_message() {
        let error = ParseError::new("expected string").prefixed(PathSegment::field("city"));
        assert_eq!(error.key(), Some("city"));
        assert_eq!(error.message, "city: expected string");

        let error = error.prefixed(PathSegment::field("address"));
        assert_eq!(error.key(), Some("address.city"));
        assert_eq!(error.message, "address.city: expected string");
        assert_eq!(error.reason(), "expected string");
    }

    #[test]
    fn test_prefix_with_index() {
        let error = ParseError::new("x").prefixed(PathSegment::index(2));
        let error = error.prefixed(PathSegment::field("tags"));
        assert_eq!(error.key(), Some("tags.2"));
    }

    #[test]
    fn test_display_includes_detail() {
        let error = ParseError::new("invalid format")
            .with_expected("email address")
            .with_got("nope")
            .prefixed(PathSegment::field("email"));

        let display = error.to_string();
        assert!(display.contains("email: invalid format"));
        assert!(display.contains("expected: email address"));
        assert!(display.contains("got: nope"));
    }

    #[test]
    fn test_errors_single() {
        let error = ParseError::new("test");
        let errors = ParseErrors::single(error.clone());

        assert_eq!(errors.len(), 1);
        assert!(!errors.is_empty());
        assert_eq!(errors.first(), &error);
    }

    #[test]
    fn test_errors_prefixed_preserves_order() {
        let errors = ParseErrors::from_vec(vec![
            ParseError::new("a").prefixed(PathSegment::index(1)),
            ParseError::new("b").prefixed(PathSegment::index(3)),
        ])
        .prefixed(&PathSegment::field("items"));

        let keys: Vec<_> = errors.iter().map(|e| e.key().unwrap()).collect();
        assert_eq!(keys, vec!["items.1", "items.3"]);
    }

    #[test]
    fn test_errors_at_key_and_code() {
        let errors = ParseErrors::from_vec(vec![
            ParseError::new("1")
                .with_code("invalid_type")
                .prefixed(PathSegment::field("a")),
            ParseError::new("2")
                .with_code("refinement")
                .prefixed(PathSegment::field("a")),
            ParseError::new("3")
                .with_code("invalid_type")
                .prefixed(PathSegment::field("b")),
        ]);

        assert_eq!(errors.at_key("a").len(), 2);
        assert_eq!(errors.at_key("b").len(), 1);
        assert_eq!(errors.with_code("invalid_type").len(), 2);
    }

    #[test]
    fn test_errors_display() {
        let errors = ParseErrors::single(ParseError::new("required").prefixed(PathSegment::field("name")))
            .combine(ParseErrors::single(ParseError::new("invalid").prefixed(PathSegment::field("email"))));
        let display = errors.to_string();

        assert!(display.contains("2 error(s)"));
        assert!(display.contains("name: required"));
        assert!(display.contains("email: invalid"));
    }

    #[test]
    fn test_semigroup_associativity() {
        let e1 = ParseErrors::single(ParseError::new("1"));
        let e2 = ParseErrors::single(ParseError::new("2"));
        let e3 = ParseErrors::single(ParseError::new("3"));

        let left = e1.clone().combine(e2.clone()).combine(e3.clone());
        let right = e1.combine(e2.combine(e3));

        let left_msgs: Vec<_> = left.iter().map(|e| &e.message).collect();
        let right_msgs: Vec<_> = right.iter().map(|e| &e.message).collect();
        assert_eq!(left_msgs, right_msgs);
    }
}
