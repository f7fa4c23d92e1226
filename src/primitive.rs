//! Validation primitives.
//!
//! A [`ValidationPrimitive`] is a pure predicate deciding whether a raw value
//! conforms to a base kind. Every schema node is built around exactly one.

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A named, thread-safe predicate over [`Value`].
///
/// # Example
///
/// ```rust
/// use sift::{ValidationPrimitive, Value};
///
/// let check = ValidationPrimitive::string();
/// assert!(check.check(&Value::from("hi")));
/// assert!(!check.check(&Value::from(1)));
/// ```
#[derive(Clone)]
pub struct ValidationPrimitive {
    kind: String,
    predicate: Predicate,
}

impl ValidationPrimitive {
    /// Creates a primitive for a custom kind.
    pub fn custom<F>(kind: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            kind: kind.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn string() -> Self {
        Self::custom("string", |v| matches!(v, Value::String(_)))
    }

    /// Accepts any number except `NaN`.
    pub fn number() -> Self {
        Self::custom("number", |v| matches!(v, Value::Number(n) if !n.is_nan()))
    }

    pub fn boolean() -> Self {
        Self::custom("boolean", |v| matches!(v, Value::Bool(_)))
    }

    pub fn date() -> Self {
        Self::custom("date", |v| matches!(v, Value::Date(_)))
    }

    /// Accepts a non-null, non-array structure.
    pub fn object() -> Self {
        Self::custom("object", |v| matches!(v, Value::Object(_)))
    }

    pub fn array() -> Self {
        Self::custom("array", |v| matches!(v, Value::Array(_)))
    }

    /// Accepts every value, including `undefined`.
    pub fn any() -> Self {
        Self::custom("any", |_| true)
    }

    /// Accepts strings that are members of `allowed`.
    pub fn one_of_strings(allowed: Vec<String>) -> Self {
        Self::custom("enum", move |v| match v {
            Value::String(s) => allowed.iter().any(|a| a == s),
            _ => false,
        })
    }

    /// Accepts values strictly equal to `expected`.
    ///
    /// Equality never crosses kinds: `0` is not `false` and `""` is not `null`.
    pub fn equals(expected: Value) -> Self {
        Self::custom("literal", move |v| *v == expected)
    }

    /// Runs the predicate.
    pub fn check(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }

    /// The kind this primitive checks for.
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

impl fmt::Debug for ValidationPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationPrimitive")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
