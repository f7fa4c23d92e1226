//! Parse-time and construction-time configuration.
//!
//! [`ParseOptions`] is passed by value through every nested parse and is
//! never modified on the way down. [`SchemaOptions`] configures a node when it
//! is constructed and is what extensions see as the node's metadata.

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// Options controlling a single parse.
///
/// # Example
///
/// ```rust
/// use sift::ParseOptions;
///
/// assert!(ParseOptions::default().abort_early);
/// assert!(!ParseOptions::collect_all().abort_early);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Stop at the first failing field or element (`true`, the default), or
    /// keep going and report every failure (`false`).
    pub abort_early: bool,
}

impl ParseOptions {
    /// Options that report every failure instead of the first one.
    pub fn collect_all() -> Self {
        Self { abort_early: false }
    }

    /// Sets the error-collection policy.
    pub fn abort_early(mut self, abort_early: bool) -> Self {
        self.abort_early = abort_early;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { abort_early: true }
    }
}

/// Function form of an error message, computed from the rejected value.
pub type MessageFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// A custom error message: either a constant or computed from the rejected value.
#[derive(Clone)]
pub enum ErrorMessage {
    Static(String),
    Dynamic(MessageFn),
}

impl ErrorMessage {
    /// Creates a message computed from the rejected value.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        ErrorMessage::Dynamic(Arc::new(f))
    }

    /// Renders the message for `value`.
    pub fn render(&self, value: &Value) -> String {
        match self {
            ErrorMessage::Static(message) => message.clone(),
            ErrorMessage::Dynamic(f) => f(value),
        }
    }
}

impl fmt::Debug for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorMessage::Static(message) => f.debug_tuple("Static").field(message).finish(),
            ErrorMessage::Dynamic(_) => f.write_str("Dynamic(<fn>)"),
        }
    }
}

impl From<&str> for ErrorMessage {
    fn from(message: &str) -> Self {
        ErrorMessage::Static(message.to_string())
    }
}

impl From<String> for ErrorMessage {
    fn from(message: String) -> Self {
        ErrorMessage::Static(message)
    }
}

/// Construction-time options shared by every schema constructor.
///
/// # Example
///
/// ```rust
/// use sift::{Schema, SchemaOptions, Value};
///
/// let schema = Schema::string_with(
///     SchemaOptions::new()
///         .name("username")
///         .message("username must be text"),
/// );
///
/// let result = schema.safe_parse(&Value::from(42));
/// assert_eq!(result.into_result().unwrap_err().first().message, "username must be text");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaOptions {
    /// Identifier used in signatures and descriptions.
    pub name: Option<String>,
    /// Replaces the default type-mismatch message.
    pub message: Option<ErrorMessage>,
}

impl SchemaOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the node's name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the type-mismatch message.
    pub fn message(mut self, message: impl Into<ErrorMessage>) -> Self {
        self.message = Some(message.into());
        self
    }
}
