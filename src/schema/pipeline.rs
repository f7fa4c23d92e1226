//! Modifier steps and the loop that runs them.
//!
//! A node's steps are stored in attachment order. Parsing walks them twice:
//!
//! 1. Inward (last attached first) to work out the input each layer sees.
//!    `default` substitutes its value for `undefined` and `preprocess`
//!    rewrites the input; every other step passes its input through.
//! 2. Outward (first attached first) over the base result, letting each
//!    step accept, reject, or rewrite what the layer below produced.
//!
//! Modifiers therefore compose as if each one wrapped everything attached
//! before it.

use std::sync::Arc;

use stillwater::Validation;

use super::Schema;
use crate::error::{ParseError, ParseErrors};
use crate::options::{ErrorMessage, ParseOptions};
use crate::value::Value;
use crate::ParseResult;

type MapFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;
type InputFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;
type CheckFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

#[derive(Clone)]
pub(crate) enum Fallback {
    Value(Value),
    Factory(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl Fallback {
    fn resolve(&self) -> Value {
        match self {
            Fallback::Value(value) => value.clone(),
            Fallback::Factory(factory) => factory(),
        }
    }
}

/// A modifier attached to a node.
#[derive(Clone)]
pub(crate) enum Step {
    Optional,
    Nullable,
    Nullish,
    Default(Fallback),
    Preprocess(InputFn),
    Transform(MapFn),
    Pipe(Box<Schema>),
    Refine {
        check: CheckFn,
        message: Option<ErrorMessage>,
        subject: MessageSubject,
    },
}

/// Which value a refinement message function is rendered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MessageSubject {
    /// The raw input of the refining layer.
    Input,
    /// The output that failed the check.
    Output,
}

impl Step {
    pub(crate) fn preprocess<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Step::Preprocess(Arc::new(f))
    }

    /// The input handed to the layer below, given this layer's input.
    fn inner_input(&self, input: &Value) -> Value {
        match self {
            Step::Default(fallback) if input.is_undefined() => fallback.resolve(),
            Step::Preprocess(f) => f(input),
            _ => input.clone(),
        }
    }

    /// Post-processes the inner result. `raw` is this layer's own input.
    fn apply(&self, result: ParseResult, raw: &Value, options: ParseOptions) -> ParseResult {
        match (self, result) {
            (Step::Optional, Validation::Failure(_)) if raw.is_undefined() => {
                Validation::Success(Value::Undefined)
            }
            (Step::Nullable, Validation::Failure(_)) if raw.is_null() => {
                Validation::Success(Value::Null)
            }
            (Step::Nullish, Validation::Failure(_)) if raw.is_nullish() => {
                Validation::Success(raw.clone())
            }
            (Step::Transform(f), Validation::Success(data)) => Validation::Success(f(data)),
            (Step::Pipe(next), Validation::Success(data)) => next.execute(&data, options),
            (
                Step::Refine {
                    check,
                    message,
                    subject,
                },
                Validation::Success(data),
            ) => {
                if check(&data) {
                    Validation::Success(data)
                } else {
                    let shown = match subject {
                        MessageSubject::Input => raw,
                        MessageSubject::Output => &data,
                    };
                    Validation::Failure(ParseErrors::single(refinement_error(
                        message.as_ref(),
                        shown,
                        &data,
                    )))
                }
            }
            (_, result) => result,
        }
    }
}

fn refinement_error(message: Option<&ErrorMessage>, shown: &Value, data: &Value) -> ParseError {
    let message = match message {
        Some(message) => message.render(shown),
        None => format!("The value \"{}\" failed a refinement check.", shown),
    };
    ParseError::new(message)
        .with_code("refinement")
        .with_got(data.to_string())
}

pub(super) fn execute(schema: &Schema, value: &Value, options: ParseOptions) -> ParseResult {
    let steps = schema.steps();

    let mut inputs = Vec::with_capacity(steps.len());
    let mut input = value.clone();
    for step in steps.iter().rev() {
        let inner = step.inner_input(&input);
        inputs.push(input);
        input = inner;
    }
    inputs.reverse();

    let mut result = schema.run_base(&input, options);
    for (step, raw) in steps.iter().zip(&inputs) {
        result = step.apply(result, raw, options);
    }
    result
}

impl Schema {
    /// Accepts `undefined` in addition to whatever the node accepts.
    pub fn optional(self) -> Self {
        self.push_step(Step::Optional)
    }

    /// Accepts `null` in addition to whatever the node accepts.
    pub fn nullable(self) -> Self {
        self.push_step(Step::Nullable)
    }

    /// Accepts `null` and `undefined`, passing either through unchanged.
    pub fn nullish(self) -> Self {
        self.push_step(Step::Nullish)
    }

    /// Substitutes `value` when the input is `undefined`.
    ///
    /// The substitute still goes through the node, so a default that fails
    /// validation is reported like any other input. `null` is not replaced.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sift::{Schema, Value};
    ///
    /// let schema = Schema::string().default("guest");
    /// assert_eq!(schema.parse(&Value::Undefined).unwrap(), Value::from("guest"));
    /// assert!(schema.safe_parse(&Value::Null).is_failure());
    /// ```
    pub fn default(self, value: impl Into<Value>) -> Self {
        self.push_step(Step::Default(Fallback::Value(value.into())))
    }

    /// Like [`default`](Self::default), calling `factory` on each substitution.
    pub fn default_with<F>(self, factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.push_step(Step::Default(Fallback::Factory(Arc::new(factory))))
    }

    /// Maps successful output through `f`. Failures pass through untouched.
    pub fn transform<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.push_step(Step::Transform(Arc::new(f)))
    }

    /// Feeds successful output into `next`, whose result becomes this node's.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sift::{Schema, Value};
    ///
    /// let schema = Schema::string()
    ///     .transform(|v| Value::from(v.as_str().map_or(0, str::len)))
    ///     .pipe(Schema::number());
    ///
    /// assert_eq!(schema.parse(&Value::from("hello")).unwrap(), Value::from(5));
    /// ```
    pub fn pipe(self, next: Schema) -> Self {
        self.push_step(Step::Pipe(Box::new(next)))
    }

    /// Rejects successful output for which `check` returns false.
    pub fn refine<F>(self, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.push_step(Step::Refine {
            check: Arc::new(check),
            message: None,
            subject: MessageSubject::Input,
        })
    }

    /// Like [`refine`](Self::refine), with a custom message.
    ///
    /// A message function receives the raw input of this layer, not the
    /// output that was checked.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sift::{Schema, Value};
    ///
    /// let schema = Schema::number().refine_with(
    ///     |v| v.as_f64().is_some_and(|n| n >= 18.0),
    ///     "must be an adult",
    /// );
    ///
    /// let error = schema.parse(&Value::from(12)).unwrap_err();
    /// assert_eq!(error.message, "must be an adult");
    /// assert_eq!(error.code, "refinement");
    /// ```
    pub fn refine_with<F>(self, check: F, message: impl Into<ErrorMessage>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.push_step(Step::Refine {
            check: Arc::new(check),
            message: Some(message.into()),
            subject: MessageSubject::Input,
        })
    }

    /// Like [`refine_with`](Self::refine_with), but a message function
    /// receives the output that failed the check instead of the raw input.
    ///
    /// Use this when the message describes something only visible after
    /// earlier transforms, such as duplicates among normalized items.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sift::{ErrorMessage, Schema, Value};
    ///
    /// let schema = Schema::string()
    ///     .transform(|v| Value::from(v.as_str().map_or(0, str::len)))
    ///     .refine_output_with(
    ///         |v| v.as_f64().is_some_and(|n| n <= 3.0),
    ///         ErrorMessage::from_fn(|v| format!("{} characters is too many", v)),
    ///     );
    ///
    /// let error = schema.parse(&Value::from("hello")).unwrap_err();
    /// assert_eq!(error.message, "5 characters is too many");
    /// ```
    pub fn refine_output_with<F>(self, check: F, message: impl Into<ErrorMessage>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.push_step(Step::Refine {
            check: Arc::new(check),
            message: Some(message.into()),
            subject: MessageSubject::Output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn unwrap_success(result: ParseResult) -> Value {
        result.into_result().unwrap()
    }

    fn unwrap_failure(result: ParseResult) -> ParseErrors {
        result.into_result().unwrap_err()
    }

    #[test]
    fn test_optional_only_rescues_undefined() {
        let schema = Schema::string().optional();
        assert_eq!(unwrap_success(schema.safe_parse(&Value::Undefined)), Value::Undefined);
        assert!(schema.safe_parse(&Value::Null).is_failure());
        assert!(schema.safe_parse(&Value::from(1)).is_failure());
    }

    #[test]
    fn test_nullish_passes_input_through() {
        let schema = Schema::number().nullish();
        assert_eq!(unwrap_success(schema.safe_parse(&Value::Null)), Value::Null);
        assert_eq!(unwrap_success(schema.safe_parse(&Value::Undefined)), Value::Undefined);
    }

    #[test]
    fn test_default_is_validated() {
        let schema = Schema::number().default("oops");
        let errors = unwrap_failure(schema.safe_parse(&Value::Undefined));
        assert_eq!(errors.first().code, "invalid_type");
    }

    #[test]
    fn test_default_factory_called_per_substitution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let schema = Schema::number().default_with(move || {
            Value::from(counter.fetch_add(1, Ordering::SeqCst) as f64)
        });

        assert_eq!(unwrap_success(schema.safe_parse(&Value::Undefined)), Value::from(0));
        assert_eq!(unwrap_success(schema.safe_parse(&Value::Undefined)), Value::from(1));
        assert_eq!(unwrap_success(schema.safe_parse(&Value::from(9))), Value::from(9));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_transform_skipped_on_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let schema = Schema::string().transform(move |v| {
            counter.fetch_add(1, Ordering::SeqCst);
            v
        });

        assert!(schema.safe_parse(&Value::from(1)).is_failure());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_refine_sees_transformed_output() {
        let schema = Schema::string()
            .transform(|v| Value::from(v.as_str().map_or(0, str::len)))
            .refine(|v| v.as_f64() == Some(3.0));

        assert_eq!(unwrap_success(schema.safe_parse(&Value::from("abc"))), Value::from(3));
        let errors = unwrap_failure(schema.safe_parse(&Value::from("ab")));
        assert_eq!(errors.first().code, "refinement");
        assert_eq!(
            errors.first().message,
            r#"The value "ab" failed a refinement check."#
        );
    }

    #[test]
    fn test_refine_message_fn_receives_raw_input() {
        let schema = Schema::string()
            .transform(|v| Value::from(v.as_str().map_or(0, str::len)))
            .refine_with(
                |v| v.as_f64().is_some_and(|n| n > 5.0),
                ErrorMessage::from_fn(|raw| format!("{} is too short", raw)),
            );

        let errors = unwrap_failure(schema.safe_parse(&Value::from("abc")));
        assert_eq!(errors.first().message, "abc is too short");
    }

    #[test]
    fn test_refine_output_message_sees_checked_output() {
        let schema = Schema::string()
            .transform(|v| Value::from(v.as_str().map_or(0, str::len)))
            .refine_output_with(
                |v| v.as_f64().is_some_and(|n| n > 5.0),
                ErrorMessage::from_fn(|out| format!("only {} characters", out)),
            );

        let errors = unwrap_failure(schema.safe_parse(&Value::from("abc")));
        assert_eq!(errors.first().message, "only 3 characters");
        assert_eq!(errors.first().code, "refinement");
    }

    #[test]
    fn test_preprocess_runs_before_base() {
        let schema = Schema::preprocess(
            |v| match v {
                Value::String(s) => Value::from(s.trim()),
                other => other.clone(),
            },
            Schema::literal("yes"),
        );
        assert_eq!(unwrap_success(schema.safe_parse(&Value::from("  yes "))), Value::from("yes"));
    }

    #[test]
    fn test_modifiers_apply_in_attachment_order() {
        let inner_optional = Schema::number().optional().default(5);
        assert_eq!(unwrap_success(inner_optional.safe_parse(&Value::Undefined)), Value::from(5));

        let outer_optional = Schema::number().default(5).optional();
        assert_eq!(unwrap_success(outer_optional.safe_parse(&Value::Undefined)), Value::from(5));

        let refine_then_optional = Schema::number().refine(|_| false).optional();
        assert_eq!(
            unwrap_success(refine_then_optional.safe_parse(&Value::Undefined)),
            Value::Undefined
        );
    }

    #[test]
    fn test_pipe_failure_is_reported() {
        let schema = Schema::string().pipe(Schema::enumeration(["a"]));
        let errors = unwrap_failure(schema.safe_parse(&Value::from("b")));
        assert_eq!(errors.first().code, "invalid_enum_value");
    }
}
