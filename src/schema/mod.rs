//! Schema nodes.
//!
//! A [`Schema`] pairs a [`ValidationPrimitive`] with an ordered list of
//! modifier steps. Composite nodes (object, array, union) additionally own
//! their child nodes and recurse into them during a parse.
//!
//! # Example
//!
//! ```rust
//! use sift::{Schema, Value};
//! use serde_json::json;
//!
//! let schema = Schema::object([
//!     ("name", Schema::string()),
//!     ("age", Schema::number().optional()),
//! ]);
//!
//! let data = schema.parse(&Value::from(json!({"name": "Alice"}))).unwrap();
//! assert_eq!(data.to_json(), json!({"name": "Alice"}));
//! ```

mod array;
mod combinators;
mod object;
mod pipeline;

use std::fmt;

use indexmap::IndexMap;
use stillwater::Validation;

use crate::error::{ParseError, ParseErrors};
use crate::options::{ErrorMessage, ParseOptions, SchemaOptions};
use crate::primitive::ValidationPrimitive;
use crate::registry::{self, NodeInfo, Operation};
use crate::value::Value;
use crate::ParseResult;

pub(crate) use pipeline::Step;

/// Structural part of a node: what it recurses into, if anything.
#[derive(Clone)]
pub(crate) enum Shape {
    Leaf,
    Object(IndexMap<String, Schema>),
    Array(Box<Schema>),
    Enum(Vec<String>),
    Literal(Value),
    Union(Vec<Schema>),
}

/// A schema node.
///
/// Nodes are built by the constructors below and refined with chainable
/// modifiers (`optional`, `default`, `transform`, `refine`, ...). Every
/// modifier consumes the node and returns it with one more step attached.
/// Cloning a node is cheap; closures are shared behind `Arc`.
///
/// # Example
///
/// ```rust
/// use sift::{ParseOptions, Schema, Value};
/// use serde_json::json;
///
/// let schema = Schema::array(Schema::number());
/// let input = Value::from(json!([1, "two", 3, "four"]));
///
/// let errors = schema
///     .safe_parse_with(&input, ParseOptions::collect_all())
///     .into_result()
///     .unwrap_err();
///
/// let keys: Vec<_> = errors.iter().map(|e| e.key().unwrap()).collect();
/// assert_eq!(keys, vec!["1", "3"]);
/// ```
#[derive(Clone)]
pub struct Schema {
    shape: Shape,
    primitive: ValidationPrimitive,
    name: Option<String>,
    message: Option<ErrorMessage>,
    steps: Vec<Step>,
    operations: IndexMap<String, Operation>,
}

impl Schema {
    fn build(shape: Shape, primitive: ValidationPrimitive, options: SchemaOptions) -> Self {
        let node = Self {
            shape,
            primitive,
            name: options.name,
            message: options.message,
            steps: Vec::new(),
            operations: IndexMap::new(),
        };
        registry::global().apply(node)
    }

    /// Creates a schema accepting strings.
    pub fn string() -> Self {
        Self::string_with(SchemaOptions::default())
    }

    pub fn string_with(options: SchemaOptions) -> Self {
        Self::build(Shape::Leaf, ValidationPrimitive::string(), options)
    }

    /// Creates a schema accepting numbers (`NaN` excluded).
    pub fn number() -> Self {
        Self::number_with(SchemaOptions::default())
    }

    pub fn number_with(options: SchemaOptions) -> Self {
        Self::build(Shape::Leaf, ValidationPrimitive::number(), options)
    }

    /// Creates a schema accepting booleans.
    pub fn boolean() -> Self {
        Self::boolean_with(SchemaOptions::default())
    }

    pub fn boolean_with(options: SchemaOptions) -> Self {
        Self::build(Shape::Leaf, ValidationPrimitive::boolean(), options)
    }

    /// Creates a schema accepting dates.
    pub fn date() -> Self {
        Self::date_with(SchemaOptions::default())
    }

    pub fn date_with(options: SchemaOptions) -> Self {
        Self::build(Shape::Leaf, ValidationPrimitive::date(), options)
    }

    /// Creates a schema accepting every value, `undefined` included.
    pub fn any() -> Self {
        Self::any_with(SchemaOptions::default())
    }

    pub fn any_with(options: SchemaOptions) -> Self {
        Self::build(Shape::Leaf, ValidationPrimitive::any(), options)
    }

    /// Creates a leaf schema of a caller-defined kind.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sift::{Schema, ValidationPrimitive, Value};
    ///
    /// let even = Schema::custom(ValidationPrimitive::custom("even", |v| {
    ///     v.as_f64().is_some_and(|n| n % 2.0 == 0.0)
    /// }));
    ///
    /// assert!(even.safe_parse(&Value::from(4)).is_success());
    /// assert_eq!(even.kind(), "even");
    /// ```
    pub fn custom(primitive: ValidationPrimitive) -> Self {
        Self::custom_with(primitive, SchemaOptions::default())
    }

    pub fn custom_with(primitive: ValidationPrimitive, options: SchemaOptions) -> Self {
        Self::build(Shape::Leaf, primitive, options)
    }

    /// Creates an object schema from an ordered field definition.
    ///
    /// Fields are parsed in declaration order. A field missing from the input
    /// is handed to its schema as `undefined`, so fields are required unless
    /// their schema accepts `undefined`. Undeclared input members are dropped
    /// from the output.
    pub fn object<I, K>(definition: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Self::object_with(definition, SchemaOptions::default())
    }

    pub fn object_with<I, K>(definition: I, options: SchemaOptions) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        let fields = definition
            .into_iter()
            .map(|(name, schema)| (name.into(), schema))
            .collect();
        Self::build(Shape::Object(fields), ValidationPrimitive::object(), options)
    }

    /// Creates an array schema whose elements all match `element`.
    pub fn array(element: Schema) -> Self {
        Self::array_with(element, SchemaOptions::default())
    }

    pub fn array_with(element: Schema, options: SchemaOptions) -> Self {
        Self::build(
            Shape::Array(Box::new(element)),
            ValidationPrimitive::array(),
            options,
        )
    }

    /// Creates a schema accepting one of a fixed set of strings.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sift::{Schema, Value};
    ///
    /// let role = Schema::enumeration(["admin", "user"]);
    /// assert!(role.safe_parse(&Value::from("admin")).is_success());
    ///
    /// let error = role.parse(&Value::from("root")).unwrap_err();
    /// assert_eq!(error.message, r#"The value "root" must be one of "admin" | "user"."#);
    /// ```
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::enumeration_with(values, SchemaOptions::default())
    }

    pub fn enumeration_with<I, S>(values: I, options: SchemaOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        let primitive = ValidationPrimitive::one_of_strings(values.clone());
        Self::build(Shape::Enum(values), primitive, options)
    }

    /// Creates a schema accepting exactly one value.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::literal_with(value, SchemaOptions::default())
    }

    pub fn literal_with(value: impl Into<Value>, options: SchemaOptions) -> Self {
        let value = value.into();
        let primitive = ValidationPrimitive::equals(value.clone());
        Self::build(Shape::Literal(value), primitive, options)
    }

    /// Creates a schema matching the first of `candidates` that accepts the value.
    ///
    /// Order matters: a looser candidate listed first shadows a stricter one.
    /// An empty candidate list rejects everything.
    ///
    /// The node's [`primitive`](Self::primitive) is not a cheap type test: its
    /// `check` runs each candidate's full pipeline, refinements and transforms
    /// included, with default parse options, and passes if any candidate does.
    pub fn union(candidates: Vec<Schema>) -> Self {
        Self::union_with(candidates, SchemaOptions::default())
    }

    pub fn union_with(candidates: Vec<Schema>, options: SchemaOptions) -> Self {
        // Runs whole candidate pipelines, not just their base kinds.
        let members = candidates.clone();
        let primitive = ValidationPrimitive::custom("union", move |v| {
            members.iter().any(|c| c.execute(v, ParseOptions::default()).is_success())
        });
        Self::build(Shape::Union(candidates), primitive, options)
    }

    /// Wraps `schema` so `f` rewrites the raw input before anything else runs.
    ///
    /// Unlike `transform`, which maps successful output, `preprocess` sees every
    /// input, valid or not.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sift::{Schema, Value};
    ///
    /// let schema = Schema::preprocess(
    ///     |v| match v.as_str().and_then(|s| s.parse::<f64>().ok()) {
    ///         Some(n) => Value::from(n),
    ///         None => v.clone(),
    ///     },
    ///     Schema::number(),
    /// );
    ///
    /// assert_eq!(schema.parse(&Value::from("42")).unwrap(), Value::from(42));
    /// ```
    pub fn preprocess<F>(f: F, schema: Schema) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        schema.push_step(Step::preprocess(f))
    }

    /// Parses `value`, returning the output or the representative error.
    pub fn parse(&self, value: &Value) -> Result<Value, ParseError> {
        self.parse_with(value, ParseOptions::default())
    }

    /// Parses `value` with explicit options.
    ///
    /// This is the only entry point that turns a failure into an `Err`.
    pub fn parse_with(&self, value: &Value, options: ParseOptions) -> Result<Value, ParseError> {
        match self.safe_parse_with(value, options) {
            Validation::Success(data) => Ok(data),
            Validation::Failure(errors) => Err(errors.into_iter().next().unwrap_or_else(|| {
                ParseError::new("parse failed without a reported error")
            })),
        }
    }

    /// Parses `value` and returns the full result without failing.
    pub fn safe_parse(&self, value: &Value) -> ParseResult {
        self.safe_parse_with(value, ParseOptions::default())
    }

    /// Parses `value` with explicit options and returns the full result.
    pub fn safe_parse_with(&self, value: &Value, options: ParseOptions) -> ParseResult {
        let result = self.execute(value, options);
        if let Validation::Failure(ref errors) = result {
            tracing::debug!(
                kind = self.kind(),
                key = errors.first().key().unwrap_or(""),
                errors = errors.len(),
                abort_early = options.abort_early,
                "parse failed"
            );
        }
        result
    }

    /// Runs the base check, any composite recursion, then every step.
    pub(crate) fn execute(&self, value: &Value, options: ParseOptions) -> ParseResult {
        pipeline::execute(self, value, options)
    }

    fn run_base(&self, value: &Value, options: ParseOptions) -> ParseResult {
        if let Shape::Union(candidates) = &self.shape {
            return combinators::parse_union(candidates, self.message.as_ref(), value, options);
        }
        if !self.primitive.check(value) {
            return Validation::Failure(ParseErrors::single(self.type_error(value)));
        }
        match &self.shape {
            Shape::Object(fields) => object::parse_fields(fields, value, options),
            Shape::Array(element) => array::parse_elements(element, value, options),
            _ => Validation::Success(value.clone()),
        }
    }

    fn type_error(&self, value: &Value) -> ParseError {
        let (code, default_message) = match &self.shape {
            Shape::Enum(values) => ("invalid_enum_value", enum_message(values, value)),
            Shape::Literal(expected) => (
                "invalid_literal",
                format!(
                    "The value \"{}\" must be exactly {}.",
                    value,
                    quoted(expected)
                ),
            ),
            _ => (
                "invalid_type",
                format!(
                    "The value \"{}\" must be type of {} but is type of \"{}\".",
                    value,
                    self.kind(),
                    value.type_name()
                ),
            ),
        };
        let message = self
            .message
            .as_ref()
            .map(|m| m.render(value))
            .unwrap_or(default_message);

        ParseError::new(message)
            .with_code(code)
            .with_expected(self.signature())
            .with_got(value.type_name())
    }

    pub(crate) fn push_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub(crate) fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub(crate) fn operations_mut(&mut self) -> &mut IndexMap<String, Operation> {
        &mut self.operations
    }

    pub(crate) fn operations(&self) -> &IndexMap<String, Operation> {
        &self.operations
    }

    /// The node's kind tag (`string`, `object`, `union`, or a custom kind).
    pub fn kind(&self) -> &str {
        self.primitive.kind()
    }

    /// The user-assigned name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The node's validation primitive.
    pub fn primitive(&self) -> &ValidationPrimitive {
        &self.primitive
    }

    /// Construction metadata, as handed to extensions.
    pub fn info(&self) -> NodeInfo {
        NodeInfo {
            name: self.name.clone(),
            kind: self.kind().to_string(),
            message: self.message.clone(),
        }
    }

    /// A short description: the node's name if set, otherwise its structure.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sift::Schema;
    ///
    /// let schema = Schema::union(vec![
    ///     Schema::string(),
    ///     Schema::array(Schema::number()),
    /// ]);
    /// assert_eq!(schema.signature(), "union<string | array<number>>");
    /// ```
    pub fn signature(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        match &self.shape {
            Shape::Leaf | Shape::Object(_) => self.kind().to_string(),
            Shape::Array(element) => format!("array<{}>", element.signature()),
            Shape::Enum(values) => format!(
                "enum<{}>",
                values
                    .iter()
                    .map(|v| format!("\"{}\"", v))
                    .collect::<Vec<_>>()
                    .join(" | ")
            ),
            Shape::Literal(value) => format!("literal<{}>", quoted(value)),
            Shape::Union(candidates) => format!("union<{}>", join_signatures(candidates)),
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("signature", &self.signature())
            .field("steps", &self.steps.len())
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .finish()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Schema>();
    assert_sync::<Schema>();
};

pub(crate) fn join_signatures(schemas: &[Schema]) -> String {
    schemas
        .iter()
        .map(Schema::signature)
        .collect::<Vec<_>>()
        .join(" | ")
}

fn enum_message(values: &[String], value: &Value) -> String {
    let allowed = values
        .iter()
        .map(|v| format!("\"{}\"", v))
        .collect::<Vec<_>>()
        .join(" | ");
    format!("The value \"{}\" must be one of {}.", value, allowed)
}

/// Strings in quotes, everything else as written.
fn quoted(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unwrap_failure(result: ParseResult) -> ParseErrors {
        result.into_result().unwrap_err()
    }

    #[test]
    fn test_default_type_message() {
        let errors = unwrap_failure(Schema::string().safe_parse(&Value::from(123)));
        assert_eq!(
            errors.first().message,
            r#"The value "123" must be type of string but is type of "number"."#
        );
        assert_eq!(errors.first().code, "invalid_type");
        assert!(errors.first().cause.is_none());
    }

    #[test]
    fn test_custom_message_function() {
        let schema = Schema::number_with(
            SchemaOptions::new().message(ErrorMessage::from_fn(|v| format!("{} is no number", v))),
        );
        let errors = unwrap_failure(schema.safe_parse(&Value::from("abc")));
        assert_eq!(errors.first().message, "abc is no number");
    }

    #[test]
    fn test_literal_message() {
        let errors = unwrap_failure(Schema::literal("on").safe_parse(&Value::from("off")));
        assert_eq!(
            errors.first().message,
            r#"The value "off" must be exactly "on"."#
        );
        assert_eq!(errors.first().code, "invalid_literal");
    }

    #[test]
    fn test_kind_and_name() {
        let schema = Schema::string_with(SchemaOptions::new().name("email"));
        assert_eq!(schema.kind(), "string");
        assert_eq!(schema.name(), Some("email"));
        assert_eq!(schema.signature(), "email");
        assert_eq!(Schema::object(Vec::<(String, Schema)>::new()).kind(), "object");
    }

    #[test]
    fn test_signatures() {
        assert_eq!(Schema::enumeration(["a", "b"]).signature(), r#"enum<"a" | "b">"#);
        assert_eq!(Schema::literal(0).signature(), "literal<0>");
        assert_eq!(Schema::literal("x").signature(), r#"literal<"x">"#);
        assert_eq!(Schema::array(Schema::date()).signature(), "array<date>");
    }

    #[test]
    fn test_parse_returns_data() {
        let value = Value::from(json!({"a": 1}));
        let schema = Schema::object([("a", Schema::number())]);
        assert_eq!(schema.parse(&value).unwrap(), value);
    }

    #[test]
    fn test_parse_error_carries_cause() {
        let schema = Schema::object([("a", Schema::object([("b", Schema::string())]))]);
        let error = schema
            .parse(&Value::from(json!({"a": {"b": 123}})))
            .unwrap_err();
        assert_eq!(error.key(), Some("a.b"));
        assert!(error.message.starts_with("a.b: "));
    }

    #[test]
    fn test_info_reflects_options() {
        let info = Schema::boolean_with(SchemaOptions::new().name("flag")).info();
        assert_eq!(info.kind, "boolean");
        assert_eq!(info.name.as_deref(), Some("flag"));
        assert!(info.message.is_none());
    }
}
