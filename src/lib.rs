//! # Sift
//!
//! A runtime schema engine that validates dynamic values and transforms them
//! into trusted output.
//!
//! ## Overview
//!
//! Schemas are built from leaf types (string, number, boolean, date, enum,
//! literal) and composites (object, array, union), then refined with chainable
//! modifiers: `optional`, `nullable`, `nullish`, `default`, `transform`, `pipe`
//! and `refine`. Parsing either returns the transformed output or an ordered
//! list of errors, each carrying a dotted key such as `address.city` or
//! `tags.2`.
//!
//! By default a parse stops at the first failure. Pass
//! [`ParseOptions::collect_all`] to visit every field and element and report all
//! failures, accumulated through stillwater's `Validation` type.
//!
//! ## Core Types
//!
//! - [`Schema`]: a schema node and the entry point for building and parsing
//! - [`Value`]: the dynamic input and output type, distinguishing `undefined` from `null`
//! - [`ParseError`]: a single failure with message, code and key
//! - [`ParseErrors`]: a non-empty, ordered collection of failures
//! - [`ExtensionRegistry`]: construction-time hooks that decorate new nodes
//!
//! ## Example
//!
//! ```rust
//! use sift::{ParseOptions, Schema, Value};
//! use serde_json::json;
//!
//! let user = Schema::object([
//!     ("name", Schema::string()),
//!     ("role", Schema::enumeration(["admin", "user"]).default("user")),
//!     ("tags", Schema::array(Schema::string()).optional()),
//! ]);
//!
//! let data = user.parse(&Value::from(json!({"name": "Ann"}))).unwrap();
//! assert_eq!(data.to_json(), json!({"name": "Ann", "role": "user"}));
//!
//! let input = Value::from(json!({"name": 1, "tags": ["a", 2]}));
//! let errors = user
//!     .safe_parse_with(&input, ParseOptions::collect_all())
//!     .into_result()
//!     .unwrap_err();
//! let keys: Vec<_> = errors.iter().map(|e| e.key().unwrap()).collect();
//! assert_eq!(keys, vec!["name", "tags.1"]);
//! ```

pub mod error;
pub mod ext;
pub mod options;
pub mod path;
pub mod primitive;
pub mod registry;
pub mod schema;
pub mod value;

pub use error::{ErrorCause, ParseError, ParseErrors};
pub use options::{ErrorMessage, MessageFn, ParseOptions, SchemaOptions};
pub use path::{ErrorPath, PathSegment};
pub use primitive::ValidationPrimitive;
pub use registry::{
    extend, seal_extensions, Extension, ExtensionError, ExtensionRegistry, NodeInfo, Operation,
};
pub use schema::Schema;
pub use value::Value;

/// Outcome of a non-throwing parse: the output or every reported error.
pub type ParseResult = stillwater::Validation<Value, ParseErrors>;
