//! Extension registry for construction-time schema hooks.
//!
//! An extension is a callback run on every schema node as it is constructed.
//! It receives the freshly built node, the node's [`ValidationPrimitive`] and
//! its [`NodeInfo`], and returns the node to hand back to the caller, usually
//! the same node with extra named operations or refinements attached.
//!
//! Extensions registered on the process-wide registry through [`extend`]
//! apply to nodes constructed afterwards; nodes that already exist are never
//! revisited. Once [`seal_extensions`] has been called, further registrations
//! are rejected.
//!
//! # Example
//!
//! ```rust
//! use sift::{ExtensionRegistry, Schema, Value};
//!
//! let registry = ExtensionRegistry::new();
//! registry
//!     .extend(|schema, _, info| {
//!         if info.kind == "number" {
//!             schema.with_operation("positive", |schema, _| {
//!                 Ok(schema.refine(|v| v.as_f64().is_some_and(|n| n > 0.0)))
//!             })
//!         } else {
//!             schema
//!         }
//!     })
//!     .unwrap();
//!
//! let schema = registry.apply(Schema::number()).invoke("positive", &[]).unwrap();
//! assert!(schema.safe_parse(&Value::from(-1)).is_failure());
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::options::ErrorMessage;
use crate::primitive::ValidationPrimitive;
use crate::schema::Schema;
use crate::value::Value;

/// Construction metadata handed to extensions.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub name: Option<String>,
    pub kind: String,
    pub message: Option<ErrorMessage>,
}

/// A construction-time hook.
pub type Extension = Arc<dyn Fn(Schema, &ValidationPrimitive, &NodeInfo) -> Schema + Send + Sync>;

/// A named operation attached to a node by an extension.
pub type Operation = Arc<dyn Fn(Schema, &[Value]) -> Result<Schema, ExtensionError> + Send + Sync>;

struct RegistryState {
    extensions: Vec<Extension>,
    sealed: bool,
}

/// A thread-safe, ordered list of extensions.
///
/// # Thread Safety
///
/// Registration takes the write lock; applying extensions copies the current
/// list under the read lock and runs the callbacks with no lock held, so a
/// callback may itself construct schemas.
pub struct ExtensionRegistry {
    state: RwLock<RegistryState>,
}

static GLOBAL: ExtensionRegistry = ExtensionRegistry::new();

/// The process-wide registry every schema constructor consults.
pub(crate) fn global() -> &'static ExtensionRegistry {
    &GLOBAL
}

/// Registers an extension on the process-wide registry.
///
/// # Errors
///
/// Returns `ExtensionError::Sealed` after [`seal_extensions`] has been called.
pub fn extend<F>(extension: F) -> Result<(), ExtensionError>
where
    F: Fn(Schema, &ValidationPrimitive, &NodeInfo) -> Schema + Send + Sync + 'static,
{
    GLOBAL.extend(extension)
}

/// Seals the process-wide registry. Idempotent.
pub fn seal_extensions() {
    GLOBAL.seal();
}

impl ExtensionRegistry {
    /// Creates an empty, unsealed registry.
    pub const fn new() -> Self {
        Self {
            state: parking_lot::const_rwlock(RegistryState {
                extensions: Vec::new(),
                sealed: false,
            }),
        }
    }

    /// Appends an extension. Extensions run in registration order.
    ///
    /// # Errors
    ///
    /// Returns `ExtensionError::Sealed` if the registry has been sealed.
    pub fn extend<F>(&self, extension: F) -> Result<(), ExtensionError>
    where
        F: Fn(Schema, &ValidationPrimitive, &NodeInfo) -> Schema + Send + Sync + 'static,
    {
        let mut state = self.state.write();
        if state.sealed {
            tracing::warn!("rejected extension registration on sealed registry");
            return Err(ExtensionError::Sealed);
        }
        state.extensions.push(Arc::new(extension));
        tracing::debug!(count = state.extensions.len(), "registered schema extension");
        Ok(())
    }

    /// Rejects all further registrations.
    pub fn seal(&self) {
        let mut state = self.state.write();
        if !state.sealed {
            state.sealed = true;
            tracing::info!(count = state.extensions.len(), "sealed extension registry");
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.state.read().sealed
    }

    /// Returns the number of registered extensions.
    pub fn len(&self) -> usize {
        self.state.read().extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs every registered extension over `schema`, in registration order.
    pub fn apply(&self, schema: Schema) -> Schema {
        let extensions = self.state.read().extensions.clone();
        if extensions.is_empty() {
            return schema;
        }

        let primitive = schema.primitive().clone();
        let info = schema.info();
        extensions
            .iter()
            .fold(schema, |schema, extension| extension(schema, &primitive, &info))
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("ExtensionRegistry")
            .field("extensions", &state.extensions.len())
            .field("sealed", &state.sealed)
            .finish()
    }
}

impl Schema {
    /// Attaches a named operation, replacing any existing one with that name.
    pub fn with_operation<F>(mut self, name: impl Into<String>, operation: F) -> Self
    where
        F: Fn(Schema, &[Value]) -> Result<Schema, ExtensionError> + Send + Sync + 'static,
    {
        self.operations_mut().insert(name.into(), Arc::new(operation));
        self
    }

    pub fn has_operation(&self, name: &str) -> bool {
        self.operations().contains_key(name)
    }

    /// Names of the attached operations, in attachment order.
    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations().keys().map(String::as_str)
    }

    /// Invokes a named operation with `args`, returning the resulting node.
    ///
    /// # Errors
    ///
    /// Returns `ExtensionError::UnknownOperation` if no operation of that name
    /// is attached, or whatever error the operation itself reports.
    pub fn invoke(self, name: &str, args: &[Value]) -> Result<Schema, ExtensionError> {
        let operation = self
            .operations()
            .get(name)
            .cloned()
            .ok_or_else(|| ExtensionError::UnknownOperation {
                name: name.to_string(),
                kind: self.kind().to_string(),
            })?;
        operation(self, args)
    }
}

/// Errors that can occur during extension operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtensionError {
    /// Attempted to register an extension after sealing.
    #[error("extension registry is sealed")]
    Sealed,

    /// Attempted to invoke an operation the node does not carry.
    #[error("no operation '{name}' on {kind} schema")]
    UnknownOperation { name: String, kind: String },

    /// An operation rejected its arguments.
    #[error("invalid arguments for '{operation}': {reason}")]
    InvalidArguments { operation: String, reason: String },
}

impl ExtensionError {
    pub fn invalid_arguments(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        ExtensionError::InvalidArguments {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ExtensionRegistry>();
    assert_sync::<ExtensionRegistry>();
};
