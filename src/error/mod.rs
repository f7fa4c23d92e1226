//! Error types for parse failures.
//!
//! This module provides types for representing parse failures with their
//! path, message and expected/actual values.

mod parse_error;

pub use parse_error::{ErrorCause, ParseError, ParseErrors};
