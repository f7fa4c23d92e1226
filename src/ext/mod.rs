//! Ready-made refinements and transforms.
//!
//! These traits add common checks to [`Schema`](crate::Schema) using nothing
//! but [`refine_with`](crate::Schema::refine_with) and
//! [`transform`](crate::Schema::transform), so they compose with every other
//! modifier in attachment order. Each check reports code `refinement`.
//!
//! ```rust
//! use sift::ext::{NumberExt, StringExt};
//! use sift::{Schema, Value};
//!
//! let username = Schema::string().trim().min_len(3).max_len(20);
//! assert!(username.safe_parse(&Value::from("  ann  ")).is_success());
//!
//! let age = Schema::number().int().non_negative();
//! assert!(age.safe_parse(&Value::from(4.5)).is_failure());
//! ```

mod array;
mod number;
mod string;

pub use array::ArrayExt;
pub use number::NumberExt;
pub use string::StringExt;
