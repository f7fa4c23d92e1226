//! Numeric refinements.

use crate::options::ErrorMessage;
use crate::schema::Schema;
use crate::value::Value;

// Tolerance for `multiple_of`, in units of the divisor, so 0.3 counts as a
// multiple of 0.1.
const MULTIPLE_EPSILON: f64 = 1e-9;

/// Numeric checks for [`Schema`].
///
/// Bounds are inclusive. A check applied to a value that is not a number fails.
pub trait NumberExt: Sized {
    fn min(self, min: f64) -> Self;

    fn max(self, max: f64) -> Self;

    /// Requires an integral value.
    fn int(self) -> Self;

    /// Requires a value greater than zero.
    fn positive(self) -> Self;

    /// Requires a value greater than or equal to zero.
    fn non_negative(self) -> Self;

    /// Requires a value less than zero.
    fn negative(self) -> Self;

    /// Requires a multiple of `divisor`, within floating-point tolerance.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sift::ext::NumberExt;
    /// use sift::{Schema, Value};
    ///
    /// let cents = Schema::number().multiple_of(0.01);
    /// assert!(cents.safe_parse(&Value::from(19.99)).is_success());
    /// assert!(cents.safe_parse(&Value::from(19.995)).is_failure());
    /// ```
    fn multiple_of(self, divisor: f64) -> Self;
}

fn number_check<P>(schema: Schema, predicate: P, requirement: String) -> Schema
where
    P: Fn(f64) -> bool + Send + Sync + 'static,
{
    schema.refine_with(
        move |v| v.as_f64().is_some_and(&predicate),
        ErrorMessage::from_fn(move |v: &Value| format!("The value \"{}\" must be {}.", v, requirement)),
    )
}

fn is_multiple_of(n: f64, divisor: f64) -> bool {
    if divisor == 0.0 || !divisor.is_finite() {
        return false;
    }
    let remainder = n - (n / divisor).round() * divisor;
    let tolerance = (MULTIPLE_EPSILON * divisor.abs()).max(4.0 * f64::EPSILON * n.abs());
    remainder.abs() <= tolerance
}

impl NumberExt for Schema {
    fn min(self, min: f64) -> Self {
        number_check(self, move |n| n >= min, format!("at least {}", Value::from(min)))
    }

    fn max(self, max: f64) -> Self {
        number_check(self, move |n| n <= max, format!("at most {}", Value::from(max)))
    }

    fn int(self) -> Self {
        number_check(
            self,
            |n| n.is_finite() && n.fract() == 0.0,
            "an integer".to_string(),
        )
    }

    fn positive(self) -> Self {
        number_check(self, |n| n > 0.0, "positive".to_string())
    }

    fn non_negative(self) -> Self {
        number_check(self, |n| n >= 0.0, "non-negative".to_string())
    }

    fn negative(self) -> Self {
        number_check(self, |n| n < 0.0, "negative".to_string())
    }

    fn multiple_of(self, divisor: f64) -> Self {
        number_check(
            self,
            move |n| is_multiple_of(n, divisor),
            format!("a multiple of {}", Value::from(divisor)),
        )
    }
}
