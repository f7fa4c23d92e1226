//! String refinements: length bounds, patterns, formats and case transforms.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::options::ErrorMessage;
use crate::schema::Schema;
use crate::value::Value;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

/// String checks for [`Schema`].
///
/// Lengths count Unicode scalar values, not bytes. A check applied to a value
/// that is not a string fails.
pub trait StringExt: Sized {
    /// Requires at least `min` characters.
    fn min_len(self, min: usize) -> Self;

    /// Requires at most `max` characters.
    fn max_len(self, max: usize) -> Self;

    /// Requires exactly `len` characters.
    fn length(self, len: usize) -> Self;

    /// Requires a match of `pattern` anywhere in the string.
    ///
    /// # Errors
    ///
    /// Returns the regex error if `pattern` does not compile.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sift::ext::StringExt;
    /// use sift::{Schema, Value};
    ///
    /// let digits = Schema::string().pattern(r"^\d+$").unwrap();
    /// assert!(digits.safe_parse(&Value::from("123")).is_success());
    /// assert!(digits.safe_parse(&Value::from("12a")).is_failure());
    ///
    /// assert!(Schema::string().pattern("[invalid").is_err());
    /// ```
    fn pattern(self, pattern: &str) -> Result<Self, regex::Error>;

    fn email(self) -> Self;

    /// Requires an `http` or `https` URL.
    fn url(self) -> Self;

    fn uuid(self) -> Self;

    fn starts_with(self, prefix: impl Into<String>) -> Self;

    fn ends_with(self, suffix: impl Into<String>) -> Self;

    /// Strips leading and trailing whitespace from the output.
    fn trim(self) -> Self;

    fn to_lowercase(self) -> Self;

    fn to_uppercase(self) -> Self;
}

fn char_count(value: &Value) -> Option<usize> {
    value.as_str().map(|s| s.chars().count())
}

fn map_str(value: Value, f: impl Fn(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(&s)),
        other => other,
    }
}

fn format_check(schema: Schema, regex: &'static Lazy<Regex>, format: &'static str) -> Schema {
    schema.refine_with(
        move |v| v.as_str().is_some_and(|s| regex.is_match(s)),
        ErrorMessage::from_fn(move |v| {
            format!("The value \"{}\" must be a valid {}.", v, format)
        }),
    )
}

impl StringExt for Schema {
    fn min_len(self, min: usize) -> Self {
        self.refine_with(
            move |v| char_count(v).is_some_and(|len| len >= min),
            ErrorMessage::from_fn(move |v| {
                format!("The value \"{}\" must be at least {} characters long.", v, min)
            }),
        )
    }

    fn max_len(self, max: usize) -> Self {
        self.refine_with(
            move |v| char_count(v).is_some_and(|len| len <= max),
            ErrorMessage::from_fn(move |v| {
                format!("The value \"{}\" must be at most {} characters long.", v, max)
            }),
        )
    }

    fn length(self, len: usize) -> Self {
        self.refine_with(
            move |v| char_count(v) == Some(len),
            ErrorMessage::from_fn(move |v| {
                format!("The value \"{}\" must be exactly {} characters long.", v, len)
            }),
        )
    }

    fn pattern(self, pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        let source = pattern.to_string();
        Ok(self.refine_with(
            move |v| v.as_str().is_some_and(|s| regex.is_match(s)),
            ErrorMessage::from_fn(move |v| {
                format!("The value \"{}\" must match pattern '{}'.", v, source)
            }),
        ))
    }

    fn email(self) -> Self {
        format_check(self, &EMAIL_REGEX, "email address")
    }

    fn url(self) -> Self {
        format_check(self, &URL_REGEX, "URL")
    }

    fn uuid(self) -> Self {
        format_check(self, &UUID_REGEX, "UUID")
    }

    fn starts_with(self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let shown = prefix.clone();
        self.refine_with(
            move |v| v.as_str().is_some_and(|s| s.starts_with(prefix.as_str())),
            ErrorMessage::from_fn(move |v| {
                format!("The value \"{}\" must start with \"{}\".", v, shown)
            }),
        )
    }

    fn ends_with(self, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        let shown = suffix.clone();
        self.refine_with(
            move |v| v.as_str().is_some_and(|s| s.ends_with(suffix.as_str())),
            ErrorMessage::from_fn(move |v| {
                format!("The value \"{}\" must end with \"{}\".", v, shown)
            }),
        )
    }

    fn trim(self) -> Self {
        self.transform(|v| map_str(v, |s| s.trim().to_string()))
    }

    fn to_lowercase(self) -> Self {
        self.transform(|v| map_str(v, str::to_lowercase))
    }

    fn to_uppercase(self) -> Self {
        self.transform(|v| map_str(v, str::to_uppercase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrors;
    use crate::ParseResult;

    fn unwrap_success(result: ParseResult) -> Value {
        result.into_result().unwrap()
    }

    fn unwrap_failure(result: ParseResult) -> ParseErrors {
        result.into_result().unwrap_err()
    }

    #[test]
    fn test_min_len_constraint() {
        let schema = Schema::string().min_len(3);

        assert!(schema.safe_parse(&Value::from("abc")).is_success());
        let errors = unwrap_failure(schema.safe_parse(&Value::from("ab")));
        assert_eq!(errors.first().code, "refinement");
        assert_eq!(
            errors.first().message,
            r#"The value "ab" must be at least 3 characters long."#
        );
    }

    #[test]
    fn test_max_len_constraint() {
        let schema = Schema::string().max_len(5);
        assert!(schema.safe_parse(&Value::from("hello")).is_success());
        assert!(schema.safe_parse(&Value::from("hello!")).is_failure());
    }

    #[test]
    fn test_unicode_length() {
        let schema = Schema::string().length(2);
        assert!(schema.safe_parse(&Value::from("日本")).is_success());
        assert!(schema.safe_parse(&Value::from("abc")).is_failure());
    }

    #[test]
    fn test_pattern_error_includes_pattern() {
        let schema = Schema::string().pattern(r"^\d+$").unwrap();
        let errors = unwrap_failure(schema.safe_parse(&Value::from("abc")));
        assert!(errors.first().message.contains(r"^\d+$"));
    }

    #[test]
    fn test_invalid_regex_pattern() {
        assert!(Schema::string().pattern("[unclosed").is_err());
    }

    #[test]
    fn test_formats() {
        let email = Schema::string().email();
        assert!(email.safe_parse(&Value::from("ann@example.com")).is_success());
        assert!(email.safe_parse(&Value::from("ann@")).is_failure());

        let url = Schema::string().url();
        assert!(url.safe_parse(&Value::from("https://example.com/a")).is_success());
        assert!(url.safe_parse(&Value::from("ftp://example.com")).is_failure());

        let uuid = Schema::string().uuid();
        assert!(uuid
            .safe_parse(&Value::from("123e4567-e89b-12d3-a456-426614174000"))
            .is_success());
        assert!(uuid.safe_parse(&Value::from("123e4567")).is_failure());
    }

    #[test]
    fn test_affixes() {
        let schema = Schema::string().starts_with("sk_").ends_with("_live");
        assert!(schema.safe_parse(&Value::from("sk_123_live")).is_success());
        assert!(schema.safe_parse(&Value::from("pk_123_live")).is_failure());
        assert!(schema.safe_parse(&Value::from("sk_123_test")).is_failure());
    }

    #[test]
    fn test_trim_runs_before_later_checks() {
        let schema = Schema::string().trim().min_len(3);
        assert_eq!(unwrap_success(schema.safe_parse(&Value::from("  abc  "))), Value::from("abc"));
        assert!(schema.safe_parse(&Value::from("  ab  ")).is_failure());
    }

    #[test]
    fn test_case_transforms() {
        let lower = Schema::string().to_lowercase();
        assert_eq!(unwrap_success(lower.safe_parse(&Value::from("MiXeD"))), Value::from("mixed"));

        let upper = Schema::string().to_uppercase();
        assert_eq!(unwrap_success(upper.safe_parse(&Value::from("MiXeD"))), Value::from("MIXED"));
    }
}
