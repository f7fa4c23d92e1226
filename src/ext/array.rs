//! Array refinements: item counts and uniqueness.

use std::collections::HashMap;

use crate::options::ErrorMessage;
use crate::schema::Schema;
use crate::value::Value;

/// Array checks for [`Schema`].
///
/// A check applied to a value that is not an array fails.
pub trait ArrayExt: Sized {
    /// Requires at least `min` items.
    fn min_items(self, min: usize) -> Self;

    /// Requires at most `max` items.
    fn max_items(self, max: usize) -> Self;

    fn non_empty(self) -> Self;

    /// Requires every item to be distinct.
    fn unique(self) -> Self;

    /// Requires the key produced by `key_fn` to be distinct across items.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sift::ext::ArrayExt;
    /// use sift::{Schema, Value};
    /// use serde_json::json;
    ///
    /// let users = Schema::array(Schema::object([("id", Schema::number())]))
    ///     .unique_by(|user| user.get("id").clone());
    ///
    /// let input = Value::from(json!([{"id": 1}, {"id": 2}, {"id": 1}]));
    /// assert!(users.safe_parse(&input).is_failure());
    /// ```
    fn unique_by<F>(self, key_fn: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static;
}

fn item_count(value: &Value) -> Option<usize> {
    value.as_array().map(Vec::len)
}

/// Folds `-0` into `0` at any depth so both spellings compare equal.
fn comparable(value: Value) -> Value {
    match value {
        Value::Number(n) if n == 0.0 => Value::Number(0.0),
        Value::Array(items) => Value::Array(items.into_iter().map(comparable).collect()),
        Value::Object(members) => Value::Object(
            members
                .into_iter()
                .map(|(key, member)| (key, comparable(member)))
                .collect(),
        ),
        other => other,
    }
}

/// Groups item indices by key, keeping only keys seen more than once.
fn find_duplicates<F>(items: &[Value], key_fn: F) -> Vec<Vec<usize>>
where
    F: Fn(&Value) -> Value,
{
    let mut seen: HashMap<String, Vec<usize>> = HashMap::new();
    let mut order = Vec::new();

    for (index, item) in items.iter().enumerate() {
        let key = format!("{:?}", comparable(key_fn(item)));
        let indices = seen.entry(key.clone()).or_default();
        if indices.is_empty() {
            order.push(key);
        }
        indices.push(index);
    }

    order
        .into_iter()
        .filter_map(|key| seen.remove(&key))
        .filter(|indices| indices.len() > 1)
        .collect()
}

fn has_duplicates<F>(value: &Value, key_fn: F) -> bool
where
    F: Fn(&Value) -> Value,
{
    value
        .as_array()
        .is_some_and(|items| !find_duplicates(items, key_fn).is_empty())
}

fn duplicates_message<F>(value: &Value, key_fn: F) -> String
where
    F: Fn(&Value) -> Value,
{
    let groups = value
        .as_array()
        .map(|items| find_duplicates(items, key_fn))
        .unwrap_or_default();
    format!("The array contains duplicate items at indices {:?}.", groups)
}

impl ArrayExt for Schema {
    fn min_items(self, min: usize) -> Self {
        self.refine_with(
            move |v| item_count(v).is_some_and(|n| n >= min),
            ErrorMessage::from_fn(move |v| {
                format!(
                    "The array must have at least {} items, got {}.",
                    min,
                    item_count(v).unwrap_or(0)
                )
            }),
        )
    }

    fn max_items(self, max: usize) -> Self {
        self.refine_with(
            move |v| item_count(v).is_some_and(|n| n <= max),
            ErrorMessage::from_fn(move |v| {
                format!(
                    "The array must have at most {} items, got {}.",
                    max,
                    item_count(v).unwrap_or(0)
                )
            }),
        )
    }

    fn non_empty(self) -> Self {
        self.refine_with(
            |v| item_count(v).is_some_and(|n| n > 0),
            "The array must not be empty.",
        )
    }

    fn unique(self) -> Self {
        self.refine_output_with(
            |v| !has_duplicates(v, Value::clone),
            ErrorMessage::from_fn(|v| duplicates_message(v, Value::clone)),
        )
    }

    fn unique_by<F>(self, key_fn: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        let key_fn = std::sync::Arc::new(key_fn);
        let message_key = std::sync::Arc::clone(&key_fn);
        self.refine_output_with(
            move |v| !has_duplicates(v, |item| key_fn(item)),
            ErrorMessage::from_fn(move |v| duplicates_message(v, |item| message_key(item))),
        )
    }
}
