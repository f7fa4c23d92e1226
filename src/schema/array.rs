//! Element-by-element descent for array schemas.

use stillwater::Validation;

use super::Schema;
use crate::error::{ParseError, ParseErrors};
use crate::options::ParseOptions;
use crate::path::PathSegment;
use crate::value::Value;
use crate::ParseResult;

/// Parses every element of `value` with `element`, preserving length and order.
pub(super) fn parse_elements(element: &Schema, value: &Value, options: ParseOptions) -> ParseResult {
    let items = match value {
        Value::Array(items) => items,
        other => return Validation::Success(other.clone()),
    };

    let mut output = Vec::with_capacity(items.len());
    let mut errors: Vec<ParseError> = Vec::new();

    for (index, item) in items.iter().enumerate() {
        match element.execute(item, options) {
            Validation::Success(data) => output.push(data),
            Validation::Failure(item_errors) => {
                let item_errors = item_errors.prefixed(&PathSegment::index(index));
                if options.abort_early {
                    return Validation::Failure(item_errors);
                }
                errors.extend(item_errors);
            }
        }
    }

    if errors.is_empty() {
        Validation::Success(Value::Array(output))
    } else {
        Validation::Failure(ParseErrors::from_vec(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_array_succeeds() {
        let schema = Schema::array(Schema::number());
        let data = schema.safe_parse(&Value::from(json!([]))).into_result().unwrap();
        assert_eq!(data, Value::Array(vec![]));
    }

    #[test]
    fn test_element_transform_applies() {
        let schema = Schema::array(Schema::number().transform(|v| {
            Value::from(v.as_f64().unwrap_or_default() * 2.0)
        }));
        let data = schema
            .safe_parse(&Value::from(json!([1, 2, 3])))
            .into_result()
            .unwrap();
        assert_eq!(data.to_json(), json!([2, 4, 6]));
    }

    #[test]
    fn test_optional_elements_keep_their_slot() {
        let schema = Schema::array(Schema::number().optional());
        let input = Value::Array(vec![Value::from(1), Value::Undefined, Value::from(3)]);
        let data = schema.safe_parse(&input).into_result().unwrap();
        assert_eq!(data.as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_collect_all_reports_each_index() {
        let schema = Schema::array(Schema::number());
        let errors = schema
            .safe_parse_with(&Value::from(json!([1, "two", 3, "four"])), ParseOptions::collect_all())
            .into_result()
            .unwrap_err();
        let keys: Vec<_> = errors.iter().map(|e| e.key().unwrap()).collect();
        assert_eq!(keys, vec!["1", "3"]);
    }

    #[test]
    fn test_abort_early_reports_first_index() {
        let schema = Schema::array(Schema::number());
        let errors = schema
            .safe_parse(&Value::from(json!([1, "two", 3, "four"])))
            .into_result()
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().key(), Some("1"));
    }
}
