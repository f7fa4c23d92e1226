//! Field-by-field descent for object schemas.

use indexmap::IndexMap;
use stillwater::Validation;

use super::Schema;
use crate::error::{ParseError, ParseErrors};
use crate::options::ParseOptions;
use crate::path::PathSegment;
use crate::value::Value;
use crate::ParseResult;

/// Parses each declared field of `value` with its schema.
///
/// The output holds only declared fields, in declaration order. A field whose
/// schema produced `undefined` is left out. Under abort-early the first failing
/// field ends the descent; otherwise every field is visited and all failures are
/// returned in field order.
pub(super) fn parse_fields(
    fields: &IndexMap<String, Schema>,
    value: &Value,
    options: ParseOptions,
) -> ParseResult {
    let mut output = IndexMap::with_capacity(fields.len());
    let mut errors: Vec<ParseError> = Vec::new();

    for (name, schema) in fields {
        match schema.execute(value.get(name), options) {
            Validation::Success(data) => {
                if !data.is_undefined() {
                    output.insert(name.clone(), data);
                }
            }
            Validation::Failure(field_errors) => {
                let field_errors = field_errors.prefixed(&PathSegment::field(name.as_str()));
                if options.abort_early {
                    return Validation::Failure(field_errors);
                }
                errors.extend(field_errors);
            }
        }
    }

    if errors.is_empty() {
        Validation::Success(Value::Object(output))
    } else {
        Validation::Failure(ParseErrors::from_vec(errors))
    }
}
