//! Union matching.
//!
//! A union tries its candidates in declaration order and takes the output of
//! the first one that succeeds, transforms and defaults included. When none
//! match, the candidates' own errors are discarded in favor of one summary
//! error naming every candidate.

use stillwater::Validation;

use super::{join_signatures, Schema};
use crate::error::{ParseError, ParseErrors};
use crate::options::{ErrorMessage, ParseOptions};
use crate::value::Value;
use crate::ParseResult;

/// Validates a value against the first matching candidate.
///
/// Short-circuits on the first match. Returns failure only if none match.
pub(super) fn parse_union(
    candidates: &[Schema],
    message: Option<&ErrorMessage>,
    value: &Value,
    options: ParseOptions,
) -> ParseResult {
    for (index, candidate) in candidates.iter().enumerate() {
        match candidate.execute(value, options) {
            Validation::Success(data) => return Validation::Success(data),
            Validation::Failure(errors) => {
                tracing::trace!(
                    index,
                    candidate = %candidate.signature(),
                    reason = errors.first().reason(),
                    "union candidate rejected value"
                );
            }
        }
    }

    Validation::Failure(ParseErrors::single(no_match_error(candidates, message, value)))
}

fn no_match_error(candidates: &[Schema], message: Option<&ErrorMessage>, value: &Value) -> ParseError {
    let expected = if candidates.is_empty() {
        "(no candidates)".to_string()
    } else {
        join_signatures(candidates)
    };
    let message = match message {
        Some(message) => message.render(value),
        None => format!(
            "The value \"{}\" of type \"{}\" does not match any of: {}.",
            value,
            value.type_name(),
            expected
        ),
    };

    ParseError::new(message)
        .with_code("union_no_match")
        .with_expected(expected)
        .with_got(value.type_name())
}
