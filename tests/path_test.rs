//! Integration tests for ErrorPath.

use serde_json::json;
use sift::{ErrorPath, ParseOptions, PathSegment, Schema, Value};

#[test]
fn test_path_construction_and_display() {
    assert_eq!(ErrorPath::root().to_string(), "");
    assert_eq!(ErrorPath::root().prepend_field("name").to_string(), "name");
    assert_eq!(ErrorPath::root().prepend_index(0).to_string(), "0");

    let path = ErrorPath::root()
        .prepend_field("city")
        .prepend_field("address")
        .prepend_index(0)
        .prepend_field("users");
    assert_eq!(path.to_string(), "users.0.address.city");
}

#[test]
fn test_path_segments_preserved() {
    let path = ErrorPath::root()
        .prepend_field("value")
        .prepend_index(42)
        .prepend_field("data");

    let segments: Vec<_> = path.segments().cloned().collect();
    assert_eq!(
        segments,
        vec![
            PathSegment::field("data"),
            PathSegment::index(42),
            PathSegment::field("value"),
        ]
    );
}

#[test]
fn test_error_path_matches_structure() {
    let schema = Schema::object([(
        "matrix",
        Schema::array(Schema::array(Schema::number())),
    )]);
    let error = schema
        .parse(&Value::from(json!({"matrix": [[1], [2, "x"]]})))
        .unwrap_err();

    let segments: Vec<_> = error.path().segments().cloned().collect();
    assert_eq!(
        segments,
        vec![
            PathSegment::field("matrix"),
            PathSegment::index(1),
            PathSegment::index(1),
        ]
    );
    assert_eq!(error.key(), Some("matrix.1.1"));
}

#[test]
fn test_field_names_with_dots_are_not_split() {
    let schema = Schema::object([("a.b", Schema::string())]);
    let errors = schema
        .safe_parse_with(&Value::from(json!({"a.b": 1})), ParseOptions::collect_all())
        .into_result()
        .unwrap_err();

    assert_eq!(errors.first().key(), Some("a.b"));
    assert_eq!(errors.first().path().len(), 1);
}
