//! Tests for error codes and payload formatting.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case::not_found(Error::not_found("Category", "42"), ErrorCode::NotFound)]
#[case::validation(Error::validation("bad"), ErrorCode::Validation)]
#[case::policy(Error::policy("sold"), ErrorCode::Policy)]
fn constructors_set_codes(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn not_found_message_names_entity_and_identifier() {
    let error = Error::not_found("Category", "women");
    assert_eq!(
        error.to_string(),
        "Category with identifier women not found"
    );
    assert!(error.is_not_found());
}

#[rstest]
fn serialises_to_code_and_message() {
    let error = Error::policy("Product has been sold");
    let value = serde_json::to_value(&error).expect("serialise error");
    assert_eq!(
        value,
        json!({ "code": "policy", "message": "Product has been sold" })
    );
}

#[rstest]
fn payload_round_trips_through_json() {
    let payload = ErrorPayload::from(&Error::validation("Limit must be between 1 and 100"));
    let text = serde_json::to_string(&payload).expect("serialise payload");
    let decoded: ErrorPayload = serde_json::from_str(&text).expect("deserialise payload");
    assert_eq!(decoded, payload);
}
