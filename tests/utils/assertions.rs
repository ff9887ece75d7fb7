use axum::http::StatusCode;
use serde_json::{json, Value};

// ============================================================================
// Response assertions
// ============================================================================

#[allow(dead_code)]
pub fn assert_error(response: (StatusCode, Value), status: StatusCode, message: &str) {
    assert_eq!(response.0, status, "unexpected status, body: {}", response.1);
    assert_eq!(response.1, json!({ "error": message }));
}

#[allow(dead_code)]
pub fn assert_message(response: (StatusCode, Value), status: StatusCode, message: &str) {
    assert_eq!(response.0, status, "unexpected status, body: {}", response.1);
    assert_eq!(response.1, json!({ "message": message }));
}
