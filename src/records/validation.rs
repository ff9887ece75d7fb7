use serde_json::{Map, Value};

use crate::shared::AppError;

/// A field counts as provided when it is truthy or numerically zero.
/// `null`, `""`, `[]` and `{}` are missing; `false`, `0` and `0.0` are provided.
pub fn is_provided(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Bool(_)) | Some(Value::Number(_)) => true,
    }
}

/// Fails with `Missing fields: a, b` listing every absent field in the
/// requested order
pub fn require_fields(payload: &Map<String, Value>, fields: &[&str]) -> Result<(), AppError> {
    let missing: Vec<&str> = fields
        .iter()
        .copied()
        .filter(|field| !is_provided(payload.get(*field)))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Missing fields: {}",
            missing.join(", ")
        )))
    }
}

/// Reads a field as text: strings verbatim, other scalars in their JSON form
pub fn text_field(payload: &Map<String, Value>, field: &str) -> String {
    match payload.get(field) {
        Some(Value::String(s)) => s.clone(),
        None | Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
    }
}
