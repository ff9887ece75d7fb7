use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::shared::AppError;

/// JSON object request body. An empty body or a literal `null` reads as `{}`.
pub struct Payload(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Payload(Map::new()));
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(Payload(map)),
            Ok(Value::Null) => Ok(Payload(Map::new())),
            Ok(_) => Err(AppError::Validation(
                "Request body must be a JSON object".to_string(),
            )),
            Err(e) => {
                debug!(error = %e, "Rejected malformed JSON body");
                Err(AppError::Validation(format!("Invalid JSON body: {}", e)))
            }
        }
    }
}
