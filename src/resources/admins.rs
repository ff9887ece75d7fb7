use axum::{extract::State, Json};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::auth::{email_conflict, hash_password};
use crate::records::{is_provided, require_fields, text_field, value_of, Payload, RecordId};
use crate::shared::{AppError, AppState, MessageResponse};
use crate::storage::{Assignment, Connection, Statement, StatementExecutor};

/// GET /admins
#[instrument(skip_all)]
pub async fn list_admins(mut conn: Connection) -> Result<Json<Vec<Value>>, AppError> {
    let admins = conn
        .fetch_all(&Statement::new(
            "SELECT admin_id, name, email FROM admins",
            vec![],
        ))
        .await?;
    Ok(Json(admins))
}

/// PUT /admins/:id
/// The password is re-hashed only when a non-empty one is supplied.
#[instrument(skip(state, conn, payload))]
pub async fn update_admin(
    State(state): State<AppState>,
    mut conn: Connection,
    RecordId(id): RecordId,
    Payload(payload): Payload,
) -> Result<Json<MessageResponse>, AppError> {
    require_fields(&payload, &["name", "email"])?;

    let mut assignments = vec![
        Assignment::new("name", value_of(&payload, "name")),
        Assignment::new("email", value_of(&payload, "email")),
    ];
    if is_provided(payload.get("password")) {
        let digest = hash_password(&state.credentials, text_field(&payload, "password")).await?;
        assignments.push(Assignment::new("password_hash", digest));
    }

    let outcome = conn
        .execute(&Statement::update("admins", assignments, "admin_id", id))
        .await
        .map_err(email_conflict)?;

    if outcome.rows_affected == 0 {
        warn!("Update for unknown admin");
        return Err(AppError::NotFound("Admin not found".to_string()));
    }

    info!("Admin updated");
    Ok(Json(MessageResponse::new("Admin updated successfully")))
}

/// DELETE /admins/:id
#[instrument(skip(conn))]
pub async fn delete_admin(
    mut conn: Connection,
    RecordId(id): RecordId,
) -> Result<Json<MessageResponse>, AppError> {
    conn.execute(&Statement::delete("admins", "admin_id", id))
        .await?;
    info!("Admin deleted");
    Ok(Json(MessageResponse::new("Admin deleted successfully")))
}
