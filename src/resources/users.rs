use axum::{extract::State, Json};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::auth::email_conflict;
use crate::records::{
    cascade_delete, partial_assignments, Column, EntityKind, Pagination, Payload, RecordId,
};
use crate::shared::{AppError, AppState, MessageResponse};
use crate::storage::{Connection, SqlValue, Statement, StatementExecutor};

/// Every user column except the password digest
pub const PUBLIC_USER_COLUMNS: &str =
    "user_id, name, email, phone, category_id, emergency_contact, fee_status";

const ADMIN_EDITABLE: &[Column] = &[
    Column::plain("name"),
    Column::plain("email"),
    Column::plain("phone"),
    Column::plain("category_id"),
    Column::plain("emergency_contact"),
    Column::plain("fee_status"),
    Column::password(),
];

pub async fn user_exists(conn: &mut Connection, user_id: i64) -> Result<bool, AppError> {
    let row = conn
        .fetch_optional(&Statement::new(
            "SELECT user_id FROM users WHERE user_id = ?",
            vec![SqlValue::Integer(user_id)],
        ))
        .await?;
    Ok(row.is_some())
}

/// GET /users
#[instrument(skip_all)]
pub async fn list_users(
    mut conn: Connection,
    pagination: Pagination,
) -> Result<Json<Vec<Value>>, AppError> {
    let users = conn
        .fetch_all(&Statement::new(
            format!("SELECT {} FROM users LIMIT ? OFFSET ?", PUBLIC_USER_COLUMNS),
            vec![
                SqlValue::Integer(pagination.limit()),
                SqlValue::Integer(pagination.offset()),
            ],
        ))
        .await?;
    Ok(Json(users))
}

/// PUT /users/:id
#[instrument(skip(state, conn, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    mut conn: Connection,
    RecordId(id): RecordId,
    Payload(payload): Payload,
) -> Result<Json<MessageResponse>, AppError> {
    if !user_exists(&mut conn, id).await? {
        warn!("Update for unknown user");
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let assignments = partial_assignments(&payload, ADMIN_EDITABLE, &state.credentials).await?;
    conn.execute(&Statement::update("users", assignments, "user_id", id))
        .await
        .map_err(email_conflict)?;

    info!("User updated");
    Ok(Json(MessageResponse::new("User updated")))
}

/// DELETE /users/:id
#[instrument(skip(conn))]
pub async fn delete_user(
    mut conn: Connection,
    RecordId(id): RecordId,
) -> Result<Json<MessageResponse>, AppError> {
    cascade_delete(&mut conn, EntityKind::User, id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::{
        admin_token, body_json, AppStateBuilder, ThreadTrackingCredentials,
    };
    use crate::{app, AppConfig};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    fn put(uri: &str, token: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header("authorization", format!("Bearer {}", token))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn insert_user(state: &AppState, name: &str, email: &str) -> i64 {
        let mut conn = state.database.acquire().await.unwrap();
        conn.execute(&Statement::new(
            "INSERT INTO users (name, email, phone, category_id, password_hash) \
             VALUES (?, ?, '0300', 1, 'x')",
            vec![SqlValue::from(name), SqlValue::from(email)],
        ))
        .await
        .unwrap()
        .last_insert_id
    }

    async fn stored_user(state: &AppState, id: i64) -> Value {
        let mut conn = state.database.acquire().await.unwrap();
        conn.fetch_optional(&Statement::new(
            format!("SELECT {} FROM users WHERE user_id = ?", PUBLIC_USER_COLUMNS),
            vec![SqlValue::Integer(id)],
        ))
        .await
        .unwrap()
        .unwrap()
    }

    async fn setup() -> (AppState, Router, String) {
        let state = AppStateBuilder::new().build().await;
        let router = app(state.clone(), &AppConfig::default());
        let token = admin_token(&state);
        (state, router, token)
    }

    #[tokio::test]
    async fn test_empty_update_leaves_row_unchanged() {
        let (state, router, token) = setup().await;
        let id = insert_user(&state, "Hina", "hina@campus.edu").await;
        let before = stored_user(&state, id).await;

        let response = router
            .oneshot(put(&format!("/users/{}", id), &token, json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "No valid fields provided"})
        );
        assert_eq!(stored_user(&state, id).await, before);
    }

    #[tokio::test]
    async fn test_unknown_keys_are_ignored() {
        let (state, router, token) = setup().await;
        let id = insert_user(&state, "Hina", "hina@campus.edu").await;

        let response = router
            .oneshot(put(
                &format!("/users/{}", id),
                &token,
                json!({"fee_status": "paid", "password_hash": "forged", "user_id": 99}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let user = stored_user(&state, id).await;
        assert_eq!(user["fee_status"], "paid");
        assert_eq!(user["user_id"], id);
    }

    #[tokio::test]
    async fn test_email_collision_is_reported() {
        let (state, router, token) = setup().await;
        insert_user(&state, "Hina", "hina@campus.edu").await;
        let id = insert_user(&state, "Omar", "omar@campus.edu").await;

        let response = router
            .oneshot(put(
                &format!("/users/{}", id),
                &token,
                json!({"email": "hina@campus.edu"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Email already exists"})
        );
        assert_eq!(stored_user(&state, id).await["email"], "omar@campus.edu");
    }

    #[tokio::test]
    async fn test_password_reset_hashes_off_the_runtime_thread() {
        let tracker = Arc::new(ThreadTrackingCredentials::new());
        let state = AppStateBuilder::new()
            .with_credentials(tracker.clone())
            .build()
            .await;
        let router = app(state.clone(), &AppConfig::default());
        let id = insert_user(&state, "Hina", "hina@campus.edu").await;

        let response = router
            .oneshot(put(
                &format!("/users/{}", id),
                &admin_token(&state),
                json!({"password": "fresh-pass"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        // Seed admin plus the reset
        assert_eq!(tracker.calls(), 2);
        assert!(!tracker.ran_on(std::thread::current().id()));
    }

    #[tokio::test]
    async fn test_non_numeric_id_gets_json_error() {
        let (_, router, token) = setup().await;

        let response = router
            .oneshot(put("/users/abc", &token, json!({"name": "x"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("abc"));
    }
}
