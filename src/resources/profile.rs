use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use super::users::PUBLIC_USER_COLUMNS;
use crate::auth::{email_conflict, Claims};
use crate::records::{
    cascade_delete, partial_assignments, require_fields, Column, EntityKind, Payload,
};
use crate::shared::{AppError, AppState, MessageResponse};
use crate::storage::{Connection, SqlValue, Statement, StatementExecutor};

// Users may not move themselves between categories or change fee status
const SELF_EDITABLE: &[Column] = &[
    Column::plain("name"),
    Column::plain("email"),
    Column::plain("phone"),
    Column::plain("emergency_contact"),
    Column::password(),
];

fn caller_id(claims: &Claims) -> Result<i64, AppError> {
    claims.identity.user_id.ok_or_else(|| {
        warn!("User token without user_id");
        AppError::Unauthorized("Invalid token".to_string())
    })
}

async fn fetch_profile(conn: &mut Connection, user_id: i64) -> Result<Value, AppError> {
    conn.fetch_optional(&Statement::new(
        format!("SELECT {} FROM users WHERE user_id = ?", PUBLIC_USER_COLUMNS),
        vec![SqlValue::Integer(user_id)],
    ))
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// GET /user/profile
#[instrument(skip_all)]
pub async fn get_profile(
    Extension(claims): Extension<Claims>,
    mut conn: Connection,
) -> Result<Json<Value>, AppError> {
    let user = fetch_profile(&mut conn, caller_id(&claims)?).await?;
    Ok(Json(json!({ "user": user })))
}

/// PUT /user/profile
#[instrument(skip_all)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut conn: Connection,
    Payload(payload): Payload,
) -> Result<Json<Value>, AppError> {
    let user_id = caller_id(&claims)?;
    let assignments = partial_assignments(&payload, SELF_EDITABLE, &state.credentials).await?;

    conn.execute(&Statement::update("users", assignments, "user_id", user_id))
        .await
        .map_err(email_conflict)?;

    let user = fetch_profile(&mut conn, user_id).await?;
    info!(user_id, "Profile updated");
    Ok(Json(json!({ "message": "Profile updated", "user": user })))
}

/// DELETE /user/profile
#[instrument(skip_all)]
pub async fn delete_profile(
    Extension(claims): Extension<Claims>,
    mut conn: Connection,
) -> Result<Json<MessageResponse>, AppError> {
    let user_id = caller_id(&claims)?;
    cascade_delete(&mut conn, EntityKind::User, user_id).await?;
    info!(user_id, "Profile deleted");
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// GET /user/route
/// Route preferences are not stored; every user sees the first route.
#[instrument(skip_all)]
pub async fn get_route(mut conn: Connection) -> Result<Json<Value>, AppError> {
    conn.fetch_optional(&Statement::new("SELECT * FROM routes LIMIT 1", vec![]))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No routes available".to_string()))
}

/// PUT /user/route
#[instrument(skip_all)]
pub async fn update_route(Payload(payload): Payload) -> Result<Json<Value>, AppError> {
    require_fields(&payload, &["route_name", "start_point", "end_point"])?;
    Ok(Json(json!({
        "message": "Route preference updated successfully",
        "route": payload,
    })))
}

/// GET /user/card
#[instrument(skip_all)]
pub async fn get_card(
    Extension(claims): Extension<Claims>,
    mut conn: Connection,
) -> Result<Json<Value>, AppError> {
    let user_id = caller_id(&claims)?;
    let card = conn
        .fetch_optional(&Statement::new(
            "SELECT card_uid, status FROM cards WHERE user_id = ?",
            vec![SqlValue::Integer(user_id)],
        ))
        .await?;

    // Users without an issued card get a provisional one
    let card = card.unwrap_or_else(|| {
        json!({
            "card_uid": format!("TRX-{}", user_id),
            "status": "active",
        })
    });
    Ok(Json(card))
}

/// GET /user/vehicle
#[instrument(skip_all)]
pub async fn get_vehicle(mut conn: Connection) -> Result<Json<Value>, AppError> {
    let vehicle = conn
        .fetch_optional(&Statement::new(
            "SELECT vehicles.vehicle_id, vehicles.vehicle_number, vehicles.driver_name, \
                    vehicles.route_id, routes.route_name, \
                    gps_locations.latitude, gps_locations.longitude \
             FROM vehicles \
             LEFT JOIN routes ON vehicles.route_id = routes.route_id \
             LEFT JOIN gps_locations ON vehicles.vehicle_id = gps_locations.vehicle_id \
             WHERE gps_locations.location_id = ( \
                 SELECT MAX(location_id) FROM gps_locations WHERE vehicle_id = vehicles.vehicle_id \
             ) OR gps_locations.vehicle_id IS NULL \
             LIMIT 1",
            vec![],
        ))
        .await?;

    let vehicle = vehicle.unwrap_or_else(|| {
        json!({
            "vehicle_id": 1,
            "vehicle_number": "BUS-101",
            "driver_name": "Aslam Driver",
            "latitude": "20.5937",
            "longitude": "78.9629",
            "route_name": "Route A",
        })
    });
    Ok(Json(vehicle))
}

#[cfg(test)]
mod tests {
    use crate::shared::test_utils::{body_json, user_token, AppStateBuilder};
    use crate::storage::{SqlValue, Statement, StatementExecutor};
    use crate::{app, AppConfig};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt; // for `oneshot`

    fn get(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_profile_of_vanished_user_is_not_found() {
        let state = AppStateBuilder::new().build().await;
        let router = app(state.clone(), &AppConfig::default());

        let response = router
            .oneshot(get("/user/profile", &user_token(&state, 404)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({"error": "User not found"}));
    }

    #[tokio::test]
    async fn test_route_without_any_routes() {
        let state = AppStateBuilder::new().build().await;
        let mut conn = state.database.acquire().await.unwrap();
        conn.execute(&Statement::new("DELETE FROM routes", vec![]))
            .await
            .unwrap();
        drop(conn);
        let router = app(state.clone(), &AppConfig::default());

        let response = router
            .oneshot(get("/user/route", &user_token(&state, 1)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({"error": "No routes available"})
        );
    }

    #[tokio::test]
    async fn test_vehicle_placeholder_when_fleet_is_empty() {
        let state = AppStateBuilder::new().build().await;
        let mut conn = state.database.acquire().await.unwrap();
        conn.execute(&Statement::new(
            "DELETE FROM vehicles WHERE vehicle_id > ?",
            vec![SqlValue::Integer(0)],
        ))
        .await
        .unwrap();
        drop(conn);
        let router = app(state.clone(), &AppConfig::default());

        let response = router
            .oneshot(get("/user/vehicle", &user_token(&state, 1)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let vehicle = body_json(response).await;
        assert_eq!(vehicle["vehicle_number"], "BUS-101");
        assert_eq!(vehicle["latitude"], "20.5937");
    }
}
