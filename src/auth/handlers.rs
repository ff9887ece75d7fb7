use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use super::models::AdminAccount;
use super::password::{hash_password, verify_password};
use super::types::{
    AdminLoginResponse, AdminSummary, Identity, Role, UserLoginResponse, UserSummary,
};
use crate::records::{require_fields, text_field, value_of, Payload};
use crate::shared::{AppError, AppState, MessageResponse};
use crate::storage::{
    Assignment, Connection, SqlValue, Statement, StatementExecutor, StorageError,
};

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const EMAIL_TAKEN: &str = "Email already exists";

/// Maps a uniqueness failure on `email` to the client-facing duplicate message
pub fn email_conflict(err: StorageError) -> AppError {
    match err {
        StorageError::UniqueViolation(detail) => {
            warn!(detail = %detail, "Duplicate email rejected");
            AppError::Conflict(EMAIL_TAKEN.to_string())
        }
        other => other.into(),
    }
}

/// POST /user/register
#[instrument(name = "register_user", skip_all)]
pub async fn register_user(
    State(state): State<AppState>,
    mut conn: Connection,
    Payload(payload): Payload,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    require_fields(
        &payload,
        &["name", "email", "phone", "category_id", "password"],
    )?;

    let password_hash =
        hash_password(&state.credentials, text_field(&payload, "password")).await?;
    let field = |name: &'static str| Assignment::new(name, value_of(&payload, name));
    let with_default = |name: &'static str, default: &str| {
        Assignment::new(
            name,
            payload
                .get(name)
                .map(SqlValue::from)
                .unwrap_or_else(|| SqlValue::from(default)),
        )
    };

    let statement = Statement::insert(
        "users",
        vec![
            field("name"),
            field("email"),
            field("phone"),
            field("category_id"),
            with_default("emergency_contact", ""),
            with_default("fee_status", "unpaid"),
            Assignment::new("password_hash", password_hash),
        ],
    );

    let outcome = conn.execute(&statement).await.map_err(email_conflict)?;

    info!(user_id = outcome.last_insert_id, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// POST /user/login
#[instrument(name = "login_user", skip_all)]
pub async fn login_user(
    State(state): State<AppState>,
    mut conn: Connection,
    Payload(payload): Payload,
) -> Result<Json<UserLoginResponse>, AppError> {
    require_fields(&payload, &["email", "password"])?;

    let user = conn
        .fetch_optional(&Statement::new(
            "SELECT user_id, name, category_id, password_hash FROM users WHERE email = ?",
            vec![value_of(&payload, "email")],
        ))
        .await?;

    let Some(user) = user else {
        warn!("Login attempt for unknown email");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    let digest = user["password_hash"].as_str().unwrap_or_default().to_string();
    if digest.is_empty()
        || !verify_password(&state.credentials, text_field(&payload, "password"), digest).await?
    {
        warn!("Login attempt with wrong password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let user_id = user["user_id"].as_i64().ok_or_else(|| {
        error!("User row without integer id");
        AppError::Internal
    })?;
    let name = match &user["name"] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let token = state
        .tokens
        .issue(Identity::user(user_id, name.clone()), Role::User)?;

    info!(user_id, "User logged in");
    Ok(Json(UserLoginResponse {
        message: "Login successful".to_string(),
        token,
        user: UserSummary {
            user_id,
            name,
            category_id: user["category_id"].clone(),
        },
    }))
}

/// POST /admin/login
#[instrument(name = "login_admin", skip_all)]
pub async fn login_admin(
    State(state): State<AppState>,
    mut conn: Connection,
    Payload(payload): Payload,
) -> Result<Json<AdminLoginResponse>, AppError> {
    require_fields(&payload, &["email", "password"])?;

    let admin: Option<AdminAccount> = conn
        .fetch_optional_as(&Statement::new(
            "SELECT admin_id, name, email, password_hash FROM admins WHERE email = ?",
            vec![value_of(&payload, "email")],
        ))
        .await?;

    let Some(admin) = admin else {
        warn!("Admin login attempt for unknown email");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    if admin.password_hash.is_empty()
        || !verify_password(
            &state.credentials,
            text_field(&payload, "password"),
            admin.password_hash.clone(),
        )
        .await?
    {
        warn!(admin_id = admin.admin_id, "Admin login attempt with wrong password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let token = state.tokens.issue(
        Identity::admin(admin.admin_id, admin.name.clone()),
        Role::Admin,
    )?;

    info!(admin_id = admin.admin_id, "Admin logged in");
    Ok(Json(AdminLoginResponse {
        message: "Login successful".to_string(),
        token,
        admin: AdminSummary {
            admin_id: admin.admin_id,
            name: admin.name,
            email: admin.email,
        },
    }))
}

/// POST /admin/register (admin only)
#[instrument(name = "register_admin", skip_all)]
pub async fn register_admin(
    State(state): State<AppState>,
    mut conn: Connection,
    Payload(payload): Payload,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    require_fields(&payload, &["name", "email", "password"])?;

    let password_hash =
        hash_password(&state.credentials, text_field(&payload, "password")).await?;
    let statement = Statement::insert(
        "admins",
        vec![
            Assignment::new("name", value_of(&payload, "name")),
            Assignment::new("email", value_of(&payload, "email")),
            Assignment::new("password_hash", password_hash),
        ],
    );

    let outcome = conn.execute(&statement).await.map_err(email_conflict)?;

    info!(admin_id = outcome.last_insert_id, "Admin registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Admin registered successfully")),
    ))
}
