use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::Response,
};
use strum_macros::Display;
use tracing::{debug, instrument, warn};

use super::token::TokenService;
use super::types::{Claims, Role};
use crate::shared::AppError;

pub const MISSING_AUTHORIZATION: &str = "Authorization header missing or invalid";
pub const ADMIN_REQUIRED: &str = "Admin access required";
pub const USER_REQUIRED: &str = "User access required";

/// Access policy attached to a single route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Access {
    Public,
    Authenticated,
    Admin,
    User,
}

/// Middleware state: the policy for one route plus the verifier
#[derive(Clone)]
pub struct Guard {
    tokens: TokenService,
    access: Access,
}

impl Guard {
    pub fn new(tokens: TokenService, access: Access) -> Self {
        Self { tokens, access }
    }
}

/// Decides whether a request carrying `header` may pass `access`.
///
/// Public routes never look at the header. Every other policy requires a
/// `Bearer <token>` value that validates; Admin and User additionally check
/// the role. On success the caller's claims are returned.
pub fn authorize(
    access: Access,
    header: Option<&HeaderValue>,
    tokens: &TokenService,
) -> Result<Option<Claims>, AppError> {
    if access == Access::Public {
        return Ok(None);
    }

    let token = bearer_token(header).ok_or_else(|| {
        warn!("Missing or malformed Authorization header");
        AppError::Unauthorized(MISSING_AUTHORIZATION.to_string())
    })?;

    let claims = tokens.validate(token).map_err(|e| {
        warn!(error = %e, "Token rejected");
        AppError::from(e)
    })?;

    match access {
        Access::Admin if claims.role != Role::Admin => {
            warn!(role = %claims.role, "Admin route called without admin role");
            Err(AppError::Forbidden(ADMIN_REQUIRED.to_string()))
        }
        Access::User if claims.role != Role::User => {
            warn!(role = %claims.role, "User route called without user role");
            Err(AppError::Forbidden(USER_REQUIRED.to_string()))
        }
        _ => Ok(Some(claims)),
    }
}

fn bearer_token(header: Option<&HeaderValue>) -> Option<&str> {
    header?.to_str().ok()?.strip_prefix("Bearer ")
}

/// Route-level access guard.
/// Usage: `handler.layer(middleware::from_fn_with_state(Guard::new(tokens, Access::Admin), access_guard))`
/// Handlers behind a non-public guard can extract `Extension<Claims>`.
#[instrument(skip(guard, req, next), fields(access = %guard.access))]
pub async fn access_guard(
    State(guard): State<Guard>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = authorize(
        guard.access,
        req.headers().get(AUTHORIZATION),
        &guard.tokens,
    )?;

    if let Some(claims) = claims {
        debug!(role = %claims.role, "Request authorized, attaching claims");
        req.extensions_mut().insert(claims);
    }

    Ok(next.run(req).await)
}
