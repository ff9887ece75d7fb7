use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::auth::{CredentialError, CredentialStore, TokenError, TokenService};
use crate::storage::{Database, StorageError};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub tokens: TokenService,
    pub credentials: Arc<dyn CredentialStore>,
}

impl AppState {
    pub fn new(
        database: Database,
        tokens: TokenService,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            database,
            tokens,
            credentials,
        }
    }
}

/// Body of every successful mutation
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Storage(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            // Duplicate emails surface as a plain bad request to clients
            AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_) | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired | TokenError::Invalid => AppError::Unauthorized(err.to_string()),
            TokenError::Encoding(msg) => {
                error!(error = %msg, "Failed to sign token");
                AppError::Internal
            }
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UniqueViolation(msg) => AppError::Conflict(msg),
            StorageError::Sqlx(e) => AppError::Storage(e.to_string()),
            StorageError::Credential(e) => e.into(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        if rejection.status().is_server_error() {
            error!(error = %rejection.body_text(), "Route has no matching path parameter");
            return AppError::Internal;
        }
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        error!(error = %err, "Credential store failure");
        AppError::Internal
    }
}
