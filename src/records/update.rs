use serde_json::{Map, Value};
use std::sync::Arc;

use crate::auth::{hash_password, CredentialStore};
use crate::shared::AppError;
use crate::storage::{Assignment, SqlValue};

pub const PASSWORD_HASH_COLUMN: &str = "password_hash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Plain,
    /// Accepted as `password`, stored hashed under `password_hash`
    Password,
}

/// Entry in a partial-update allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn plain(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Plain,
        }
    }

    pub const fn password() -> Self {
        Self {
            name: "password",
            kind: ColumnKind::Password,
        }
    }
}

/// Builds `SET` assignments from the allow-listed keys present in `payload`,
/// in allow-list order. Keys outside the list are ignored; if none remain the
/// update is rejected with `No valid fields provided`.
pub async fn partial_assignments(
    payload: &Map<String, Value>,
    allowed: &[Column],
    credentials: &Arc<dyn CredentialStore>,
) -> Result<Vec<Assignment>, AppError> {
    let mut assignments = Vec::new();

    for column in allowed {
        let Some(value) = payload.get(column.name) else {
            continue;
        };

        match column.kind {
            ColumnKind::Plain => assignments.push(Assignment {
                column: column.name,
                value: SqlValue::from(value),
            }),
            ColumnKind::Password => {
                let password = value
                    .as_str()
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| {
                        AppError::Validation("Password must be a non-empty string".to_string())
                    })?;
                let digest = hash_password(credentials, password.to_string()).await?;
                assignments.push(Assignment {
                    column: PASSWORD_HASH_COLUMN,
                    value: SqlValue::Text(digest),
                });
            }
        }
    }

    if assignments.is_empty() {
        return Err(AppError::Validation("No valid fields provided".to_string()));
    }

    Ok(assignments)
}
