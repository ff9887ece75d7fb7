use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::Display;

/// Role embedded in every token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// Identity attributes signed into a token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<i64>,
    pub name: String,
}

impl Identity {
    pub fn user(user_id: i64, name: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            admin_id: None,
            name: name.into(),
        }
    }

    pub fn admin(admin_id: i64, name: impl Into<String>) -> Self {
        Self {
            user_id: None,
            admin_id: Some(admin_id),
            name: name.into(),
        }
    }
}

/// JWT claims: identity plus role and the standard time claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub identity: Identity,
    pub role: Role,
    pub iat: i64, // Issued at (seconds since epoch)
    pub exp: i64, // Expiration (seconds since epoch)
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub user_id: i64,
    pub name: String,
    /// Echoed as stored
    pub category_id: Value,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UserLoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AdminSummary {
    pub admin_id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AdminLoginResponse {
    pub message: String,
    pub token: String,
    pub admin: AdminSummary,
}
