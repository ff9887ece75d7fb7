use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

use super::types::{Claims, Identity, Role};
use crate::config::AppConfig;

#[derive(Debug, Error, PartialEq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

/// Issues and validates HS256 session tokens.
///
/// Tokens are stateless bearer credentials: nothing is stored server side, so a
/// token stays usable (and replayable) until its `exp` passes.
#[derive(Clone)]
pub struct TokenService {
    secret: Arc<str>,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: impl AsRef<str>, ttl_minutes: i64) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl_minutes)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs `identity` together with `role` and an expiration of now + TTL
    pub fn issue(&self, identity: Identity, role: Role) -> Result<String, TokenError> {
        self.issue_at(identity, role, Utc::now())
    }

    #[instrument(skip(self, identity), fields(role = %role))]
    pub fn issue_at(
        &self,
        identity: Identity,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let exp = (now + self.ttl).timestamp();

        debug!(
            ttl_minutes = self.ttl.num_minutes(),
            exp_timestamp = exp,
            "Creating JWT token with expiration"
        );

        let claims = Claims {
            identity,
            role,
            iat: now.timestamp(),
            exp,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            TokenError::Encoding(e.to_string())
        })
    }

    /// Validates a token against the current time
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Signature, algorithm and shape are checked first; any failure there is
    /// `Invalid`. Only a well-signed token can be reported as `Expired`.
    #[instrument(skip(self, token))]
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            TokenError::Invalid
        })?;

        if now.timestamp() > claims.exp {
            debug!(exp = claims.exp, "JWT token has expired");
            return Err(TokenError::Expired);
        }

        debug!(
            role = %claims.role,
            name = %claims.identity.name,
            "JWT token decoded successfully"
        );
        Ok(claims)
    }
}
