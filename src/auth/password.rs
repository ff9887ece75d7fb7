use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Invalid hashing parameters: {0}")]
    Params(String),

    #[error("Password task failed: {0}")]
    Task(String),
}

/// One-way password hashing used for both users and admins
pub trait CredentialStore: Send + Sync {
    /// Produces a salted digest; hashing the same password twice yields different digests
    fn hash(&self, password: &str) -> Result<String, CredentialError>;

    /// Malformed digests verify as `false` rather than erroring
    fn verify(&self, password: &str, digest: &str) -> bool;
}

/// Argon2id digests in PHC string format
#[derive(Clone)]
pub struct Argon2Credentials {
    params: Params,
}

impl Argon2Credentials {
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Custom cost, mostly useful to keep test suites fast
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Result<Self, CredentialError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| CredentialError::Params(e.to_string()))?;
        Ok(Self { params })
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Credentials {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for Argon2Credentials {
    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        self.hasher()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CredentialError::Hash(e.to_string()))
    }

    fn verify(&self, password: &str, digest: &str) -> bool {
        let parsed = match PasswordHash::new(digest) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Stored password digest is malformed");
                return false;
            }
        };

        // Parameters are read back from the digest itself
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Hashes on the blocking pool, keeping Argon2 off the async executor
pub async fn hash_password(
    credentials: &Arc<dyn CredentialStore>,
    password: String,
) -> Result<String, CredentialError> {
    let credentials = Arc::clone(credentials);
    tokio::task::spawn_blocking(move || credentials.hash(&password))
        .await
        .map_err(|e| CredentialError::Task(e.to_string()))?
}

/// Verifies on the blocking pool
pub async fn verify_password(
    credentials: &Arc<dyn CredentialStore>,
    password: String,
    digest: String,
) -> Result<bool, CredentialError> {
    let credentials = Arc::clone(credentials);
    tokio::task::spawn_blocking(move || credentials.verify(&password, &digest))
        .await
        .map_err(|e| CredentialError::Task(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::ThreadTrackingCredentials;

    fn credentials() -> Argon2Credentials {
        Argon2Credentials::with_cost(8, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let store = credentials();
        let digest = store.hash("admin123").unwrap();

        assert!(digest.starts_with("$argon2id$"));
        assert!(store.verify("admin123", &digest));
        assert!(!store.verify("admin124", &digest));
    }

    #[test]
    fn test_digests_are_salted() {
        let store = credentials();
        let first = store.hash("same password").unwrap();
        let second = store.hash("same password").unwrap();

        assert_ne!(first, second);
        assert!(store.verify("same password", &first));
        assert!(store.verify("same password", &second));
    }

    #[test]
    fn test_verify_across_cost_settings() {
        let digest = credentials().hash("pw").unwrap();
        assert!(Argon2Credentials::with_cost(16, 2)
            .unwrap()
            .verify("pw", &digest));
    }

    #[test]
    fn test_malformed_digest_does_not_verify() {
        let store = credentials();
        assert!(!store.verify("pw", "not-a-digest"));
        assert!(!store.verify("pw", ""));
    }

    #[test]
    fn test_rejects_invalid_cost() {
        assert!(matches!(
            Argon2Credentials::with_cost(0, 0),
            Err(CredentialError::Params(_))
        ));
    }

    #[tokio::test]
    async fn test_hashing_runs_off_the_runtime_thread() {
        let tracker = Arc::new(ThreadTrackingCredentials::new());
        let credentials: Arc<dyn CredentialStore> = tracker.clone();

        let digest = hash_password(&credentials, "pw".to_string()).await.unwrap();
        let verified = verify_password(&credentials, "pw".to_string(), digest)
            .await
            .unwrap();

        assert!(verified);
        assert_eq!(tracker.calls(), 2);
        assert!(!tracker.ran_on(std::thread::current().id()));
    }
}
