// Public API - what other modules can use
pub use handlers::{email_conflict, login_admin, login_user, register_admin, register_user};
pub use middleware::{access_guard, authorize, Access, Guard};
pub use password::{
    hash_password, verify_password, Argon2Credentials, CredentialError, CredentialStore,
};
pub use token::{TokenError, TokenService};
pub use types::{Claims, Identity, Role};

// Internal modules
mod handlers;
mod middleware;
mod models;
mod password;
mod token;
pub mod types;
