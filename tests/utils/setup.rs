use axum::Router;
use std::sync::Arc;

use campus_transit::{
    app,
    auth::{Argon2Credentials, CredentialStore, Identity, Role, TokenService},
    storage::{schema, Database},
    AppConfig, AppState,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const TEST_SECRET: &str = "integration-test-secret";
pub const ALLOWED_ORIGIN: &str = "http://localhost:5173";

pub struct TestSetup {
    pub app: Router,
    pub state: AppState,
    pub admin_token: String,
}

pub struct TestSetupBuilder {
    ttl_minutes: i64,
    origins: Vec<String>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            ttl_minutes: 60,
            origins: vec![ALLOWED_ORIGIN.to_string()],
        }
    }

    #[allow(dead_code)]
    pub fn with_ttl_minutes(mut self, ttl_minutes: i64) -> Self {
        self.ttl_minutes = ttl_minutes;
        self
    }

    pub async fn build(self) -> TestSetup {
        let database = Database::in_memory().await.unwrap();
        // Cheapest accepted Argon2 cost keeps the suite fast
        let credentials: Arc<dyn CredentialStore> =
            Arc::new(Argon2Credentials::with_cost(8, 1).unwrap());
        schema::initialize(&database, &credentials)
            .await
            .unwrap();

        let tokens = TokenService::new(TEST_SECRET, self.ttl_minutes);
        let admin_token = tokens
            .issue(Identity::admin(1, "Super Admin"), Role::Admin)
            .unwrap();

        let config = AppConfig {
            jwt_secret: TEST_SECRET.to_string(),
            token_ttl_minutes: self.ttl_minutes,
            cors_origins: self.origins,
            ..AppConfig::default()
        };

        let state = AppState::new(database, tokens, credentials);
        TestSetup {
            app: app(state.clone(), &config),
            state,
            admin_token,
        }
    }
}

impl Default for TestSetupBuilder {
    fn default() -> Self {
        Self::new()
    }
}
