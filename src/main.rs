use campus_transit::{
    app,
    auth::{Argon2Credentials, CredentialStore, TokenService},
    config::DEFAULT_JWT_SECRET,
    storage::{schema, Database},
    AppConfig, AppState,
};
use std::{error::Error, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env file is fine; real environment variables still apply
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting campus transit server");
    if config.jwt_secret == DEFAULT_JWT_SECRET {
        warn!("JWT_SECRET is not set, tokens are signed with the default secret");
    }

    let database = Database::open(&config.database_path).await?;
    let credentials: Arc<dyn CredentialStore> = Arc::new(Argon2Credentials::new());
    schema::initialize(&database, &credentials).await?;

    let app_state = AppState::new(database, TokenService::from_config(&config), credentials);
    let app = app(app_state, &config);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(port = config.port, "Server running on http://localhost:{}", config.port);
    axum::serve(listener, app).await?;

    Ok(())
}
