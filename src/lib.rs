// Library crate for the campus transport backend
// This file exposes the public API and the router for main and integration tests

pub mod auth;
pub mod config;
pub mod records;
pub mod resources;
pub mod shared;
pub mod storage;

// Re-export commonly used types for easier access in tests
pub use config::AppConfig;
pub use shared::{AppError, AppState, MessageResponse};

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use auth::{access_guard, Access, Guard, TokenService};
use records::resource::{create, list, remove, replace};
use resources::{
    admins, profile, stops_for_route, users, AccessLogs, Cards, Categories, GpsLocations,
    Permissions, RouteStops, Routes, Vehicles,
};

/// Builds the full HTTP application: every route behind its access policy,
/// plus CORS and request tracing
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let tokens = state.tokens.clone();

    Router::new()
        .merge(public_routes())
        .merge(authenticated_routes(&tokens))
        .merge(user_routes(&tokens))
        .merge(admin_routes(&tokens))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(resources::index))
        .route("/user/register", post(auth::register_user))
        .route("/user/login", post(auth::login_user))
        .route("/admin/login", post(auth::login_admin))
        .route("/categories", get(list::<Categories>))
        .route("/routes", get(list::<Routes>))
        .route("/route_stops", get(list::<RouteStops>))
        .route("/route_stops/:id", get(stops_for_route))
}

/// Any valid token, user or admin
fn authenticated_routes(tokens: &TokenService) -> Router<AppState> {
    Router::new()
        .route("/access_logs", post(create::<AccessLogs>))
        .route("/gps", post(create::<GpsLocations>))
        .route_layer(middleware::from_fn_with_state(
            Guard::new(tokens.clone(), Access::Authenticated),
            access_guard,
        ))
}

fn user_routes(tokens: &TokenService) -> Router<AppState> {
    Router::new()
        .route(
            "/user/profile",
            get(profile::get_profile)
                .put(profile::update_profile)
                .delete(profile::delete_profile),
        )
        .route(
            "/user/route",
            get(profile::get_route).put(profile::update_route),
        )
        .route("/user/card", get(profile::get_card))
        .route("/user/vehicle", get(profile::get_vehicle))
        .route_layer(middleware::from_fn_with_state(
            Guard::new(tokens.clone(), Access::User),
            access_guard,
        ))
}

fn admin_routes(tokens: &TokenService) -> Router<AppState> {
    Router::new()
        .route("/admin/register", post(auth::register_admin))
        .route("/admins", get(admins::list_admins))
        .route(
            "/admins/:id",
            put(admins::update_admin).delete(admins::delete_admin),
        )
        .route("/users", get(users::list_users))
        .route(
            "/users/:id",
            put(users::update_user).delete(users::delete_user),
        )
        .route("/categories", post(create::<Categories>))
        .route(
            "/categories/:id",
            put(replace::<Categories>).delete(remove::<Categories>),
        )
        .route("/routes", post(create::<Routes>))
        .route(
            "/routes/:id",
            put(replace::<Routes>).delete(remove::<Routes>),
        )
        .route("/route_stops", post(create::<RouteStops>))
        .route(
            "/route_stops/:id",
            put(replace::<RouteStops>).delete(remove::<RouteStops>),
        )
        .route("/access_logs", get(list::<AccessLogs>))
        .route("/gps", get(list::<GpsLocations>))
        .route(
            "/permissions",
            get(list::<Permissions>).post(create::<Permissions>),
        )
        .route(
            "/permissions/:id",
            put(replace::<Permissions>).delete(remove::<Permissions>),
        )
        .route("/cards", get(list::<Cards>).post(create::<Cards>))
        .route(
            "/cards/:id",
            put(replace::<Cards>).delete(remove::<Cards>),
        )
        .route("/vehicles", get(list::<Vehicles>).post(create::<Vehicles>))
        .route(
            "/vehicles/:id",
            put(replace::<Vehicles>).delete(remove::<Vehicles>),
        )
        .route_layer(middleware::from_fn_with_state(
            Guard::new(tokens.clone(), Access::Admin),
            access_guard,
        ))
}

/// Allow-listed origins with credentials. Wildcard and unparsable origins
/// are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) if value != "*" => Some(value),
            _ => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
