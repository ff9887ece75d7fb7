use axum::Json;
use serde_json::{json, Value};

pub use cards::{AccessLogs, Cards};
pub use categories::Categories;
pub use fleet::{GpsLocations, Vehicles};
pub use permissions::Permissions;
pub use routes::{stops_for_route, RouteStops, Routes};

pub mod admins;
mod cards;
mod categories;
mod fleet;
mod permissions;
pub mod profile;
mod routes;
pub mod users;

/// GET /
pub async fn index() -> Json<Value> {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
