use axum::Json;
use serde_json::Value;
use tracing::instrument;

use crate::records::{Entity, EntityKind, Field, Mutable, Mutations, RecordId, Resource};
use crate::shared::AppError;
use crate::storage::{Connection, SqlValue, Statement};

const ROUTE_FIELDS: &[Field] = &[
    Field::required("route_name"),
    Field::required("start_point"),
    Field::required("end_point"),
];

pub struct Routes;

impl Entity for Routes {
    const RESOURCE: &'static Resource = &Resource {
        noun: "Route",
        table: "routes",
        key: "route_id",
        list_sql: "SELECT * FROM routes LIMIT ? OFFSET ?",
        paginated: true,
        insert_fields: ROUTE_FIELDS,
        created: "Route added",
    };
}

impl Mutable for Routes {
    const MUTATIONS: &'static Mutations = &Mutations {
        replace_fields: ROUTE_FIELDS,
        cascade: Some(EntityKind::Route),
        updated: "Route updated",
        deleted: "Route deleted successfully",
    };
}

pub struct RouteStops;

impl Entity for RouteStops {
    const RESOURCE: &'static Resource = &Resource {
        noun: "Route stop",
        table: "route_stops",
        key: "stop_id",
        list_sql: "SELECT * FROM route_stops ORDER BY route_id, stop_number LIMIT ? OFFSET ?",
        paginated: true,
        insert_fields: &[
            Field::required("route_id"),
            Field::required("stop_name"),
            Field::required("stop_number"),
        ],
        created: "Route stop added",
    };
}

impl Mutable for RouteStops {
    const MUTATIONS: &'static Mutations = &Mutations {
        // A stop never moves to another route
        replace_fields: &[Field::required("stop_name"), Field::required("stop_number")],
        cascade: None,
        updated: "Route stop updated",
        deleted: "Route stop deleted",
    };
}

/// GET /route_stops/:route_id
#[instrument(skip(conn))]
pub async fn stops_for_route(
    mut conn: Connection,
    RecordId(route_id): RecordId,
) -> Result<Json<Vec<Value>>, AppError> {
    let stops = conn
        .fetch_all(&Statement::new(
            "SELECT * FROM route_stops WHERE route_id = ? ORDER BY stop_number",
            vec![SqlValue::Integer(route_id)],
        ))
        .await?;
    Ok(Json(stops))
}
