use crate::records::{Entity, EntityKind, Field, Mutable, Mutations, Resource};

const VEHICLE_FIELDS: &[Field] = &[
    Field::required("vehicle_number"),
    Field::required("driver_name"),
    Field::required("capacity"),
    Field::optional("route_id"),
];

pub struct Vehicles;

impl Entity for Vehicles {
    const RESOURCE: &'static Resource = &Resource {
        noun: "Vehicle",
        table: "vehicles",
        key: "vehicle_id",
        list_sql: "SELECT vehicles.*, routes.route_name \
                   FROM vehicles \
                   LEFT JOIN routes ON vehicles.route_id = routes.route_id \
                   LIMIT ? OFFSET ?",
        paginated: true,
        insert_fields: VEHICLE_FIELDS,
        created: "Vehicle added",
    };
}

impl Mutable for Vehicles {
    const MUTATIONS: &'static Mutations = &Mutations {
        replace_fields: VEHICLE_FIELDS,
        cascade: Some(EntityKind::Vehicle),
        updated: "Vehicle updated",
        deleted: "Vehicle deleted successfully",
    };
}

/// Position reports; append-only, timestamped by the database
pub struct GpsLocations;

impl Entity for GpsLocations {
    const RESOURCE: &'static Resource = &Resource {
        noun: "GPS location",
        table: "gps_locations",
        key: "location_id",
        list_sql: "SELECT gps_locations.*, vehicles.vehicle_number \
                   FROM gps_locations \
                   LEFT JOIN vehicles ON gps_locations.vehicle_id = vehicles.vehicle_id \
                   ORDER BY gps_locations.timestamp DESC, gps_locations.location_id DESC \
                   LIMIT ? OFFSET ?",
        paginated: true,
        insert_fields: &[
            Field::required("vehicle_id"),
            Field::required("latitude"),
            Field::required("longitude"),
        ],
        created: "GPS location added",
    };
}
