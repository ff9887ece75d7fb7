use crate::records::{Entity, Field, Mutable, Mutations, Resource};

const PERMISSION_FIELDS: &[Field] = &[
    Field::required("category_id"),
    Field::required("allowed_area"),
];

/// Areas each user category may enter
pub struct Permissions;

impl Entity for Permissions {
    const RESOURCE: &'static Resource = &Resource {
        noun: "Permission",
        table: "access_permissions",
        key: "permission_id",
        list_sql: "SELECT * FROM access_permissions",
        paginated: false,
        insert_fields: PERMISSION_FIELDS,
        created: "Permission added",
    };
}

impl Mutable for Permissions {
    const MUTATIONS: &'static Mutations = &Mutations {
        replace_fields: PERMISSION_FIELDS,
        cascade: None,
        updated: "Permission updated",
        deleted: "Permission deleted",
    };
}
