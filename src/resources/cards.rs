use crate::records::{Entity, EntityKind, Field, Mutable, Mutations, Resource};

pub struct Cards;

impl Entity for Cards {
    const RESOURCE: &'static Resource = &Resource {
        noun: "Card",
        table: "cards",
        key: "card_id",
        list_sql: "SELECT cards.*, users.name \
                   FROM cards \
                   LEFT JOIN users ON cards.user_id = users.user_id \
                   LIMIT ? OFFSET ?",
        paginated: true,
        insert_fields: &[
            Field::required("card_uid"),
            Field::required("user_id"),
            Field::defaulted("status", "active"),
        ],
        created: "Card added",
    };
}

impl Mutable for Cards {
    const MUTATIONS: &'static Mutations = &Mutations {
        replace_fields: &[
            Field::required("card_uid"),
            Field::required("user_id"),
            Field::required("status"),
        ],
        cascade: Some(EntityKind::Card),
        updated: "Card updated",
        deleted: "Card deleted",
    };
}

/// Card tap events; append-only, timestamped by the database
pub struct AccessLogs;

impl Entity for AccessLogs {
    const RESOURCE: &'static Resource = &Resource {
        noun: "Log",
        table: "access_logs",
        key: "log_id",
        list_sql: "SELECT users.name, cards.card_uid, access_logs.action_type, \
                          access_logs.timestamp, user_categories.category_name \
                   FROM access_logs \
                   LEFT JOIN users ON access_logs.user_id = users.user_id \
                   LEFT JOIN cards ON access_logs.card_id = cards.card_id \
                   LEFT JOIN user_categories ON users.category_id = user_categories.category_id \
                   ORDER BY access_logs.timestamp DESC, access_logs.log_id DESC \
                   LIMIT ? OFFSET ?",
        paginated: true,
        insert_fields: &[
            Field::required("user_id"),
            Field::required("card_id"),
            Field::required("action_type"),
        ],
        created: "Log added",
    };
}
