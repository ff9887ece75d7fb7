use crate::records::{Entity, Field, Mutable, Mutations, Resource};

pub struct Categories;

impl Entity for Categories {
    const RESOURCE: &'static Resource = &Resource {
        noun: "Category",
        table: "user_categories",
        key: "category_id",
        list_sql: "SELECT * FROM user_categories LIMIT ? OFFSET ?",
        paginated: true,
        insert_fields: &[Field::required("category_name")],
        created: "Category added",
    };
}

impl Mutable for Categories {
    const MUTATIONS: &'static Mutations = &Mutations {
        replace_fields: &[Field::required("category_name")],
        cascade: None,
        updated: "Category updated",
        deleted: "Category deleted",
    };
}
