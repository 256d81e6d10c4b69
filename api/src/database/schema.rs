//! Filterable metadata for each table. Field names match the JSON keys
//! clients see, relationship fields are only usable through `has`/`any`.

use query_filter::{Cardinality, Field, FieldType, Model, Schema};

pub static BOOKS: Schema = Schema {
    table: "books",
    fields: &[
        Field::column("id", FieldType::Integer),
        Field::column("title", FieldType::Text),
        Field::column("description", FieldType::Text),
        Field::column("cover", FieldType::Text),
        Field::column("price", FieldType::Integer),
        Field::column("author_id", FieldType::Integer),
        Field::column("created", FieldType::Timestamp),
        Field::column("updated", FieldType::Timestamp),
        Field::relation("author", &USERS, "author_id", "id", Cardinality::One),
    ],
    primary_key: &["id"],
};

pub static USERS: Schema = Schema {
    table: "users",
    fields: &[
        Field::column("id", FieldType::Integer),
        Field::column("username", FieldType::Text),
        Field::column("email", FieldType::Text),
        Field::column("name", FieldType::Text),
        Field::column("pseudonym", FieldType::Text),
        Field::column("confirmed", FieldType::Boolean),
        Field::column("role_id", FieldType::Integer),
        Field::column("created", FieldType::Timestamp),
        Field::column("updated", FieldType::Timestamp),
        Field::relation("books", &BOOKS, "id", "author_id", Cardinality::Many),
        Field::relation("role", &ROLES, "role_id", "id", Cardinality::One),
    ],
    primary_key: &["id"],
};

pub static ROLES: Schema = Schema {
    table: "roles",
    fields: &[
        Field::column("id", FieldType::Integer),
        Field::column("name", FieldType::Text),
        Field::column("is_default", FieldType::Boolean),
        Field::column("permissions", FieldType::Integer),
        Field::column("created", FieldType::Timestamp),
        Field::column("updated", FieldType::Timestamp),
        Field::relation("users", &USERS, "id", "role_id", Cardinality::Many),
    ],
    primary_key: &["id"],
};

/// Looks a model up by its table name.
pub fn model_by_name(name: &str) -> Option<&'static Schema> {
    [&BOOKS, &USERS, &ROLES]
        .into_iter()
        .find(|schema| schema.table() == name)
}
