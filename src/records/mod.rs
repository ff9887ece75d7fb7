// Generic record pipeline shared by every entity endpoint
pub use cascade::{cascade_delete, CascadePlan, Cleanup, EntityKind};
pub use fields::{value_of, Field, Source};
pub use pagination::Pagination;
pub use payload::Payload;
pub use record_id::RecordId;
pub use resource::{Entity, Mutable, Mutations, Resource};
pub use update::{partial_assignments, Column, ColumnKind, PASSWORD_HASH_COLUMN};
pub use validation::{is_provided, require_fields, text_field};

mod cascade;
pub mod fields;
mod pagination;
mod payload;
mod record_id;
pub mod resource;
mod update;
mod validation;
