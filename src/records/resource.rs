use axum::{http::StatusCode, Json};
use serde_json::{Map, Value};
use tracing::{info, instrument, warn};

use super::cascade::{cascade_delete, EntityKind};
use super::fields::{assignments, required_columns, Field};
use super::pagination::Pagination;
use super::payload::Payload;
use super::record_id::RecordId;
use super::validation::require_fields;
use crate::shared::{AppError, MessageResponse};
use crate::storage::{Connection, SqlValue, Statement, StatementExecutor};

/// Replace and delete rules. Only tables whose rows can change carry them;
/// append-only tables are created and listed, never replaced or deleted.
#[derive(Debug, Clone, Copy)]
pub struct Mutations {
    pub replace_fields: &'static [Field],
    pub cascade: Option<EntityKind>,
    pub updated: &'static str,
    pub deleted: &'static str,
}

/// Static description of a table exposed through the generic CRUD handlers
#[derive(Debug, Clone, Copy)]
pub struct Resource {
    /// Singular display name used in "<noun> not found"
    pub noun: &'static str,
    pub table: &'static str,
    pub key: &'static str,
    /// Full SELECT; when `paginated` it must end in `LIMIT ? OFFSET ?`
    pub list_sql: &'static str,
    pub paginated: bool,
    pub insert_fields: &'static [Field],
    pub created: &'static str,
}

impl Resource {
    pub fn list_statement(&self, pagination: Pagination) -> Statement {
        let params = if self.paginated {
            vec![
                SqlValue::Integer(pagination.limit()),
                SqlValue::Integer(pagination.offset()),
            ]
        } else {
            Vec::new()
        };
        Statement::new(self.list_sql, params)
    }

    pub async fn list(
        &self,
        conn: &mut Connection,
        pagination: Pagination,
    ) -> Result<Vec<Value>, AppError> {
        Ok(conn.fetch_all(&self.list_statement(pagination)).await?)
    }

    /// Inserts a record and returns its new key
    pub async fn create(
        &self,
        conn: &mut Connection,
        payload: &Map<String, Value>,
    ) -> Result<i64, AppError> {
        require_fields(payload, &required_columns(self.insert_fields))?;
        let statement = Statement::insert(self.table, assignments(self.insert_fields, payload));
        let outcome = conn.execute(&statement).await?;
        Ok(outcome.last_insert_id)
    }

    /// Overwrites every replace field of an existing record
    pub async fn replace(
        &self,
        mutations: &Mutations,
        conn: &mut Connection,
        id: i64,
        payload: &Map<String, Value>,
    ) -> Result<(), AppError> {
        require_fields(payload, &required_columns(mutations.replace_fields))?;
        let statement = Statement::update(
            self.table,
            assignments(mutations.replace_fields, payload),
            self.key,
            id,
        );

        let outcome = conn.execute(&statement).await?;
        if outcome.rows_affected == 0 {
            warn!(table = self.table, id, "Replace matched no record");
            return Err(AppError::NotFound(format!("{} not found", self.noun)));
        }
        Ok(())
    }

    /// Deleting an absent record is not an error
    pub async fn delete(
        &self,
        mutations: &Mutations,
        conn: &mut Connection,
        id: i64,
    ) -> Result<u64, AppError> {
        let removed = match mutations.cascade {
            Some(kind) => cascade_delete(conn, kind, id).await?,
            None => {
                conn.execute(&Statement::delete(self.table, self.key, id))
                    .await?
                    .rows_affected
            }
        };
        Ok(removed)
    }
}

/// Binds a `Resource` to a type so the generic handlers can be routed as
/// `list::<Routes>`
pub trait Entity: Send + Sync + 'static {
    const RESOURCE: &'static Resource;
}

/// Entities whose records can be replaced and deleted. Routing `replace` or
/// `remove` for an append-only entity does not compile.
pub trait Mutable: Entity {
    const MUTATIONS: &'static Mutations;
}

#[instrument(skip_all, fields(table = E::RESOURCE.table))]
pub async fn list<E: Entity>(
    mut conn: Connection,
    pagination: Pagination,
) -> Result<Json<Vec<Value>>, AppError> {
    let rows = E::RESOURCE.list(&mut conn, pagination).await?;
    Ok(Json(rows))
}

#[instrument(skip_all, fields(table = E::RESOURCE.table))]
pub async fn create<E: Entity>(
    mut conn: Connection,
    Payload(payload): Payload,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let id = E::RESOURCE.create(&mut conn, &payload).await?;
    info!(id, "{} created", E::RESOURCE.noun);
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(E::RESOURCE.created)),
    ))
}

#[instrument(skip_all, fields(table = E::RESOURCE.table))]
pub async fn replace<E: Mutable>(
    mut conn: Connection,
    RecordId(id): RecordId,
    Payload(payload): Payload,
) -> Result<Json<MessageResponse>, AppError> {
    E::RESOURCE
        .replace(E::MUTATIONS, &mut conn, id, &payload)
        .await?;
    info!(id, "Record replaced");
    Ok(Json(MessageResponse::new(E::MUTATIONS.updated)))
}

#[instrument(skip_all, fields(table = E::RESOURCE.table))]
pub async fn remove<E: Mutable>(
    mut conn: Connection,
    RecordId(id): RecordId,
) -> Result<Json<MessageResponse>, AppError> {
    let removed = E::RESOURCE.delete(E::MUTATIONS, &mut conn, id).await?;
    info!(id, removed, "Record deleted");
    Ok(Json(MessageResponse::new(E::MUTATIONS.deleted)))
}
