use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use serde_json::Value;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Sqlite};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::auth::CredentialError;
use crate::shared::{AppError, AppState};

pub use rows::row_to_json;
pub use statement::{Assignment, SqlValue, Statement};

mod rows;
pub mod schema;
mod statement;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    UniqueViolation(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StorageError::UniqueViolation(db.message().to_string())
            }
            _ => StorageError::Sqlx(err),
        }
    }
}

/// Outcome of a statement that returns no rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecOutcome {
    pub rows_affected: u64,
    pub last_insert_id: i64,
}

/// Anything that can run a write statement. Implemented by the pooled
/// connection and by recorders in tests.
#[async_trait]
pub trait StatementExecutor: Send {
    async fn execute(&mut self, statement: &Statement) -> Result<ExecOutcome, StorageError>;
}

/// Handle to the SQLite pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the database file at `path`
    pub async fn open(path: &str) -> Result<Self, StorageError> {
        info!(path = %path, "Opening SQLite database");

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// A private in-memory database held by exactly one never-recycled
    /// connection
    pub async fn in_memory() -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub async fn acquire(&self) -> Result<Connection, StorageError> {
        let inner = self.pool.acquire().await?;
        Ok(Connection { inner })
    }
}

/// One pooled connection, checked out for the duration of a request and
/// returned to the pool when dropped
pub struct Connection {
    inner: PoolConnection<Sqlite>,
}

impl Connection {
    #[instrument(skip(self, statement), fields(sql = %statement.sql))]
    pub async fn fetch_all(&mut self, statement: &Statement) -> Result<Vec<Value>, StorageError> {
        let rows: Vec<SqliteRow> = sqlx::query_with(&statement.sql, statement.arguments())
            .fetch_all(&mut *self.inner)
            .await
            .map_err(|e| {
                warn!(error = %e, "Query failed");
                StorageError::from(e)
            })?;

        debug!(row_count = rows.len(), "Query returned rows");
        rows.iter()
            .map(|row| row_to_json(row).map_err(StorageError::from))
            .collect()
    }

    #[instrument(skip(self, statement), fields(sql = %statement.sql))]
    pub async fn fetch_optional(
        &mut self,
        statement: &Statement,
    ) -> Result<Option<Value>, StorageError> {
        let row = sqlx::query_with(&statement.sql, statement.arguments())
            .fetch_optional(&mut *self.inner)
            .await
            .map_err(|e| {
                warn!(error = %e, "Query failed");
                StorageError::from(e)
            })?;

        row.as_ref()
            .map(|row| row_to_json(row).map_err(StorageError::from))
            .transpose()
    }

    /// Like `fetch_optional` but decodes into a typed model
    #[instrument(skip(self, statement), fields(sql = %statement.sql))]
    pub async fn fetch_optional_as<T>(
        &mut self,
        statement: &Statement,
    ) -> Result<Option<T>, StorageError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        sqlx::query_as_with::<_, T, _>(&statement.sql, statement.arguments())
            .fetch_optional(&mut *self.inner)
            .await
            .map_err(|e| {
                warn!(error = %e, "Query failed");
                StorageError::from(e)
            })
    }

    /// Runs a single-value query such as `SELECT COUNT(1) ...`
    pub async fn fetch_scalar(&mut self, statement: &Statement) -> Result<i64, StorageError> {
        let value: i64 = sqlx::query_scalar_with(&statement.sql, statement.arguments())
            .fetch_one(&mut *self.inner)
            .await?;
        Ok(value)
    }
}

#[async_trait]
impl StatementExecutor for Connection {
    #[instrument(skip(self, statement), fields(sql = %statement.sql))]
    async fn execute(&mut self, statement: &Statement) -> Result<ExecOutcome, StorageError> {
        let result = sqlx::query_with(&statement.sql, statement.arguments())
            .execute(&mut *self.inner)
            .await
            .map_err(|e| {
                warn!(error = %e, "Statement failed");
                StorageError::from(e)
            })?;

        let outcome = ExecOutcome {
            rows_affected: result.rows_affected(),
            last_insert_id: result.last_insert_rowid(),
        };
        debug!(rows_affected = outcome.rows_affected, "Statement executed");
        Ok(outcome)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Connection {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state.database.acquire().await.map_err(|e| {
            warn!(error = %e, "Failed to acquire database connection");
            AppError::from(e)
        })
    }
}
