use async_trait::async_trait;

use campus_transit::storage::{ExecOutcome, Statement, StatementExecutor, StorageError};

/// Executor that records statements instead of running them, optionally
/// failing at a given step
#[derive(Default)]
pub struct RecordingExecutor {
    pub statements: Vec<Statement>,
    fail_at: Option<usize>,
}

#[allow(dead_code)]
impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(step: usize) -> Self {
        Self {
            statements: Vec::new(),
            fail_at: Some(step),
        }
    }

    pub fn sql(&self) -> Vec<&str> {
        self.statements.iter().map(|s| s.sql.as_str()).collect()
    }
}

#[async_trait]
impl StatementExecutor for RecordingExecutor {
    async fn execute(&mut self, statement: &Statement) -> Result<ExecOutcome, StorageError> {
        if self.fail_at == Some(self.statements.len()) {
            return Err(StorageError::Sqlx(sqlx::Error::PoolClosed));
        }
        self.statements.push(statement.clone());
        Ok(ExecOutcome {
            rows_affected: 1,
            last_insert_id: 0,
        })
    }
}
