use strum_macros::Display;
use tracing::{info, instrument, warn};

use crate::storage::{Statement, StatementExecutor, StorageError};

/// Parents whose deletion must first clean up dependent rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EntityKind {
    User,
    Card,
    Vehicle,
    Route,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cleanup {
    Delete {
        table: &'static str,
        column: &'static str,
    },
    Nullify {
        table: &'static str,
        column: &'static str,
    },
}

impl Cleanup {
    fn statement(&self, id: i64) -> Statement {
        match *self {
            Cleanup::Delete { table, column } => Statement::delete(table, column, id),
            Cleanup::Nullify { table, column } => Statement::nullify(table, column, id),
        }
    }
}

/// Ordered dependent cleanup followed by the parent delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadePlan {
    pub cleanup: &'static [Cleanup],
    pub table: &'static str,
    pub key: &'static str,
}

const USER_PLAN: CascadePlan = CascadePlan {
    cleanup: &[
        Cleanup::Delete {
            table: "access_logs",
            column: "user_id",
        },
        Cleanup::Delete {
            table: "cards",
            column: "user_id",
        },
    ],
    table: "users",
    key: "user_id",
};

const CARD_PLAN: CascadePlan = CascadePlan {
    cleanup: &[Cleanup::Delete {
        table: "access_logs",
        column: "card_id",
    }],
    table: "cards",
    key: "card_id",
};

const VEHICLE_PLAN: CascadePlan = CascadePlan {
    cleanup: &[Cleanup::Delete {
        table: "gps_locations",
        column: "vehicle_id",
    }],
    table: "vehicles",
    key: "vehicle_id",
};

// Vehicles outlive their route; they are only detached from it
const ROUTE_PLAN: CascadePlan = CascadePlan {
    cleanup: &[
        Cleanup::Nullify {
            table: "vehicles",
            column: "route_id",
        },
        Cleanup::Delete {
            table: "route_stops",
            column: "route_id",
        },
    ],
    table: "routes",
    key: "route_id",
};

impl EntityKind {
    pub fn plan(self) -> CascadePlan {
        match self {
            EntityKind::User => USER_PLAN,
            EntityKind::Card => CARD_PLAN,
            EntityKind::Vehicle => VEHICLE_PLAN,
            EntityKind::Route => ROUTE_PLAN,
        }
    }
}

impl CascadePlan {
    pub fn statements(&self, id: i64) -> Vec<Statement> {
        self.cleanup
            .iter()
            .map(|step| step.statement(id))
            .chain(std::iter::once(Statement::delete(self.table, self.key, id)))
            .collect()
    }
}

/// Runs the plan for `kind` in order and returns the number of parent rows
/// removed. Statements are not wrapped in a transaction: on failure the
/// remaining steps are skipped and earlier steps stay applied.
#[instrument(skip(executor))]
pub async fn cascade_delete<E>(executor: &mut E, kind: EntityKind, id: i64) -> Result<u64, StorageError>
where
    E: StatementExecutor + ?Sized,
{
    let statements = kind.plan().statements(id);
    let last = statements.len() - 1;
    let mut removed = 0;

    for (step, statement) in statements.iter().enumerate() {
        let outcome = executor.execute(statement).await.map_err(|e| {
            warn!(step, error = %e, "Cascade delete stopped part way");
            e
        })?;
        if step == last {
            removed = outcome.rows_affected;
        }
    }

    info!(removed, "Cascade delete finished");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(EntityKind::User, vec![
        "DELETE FROM access_logs WHERE user_id = ?",
        "DELETE FROM cards WHERE user_id = ?",
        "DELETE FROM users WHERE user_id = ?",
    ])]
    #[case(EntityKind::Card, vec![
        "DELETE FROM access_logs WHERE card_id = ?",
        "DELETE FROM cards WHERE card_id = ?",
    ])]
    #[case(EntityKind::Vehicle, vec![
        "DELETE FROM gps_locations WHERE vehicle_id = ?",
        "DELETE FROM vehicles WHERE vehicle_id = ?",
    ])]
    #[case(EntityKind::Route, vec![
        "UPDATE vehicles SET route_id = NULL WHERE route_id = ?",
        "DELETE FROM route_stops WHERE route_id = ?",
        "DELETE FROM routes WHERE route_id = ?",
    ])]
    fn test_plan_order(#[case] kind: EntityKind, #[case] expected: Vec<&str>) {
        let statements = kind.plan().statements(7);
        let sql: Vec<&str> = statements.iter().map(|s| s.sql.as_str()).collect();

        assert_eq!(sql, expected);
        assert!(statements
            .iter()
            .all(|s| s.params == vec![crate::storage::SqlValue::Integer(7)]));
    }
}
