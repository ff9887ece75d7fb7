use serde_json::Value;
use sqlx::sqlite::SqliteArguments;
use sqlx::Arguments;

/// A bindable SQLite value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<&Value> for SqlValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => SqlValue::Integer(i),
                None => n.as_f64().map(SqlValue::Real).unwrap_or(SqlValue::Null),
            },
            Value::String(s) => SqlValue::Text(s.clone()),
            // Nested structures are stored as their JSON text
            other => SqlValue::Text(other.to_string()),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

/// `column = ?` pair used by INSERT and UPDATE builders
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: &'static str,
    pub value: SqlValue,
}

impl Assignment {
    pub fn new(column: &'static str, value: impl Into<SqlValue>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

/// Parameterized SQL. Identifiers always come from static descriptors and
/// never from request data; request data only ever travels in `params`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn insert(table: &str, assignments: Vec<Assignment>) -> Self {
        let columns: Vec<&str> = assignments.iter().map(|a| a.column).collect();
        let placeholders = vec!["?"; assignments.len()].join(", ");
        Self {
            sql: format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table,
                columns.join(", "),
                placeholders
            ),
            params: assignments.into_iter().map(|a| a.value).collect(),
        }
    }

    pub fn update(table: &str, assignments: Vec<Assignment>, key: &str, id: i64) -> Self {
        let sets: Vec<String> = assignments
            .iter()
            .map(|a| format!("{} = ?", a.column))
            .collect();
        let mut params: Vec<SqlValue> = assignments.into_iter().map(|a| a.value).collect();
        params.push(SqlValue::Integer(id));
        Self {
            sql: format!("UPDATE {} SET {} WHERE {} = ?", table, sets.join(", "), key),
            params,
        }
    }

    pub fn delete(table: &str, column: &str, id: i64) -> Self {
        Self {
            sql: format!("DELETE FROM {} WHERE {} = ?", table, column),
            params: vec![SqlValue::Integer(id)],
        }
    }

    /// Clears a reference column instead of deleting the referencing rows
    pub fn nullify(table: &str, column: &str, id: i64) -> Self {
        Self {
            sql: format!("UPDATE {} SET {} = NULL WHERE {} = ?", table, column, column),
            params: vec![SqlValue::Integer(id)],
        }
    }

    pub(crate) fn arguments(&self) -> SqliteArguments<'_> {
        let mut args = SqliteArguments::default();
        for param in &self.params {
            match param {
                SqlValue::Null => args.add(Option::<i64>::None),
                SqlValue::Integer(v) => args.add(*v),
                SqlValue::Real(v) => args.add(*v),
                SqlValue::Text(v) => args.add(v.as_str()),
            }
        }
        args
    }
}
