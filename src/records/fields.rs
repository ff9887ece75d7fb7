use serde_json::{Map, Value};

use crate::storage::{Assignment, SqlValue};

/// Where a column's value comes from when a record is written
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Source {
    /// Must pass the required-field check
    Required,
    /// NULL when absent
    Optional,
    /// Text default when absent; an explicit `null` is kept as NULL
    Default(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    pub column: &'static str,
    pub source: Source,
}

impl Field {
    pub const fn required(column: &'static str) -> Self {
        Self {
            column,
            source: Source::Required,
        }
    }

    pub const fn optional(column: &'static str) -> Self {
        Self {
            column,
            source: Source::Optional,
        }
    }

    pub const fn defaulted(column: &'static str, default: &'static str) -> Self {
        Self {
            column,
            source: Source::Default(default),
        }
    }
}

/// Bound value of a single payload key, NULL when absent
pub fn value_of(payload: &Map<String, Value>, key: &str) -> SqlValue {
    payload.get(key).map(SqlValue::from).unwrap_or(SqlValue::Null)
}

pub fn required_columns(fields: &[Field]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|f| f.source == Source::Required)
        .map(|f| f.column)
        .collect()
}

/// Maps every field to a bound value, in descriptor order
pub fn assignments(fields: &[Field], payload: &Map<String, Value>) -> Vec<Assignment> {
    fields
        .iter()
        .map(|field| {
            let value = match (payload.get(field.column), field.source) {
                (Some(value), _) => SqlValue::from(value),
                (None, Source::Default(default)) => SqlValue::from(default),
                (None, _) => SqlValue::Null,
            };
            Assignment {
                column: field.column,
                value,
            }
        })
        .collect()
}
