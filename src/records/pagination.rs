use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use std::collections::HashMap;

use crate::shared::AppError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Pagination {
    /// Reads `page` and `per_page` from query parameters.
    ///
    /// If either value is present but not an integer, both fall back to their
    /// defaults. Values below 1 are replaced individually.
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let page = parse(params.get("page"));
        let per_page = parse(params.get("per_page"));

        match (page, per_page) {
            (Ok(page), Ok(per_page)) => Self {
                page: page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE),
                per_page: per_page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PER_PAGE),
            },
            _ => Self::default(),
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// Extracts from the query string. Bad paging values never reject; only an
/// undecodable query string does, with the JSON error body.
#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) =
            Query::<HashMap<String, String>>::from_request_parts(parts, state).await?;
        Ok(Self::from_query(&params))
    }
}

fn parse(raw: Option<&String>) -> Result<Option<i64>, std::num::ParseIntError> {
    raw.map(|v| v.trim().parse::<i64>()).transpose()
}
