//! Data-service boundary — the queryable row store the engine writes into.
//!
//! The SDK consumes the store through [`DataService`]: per collection, it
//! supports equality/negation/null/in filters, inclusive range filters on a
//! timestamp column, descending ordering, a row limit, a count-only mode and
//! a maybe-single mode. [`RestDataService`] implements the trait over the
//! hosted REST API; tests inject an in-memory implementation.

mod rest;
pub mod retry;

pub use rest::RestDataService;

use crate::error::HttpError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// One filter condition on a collection column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Eq(&'static str, String),
    Neq(&'static str, String),
    NotNull(&'static str),
    In(&'static str, Vec<String>),
    /// Inclusive lower bound.
    Gte(&'static str, String),
    /// Inclusive upper bound.
    Lte(&'static str, String),
}

/// A read query against one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectQuery {
    pub collection: &'static str,
    pub conditions: Vec<Condition>,
    pub order_desc: Option<&'static str>,
    pub limit: Option<u32>,
}

impl SelectQuery {
    pub fn new(collection: &'static str) -> Self {
        Self {
            collection,
            ..Self::default()
        }
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<String>) -> Self {
        self.conditions.push(Condition::Eq(column, value.into()));
        self
    }

    pub fn eq_bool(self, column: &'static str, value: bool) -> Self {
        self.eq(column, if value { "true" } else { "false" })
    }

    pub fn neq(mut self, column: &'static str, value: impl Into<String>) -> Self {
        self.conditions.push(Condition::Neq(column, value.into()));
        self
    }

    pub fn not_null(mut self, column: &'static str) -> Self {
        self.conditions.push(Condition::NotNull(column));
        self
    }

    pub fn in_any(mut self, column: &'static str, values: Vec<String>) -> Self {
        self.conditions.push(Condition::In(column, values));
        self
    }

    pub fn since(mut self, column: &'static str, t: DateTime<Utc>) -> Self {
        self.conditions.push(Condition::Gte(column, t.to_rfc3339()));
        self
    }

    pub fn until(mut self, column: &'static str, t: DateTime<Utc>) -> Self {
        self.conditions.push(Condition::Lte(column, t.to_rfc3339()));
        self
    }

    /// Inclusive range on `column` from the view filter's date range.
    pub fn time_range(self, column: &'static str, range: &crate::filters::DateRange) -> Self {
        self.since(column, range.from).until(column, range.to)
    }

    pub fn order_desc(mut self, column: &'static str) -> Self {
        self.order_desc = Some(column);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// The row-store capability contract.
///
/// Implementations return full results or an error — never a silently
/// truncated partial set. Zero matching rows is a successful, empty result.
#[async_trait]
pub trait DataService: Send + Sync {
    /// Fetch matching rows as raw JSON objects.
    async fn select(&self, query: SelectQuery) -> Result<Vec<Value>, HttpError>;

    /// Count matching rows without materializing them.
    async fn count(&self, query: SelectQuery) -> Result<u64, HttpError>;

    /// Fetch at most one row. Zero rows is `None`, not an error.
    async fn maybe_single(&self, query: SelectQuery) -> Result<Option<Value>, HttpError> {
        let mut rows = self.select(query.limit(1)).await?;
        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }
}

/// Deserialize raw rows into a domain type.
pub(crate) fn rows_into<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, crate::error::SdkError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(crate::error::SdkError::from))
        .collect()
}
