//! Query layer
//!
//! Runs catalog queries and converts their rows into JSON values, plus the
//! title lookup helper and the review write.

pub mod catalog;
pub mod lookup;
pub mod reviews;

use std::collections::HashMap;

use serde::Serialize;
use serde_json::json;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool, ValueRef};
use tracing::debug;

pub use catalog::{ParamKind, ParamSpec, QueryDef, QueryId, CATALOG};
pub use lookup::{find_movie_id, TitleLookup};
pub use reviews::{insert_review, submit_review, NewReview, ReviewOutcome, ReviewSubmission};

use crate::error::{QueryError, QueryResult};
use catalog::Match;

/// A bound parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Text(String),
}

/// Rows returned by a query, with the fixed projection's column names
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl ResultSet {
    /// An empty result carrying only the column names
    pub fn empty(def: &QueryDef) -> Self {
        Self {
            columns: def.columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

/// Parse a raw parameter per the declared type, falling back to the default
///
/// A missing or blank value takes the default; a query without a default
/// requires the parameter.
pub fn resolve_param(spec: &ParamSpec, raw: Option<&str>) -> QueryResult<ParamValue> {
    let value = match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => value,
        None => spec
            .default
            .ok_or_else(|| QueryError::invalid(spec.name, "a value is required"))?,
    };

    match spec.kind {
        ParamKind::Int => value
            .parse::<i64>()
            .map(ParamValue::Int)
            .map_err(|_| QueryError::invalid(spec.name, format!("'{}' is not an integer", value))),
        ParamKind::Text => Ok(ParamValue::Text(match spec.matching {
            Match::Exact => value.to_string(),
            Match::Contains => format!("%{}%", value),
        })),
    }
}

/// Run a catalog query with parameters given as strings
pub async fn run_named(pool: &SqlitePool, id: QueryId, params: &HashMap<String, String>) -> QueryResult<ResultSet> {
    let def = id.definition();
    let value = resolve_param(&def.param, params.get(def.param.name).map(String::as_str))?;
    run_query(pool, def, value).await
}

/// Run a catalog query with an already typed parameter
pub async fn run_query(pool: &SqlitePool, def: &QueryDef, value: ParamValue) -> QueryResult<ResultSet> {
    debug!("Running {} with {:?}", def.id, value);
    let query = sqlx::query(def.sql);
    let query = match value {
        ParamValue::Int(n) => query.bind(n),
        ParamValue::Text(s) => query.bind(s),
    };
    let rows = query.fetch_all(pool).await?;

    Ok(ResultSet {
        columns: def.columns.iter().map(|c| c.to_string()).collect(),
        rows: rows.iter().map(row_to_json).collect(),
    })
}

/// Convert one SQLite row into JSON values (text, integer, real or null)
pub fn row_to_json(row: &SqliteRow) -> Vec<serde_json::Value> {
    (0..row.len())
        .map(|i| {
            row.try_get_raw(i)
                .ok()
                .and_then(|val| {
                    if val.is_null() {
                        Some(serde_json::Value::Null)
                    } else {
                        row.try_get::<String, _>(i)
                            .ok()
                            .map(serde_json::Value::String)
                            .or_else(|| row.try_get::<i64, _>(i).ok().map(|v| json!(v)))
                            .or_else(|| row.try_get::<f64, _>(i).ok().map(|v| json!(v)))
                    }
                })
                .unwrap_or(serde_json::Value::Null)
        })
        .collect()
}
