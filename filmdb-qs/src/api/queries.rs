//! Query catalog and execution endpoints

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::warn;

use crate::error::QueryError;
use crate::queries::{self, QueryDef, QueryId, ResultSet, CATALOG};
use crate::AppState;

/// Catalog listing
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub queries: Vec<&'static QueryDef>,
}

/// Query execution response
///
/// On failure `columns` still names the projection, `rows` is empty and
/// `error` holds the message.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub query: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub error: Option<String>,
}

/// GET /api/queries
pub async fn list_queries() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        queries: CATALOG.iter().collect(),
    })
}

/// GET /api/queries/:id
pub async fn run_query(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<(StatusCode, Json<QueryResponse>), QueryError> {
    let id: QueryId = id.parse().map_err(QueryError::UnknownQuery)?;
    let def = id.definition();

    let (status, result, error) = match queries::run_named(&state.db, id, &params).await {
        Ok(result) => (StatusCode::OK, result, None),
        Err(e) => {
            warn!("{} failed: {}", id, e);
            (e.status(), ResultSet::empty(def), Some(e.to_string()))
        }
    };

    Ok((
        status,
        Json(QueryResponse {
            query: id.to_string(),
            columns: result.columns,
            rows: result.rows,
            error,
        }),
    ))
}
