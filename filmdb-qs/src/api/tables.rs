//! Table row counts

use axum::{extract::State, Json};
use filmdb_common::db::{table_counts, TableInfo};
use serde::Serialize;

use crate::error::QueryError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct TablesResponse {
    pub tables: Vec<TableInfo>,
}

/// GET /api/tables
pub async fn list_tables(State(state): State<AppState>) -> Result<Json<TablesResponse>, QueryError> {
    let tables = table_counts(&state.db).await?;
    Ok(Json(TablesResponse { tables }))
}
