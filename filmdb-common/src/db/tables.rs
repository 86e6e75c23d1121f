//! Table listing and row counts

use crate::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Schema tables in foreign-key (load) order
pub const LOAD_ORDER_TABLES: [&str; 17] = [
    "Movies",
    "Studio",
    "Produced_By",
    "People",
    "Actor",
    "Director",
    "Writer",
    "Acts_In",
    "Directs",
    "Writes_Script_For",
    "Genre",
    "Has_Genre",
    "Award",
    "Wins_Award",
    "User",
    "Review",
    "Favorites",
];

/// Table metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    /// Table name
    pub name: String,
    /// Number of rows in table
    pub row_count: i64,
}

/// Row counts for every schema table, in load order
pub async fn table_counts(pool: &SqlitePool) -> Result<Vec<TableInfo>> {
    let mut table_infos = Vec::with_capacity(LOAD_ORDER_TABLES.len());

    for table_name in LOAD_ORDER_TABLES {
        let row_count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table_name))
            .fetch_one(pool)
            .await?;

        table_infos.push(TableInfo {
            name: table_name.to_string(),
            row_count,
        });
    }

    Ok(table_infos)
}
