//! Load stages
//!
//! One module per stage. Every stage opens its own transaction on the
//! loader's connection, commits on success and returns the rows it wrote per
//! table. An error drops the transaction, which rolls the stage back.

pub mod awards;
pub mod favorites;
pub mod genres;
pub mod movies;
pub mod people;
pub mod reviews;
pub mod roles;
pub mod studios;
pub mod users;

use std::collections::HashSet;

use serde::Serialize;
use sqlx::SqliteConnection;

use crate::batch::BatchInsert;
use crate::error::{LoadError, LoadResult};

/// Rows written into one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCount {
    pub table: String,
    pub rows: u64,
}

/// Per-table counts produced by one stage
pub type StageCounts = Vec<TableCount>;

pub(crate) fn count_of(batch: &BatchInsert) -> TableCount {
    TableCount {
        table: batch.table().to_string(),
        rows: batch.rows_written(),
    }
}

pub(crate) async fn fetch_text_column(conn: &mut SqliteConnection, sql: &str) -> LoadResult<Vec<String>> {
    sqlx::query_scalar::<_, String>(sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| LoadError::statement(sql, "()", e))
}

pub(crate) async fn fetch_int_column(conn: &mut SqliteConnection, sql: &str) -> LoadResult<Vec<i64>> {
    sqlx::query_scalar::<_, i64>(sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| LoadError::statement(sql, "()", e))
}

/// Identifiers of every movie already in the database
pub(crate) async fn loaded_movie_ids(conn: &mut SqliteConnection) -> LoadResult<Vec<String>> {
    fetch_text_column(conn, "SELECT movieId FROM Movies ORDER BY movieId").await
}

pub(crate) async fn loaded_movie_set(conn: &mut SqliteConnection) -> LoadResult<HashSet<String>> {
    Ok(loaded_movie_ids(conn).await?.into_iter().collect())
}
