//! Multi-row INSERT buffering
//!
//! `BatchInsert` collects rows for one table and writes them as a single
//! multi-row `INSERT` whenever the buffer fills (or on an explicit flush).
//! Bulk stages push everything and flush once at the end; streaming stages
//! flush periodically as the buffer fills.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tracing::{debug, error};

use crate::error::{LoadError, LoadResult};

/// SQLite caps host parameters per statement
const MAX_PARAMS_PER_STATEMENT: usize = 32_000;

/// A bound parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Text(String),
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Int(n) => write!(f, "{}", n),
            SqlValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// Format a row for error messages
pub fn format_params(row: &[SqlValue]) -> String {
    let values: Vec<String> = row.iter().map(|v| v.to_string()).collect();
    format!("({})", values.join(", "))
}

/// Buffered multi-row insert into one table
pub struct BatchInsert {
    verb: &'static str,
    table: String,
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
    rows_per_statement: usize,
    rows_written: u64,
}

impl BatchInsert {
    pub fn new(table: impl Into<String>, columns: &[&str], batch_size: usize) -> Self {
        Self::with_columns(table, columns.iter().map(|c| c.to_string()).collect(), batch_size)
    }

    pub fn with_columns(table: impl Into<String>, columns: Vec<String>, batch_size: usize) -> Self {
        let max_rows = (MAX_PARAMS_PER_STATEMENT / columns.len().max(1)).max(1);
        Self {
            verb: "INSERT",
            table: table.into(),
            rows_per_statement: batch_size.clamp(1, max_rows),
            columns,
            rows: Vec::new(),
            rows_written: 0,
        }
    }

    /// Use `INSERT OR IGNORE`: rows hitting a uniqueness constraint are skipped
    pub fn or_ignore(mut self) -> Self {
        self.verb = "INSERT OR IGNORE";
        self
    }

    /// Single-row form of the statement, used for diagnostics
    pub fn statement_template(&self) -> String {
        let placeholders = vec!["?"; self.columns.len()].join(", ");
        format!(
            "{} INTO {} ({}) VALUES ({})",
            self.verb,
            self.table,
            self.columns.join(", "),
            placeholders
        )
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Buffer a row without writing; returns true once the buffer is full
    pub fn add(&mut self, row: Vec<SqlValue>) -> bool {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
        self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.rows.len() >= self.rows_per_statement
    }

    pub fn pending(&self) -> usize {
        self.rows.len()
    }

    /// Rows actually inserted so far (ignored duplicates excluded)
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Buffer a row and flush if the buffer filled up
    pub async fn push(&mut self, conn: &mut SqliteConnection, row: Vec<SqlValue>) -> LoadResult<()> {
        if self.add(row) {
            self.flush(conn).await?;
        }
        Ok(())
    }

    /// Write all buffered rows
    pub async fn flush(&mut self, conn: &mut SqliteConnection) -> LoadResult<u64> {
        if self.rows.is_empty() {
            return Ok(0);
        }

        let batch_len = self.rows.len();
        let params = if batch_len == 1 {
            format_params(&self.rows[0])
        } else {
            format!("{} and {} more rows", format_params(&self.rows[0]), batch_len - 1)
        };

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "{} INTO {} ({}) ",
            self.verb,
            self.table,
            self.columns.join(", ")
        ));
        builder.push_values(self.rows.drain(..), |mut b, row| {
            for value in row {
                match value {
                    SqlValue::Null => b.push_bind(None::<String>),
                    SqlValue::Int(n) => b.push_bind(n),
                    SqlValue::Text(s) => b.push_bind(s),
                };
            }
        });

        let result = builder.build().execute(&mut *conn).await;
        match result {
            Ok(done) => {
                let written = done.rows_affected();
                self.rows_written += written;
                debug!("Flushed {} rows into {} ({} written)", batch_len, self.table, written);
                Ok(written)
            }
            Err(source) => {
                let statement = self.statement_template();
                error!("Error executing: {}", statement);
                error!("Params: {}", params);
                Err(LoadError::statement(statement, params, source))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_template() {
        let batch = BatchInsert::new("Acts_In", &["movieId", "actorId"], 10).or_ignore();
        assert_eq!(
            batch.statement_template(),
            "INSERT OR IGNORE INTO Acts_In (movieId, actorId) VALUES (?, ?)"
        );
    }

    #[test]
    fn test_add_reports_full() {
        let mut batch = BatchInsert::new("Genre", &["name"], 2);
        assert!(!batch.add(vec!["Drama".into()]));
        assert!(batch.add(vec!["Comedy".into()]));
        assert_eq!(batch.pending(), 2);
    }

    #[test]
    fn test_rows_per_statement_respects_param_cap() {
        let batch = BatchInsert::new("Movies", &["a", "b", "c", "d"], 1_000_000);
        assert_eq!(batch.rows_per_statement, MAX_PARAMS_PER_STATEMENT / 4);
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(SqlValue::from(Some(5_i64)), SqlValue::Int(5));
        assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
        assert_eq!(format_params(&[SqlValue::Int(1), "x".into(), SqlValue::Null]), "(1, \"x\", NULL)");
    }

    #[tokio::test]
    async fn test_flush_writes_rows() {
        use sqlx::Connection;

        let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
        sqlx::query("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)")
            .execute(&mut conn)
            .await
            .unwrap();

        let mut batch = BatchInsert::new("t", &["id", "name"], 2).or_ignore();
        for (id, name) in [(1, "a"), (2, "b"), (1, "dup"), (3, "c")] {
            batch.push(&mut conn, vec![SqlValue::Int(id), name.into()]).await.unwrap();
        }
        batch.flush(&mut conn).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM t")
            .fetch_one(&mut conn)
            .await
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(batch.rows_written(), 3);
    }

    #[tokio::test]
    async fn test_flush_failure_reports_statement() {
        use sqlx::Connection;

        let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
        sqlx::query("CREATE TABLE t (id INTEGER PRIMARY KEY)")
            .execute(&mut conn)
            .await
            .unwrap();

        let mut batch = BatchInsert::new("t", &["id"], 10);
        batch.add(vec![SqlValue::Int(1)]);
        batch.add(vec![SqlValue::Int(1)]);
        let err = batch.flush(&mut conn).await.unwrap_err();

        assert!(err.is_unique_violation());
        match err {
            LoadError::Statement { statement, params, .. } => {
                assert_eq!(statement, "INSERT INTO t (id) VALUES (?)");
                assert_eq!(params, "(1) and 1 more rows");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
