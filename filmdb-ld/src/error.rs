//! Error types for the bulk loader
//!
//! A statement failure carries the statement text and a preview of its
//! parameters so the operator can see exactly which row broke a stage.

use std::path::PathBuf;
use thiserror::Error;

use crate::pipeline::Stage;

/// Loader errors
#[derive(Debug, Error)]
pub enum LoadError {
    /// A statement was rejected by the database (constraint, syntax, ...)
    #[error("Statement failed: {statement} with params {params}: {source}")]
    Statement {
        statement: String,
        params: String,
        #[source]
        source: sqlx::Error,
    },

    /// Database error outside a statement (connect, begin, commit)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Required input file does not exist
    #[error("Input file not found: {0}")]
    MissingInput(PathBuf),

    /// A row could not be used
    #[error("Invalid record in {file} (line {line}): {reason}")]
    InvalidRecord {
        file: PathBuf,
        line: u64,
        reason: String,
    },

    /// Data an earlier stage should have created is absent
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited file parse error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// filmdb-common error
    #[error("Common error: {0}")]
    Common(#[from] filmdb_common::Error),

    /// A stage aborted; earlier stages remain committed
    #[error("Stage '{stage}' failed: {source}")]
    StageFailed {
        stage: Stage,
        #[source]
        source: Box<LoadError>,
    },
}

pub type LoadResult<T> = Result<T, LoadError>;

impl LoadError {
    /// Wrap a sqlx error with the statement that produced it
    pub fn statement(statement: impl Into<String>, params: impl Into<String>, source: sqlx::Error) -> Self {
        LoadError::Statement {
            statement: statement.into(),
            params: params.into(),
            source,
        }
    }

    /// True for UNIQUE / PRIMARY KEY violations
    pub fn is_unique_violation(&self) -> bool {
        match self {
            LoadError::Statement { source, .. } | LoadError::Database(source) => {
                matches!(source, sqlx::Error::Database(db) if db.is_unique_violation())
            }
            LoadError::StageFailed { source, .. } => source.is_unique_violation(),
            _ => false,
        }
    }
}
