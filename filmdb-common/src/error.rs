//! Common error types for filmdb

use thiserror::Error;

/// Common result type for filmdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the filmdb tools
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A single statement failed; carries the statement for diagnosis
    #[error("Statement failed: {statement}: {source}")]
    Statement {
        statement: String,
        #[source]
        source: sqlx::Error,
    },

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited file parse error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),
}
