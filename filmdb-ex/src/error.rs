//! Error types for the source extractor

use std::path::PathBuf;
use thiserror::Error;

/// Extraction errors; every variant aborts the run
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Required raw input file does not exist
    #[error("Input file not found: {0}")]
    MissingInput(PathBuf),

    /// Input file lacks a column the filter needs
    #[error("Column '{column}' missing from {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tab-separated parse error
    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),

    /// filmdb-common error
    #[error("Common error: {0}")]
    Common(#[from] filmdb_common::Error),
}

pub type ExtractResult<T> = Result<T, ExtractError>;
