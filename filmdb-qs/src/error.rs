//! Error types for the query service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Query service errors
#[derive(Debug, Error)]
pub enum QueryError {
    /// No catalog entry with this id
    #[error("Unknown query: {0}")]
    UnknownQuery(String),

    /// A parameter is missing or does not parse as its declared type
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// filmdb-common error
    #[error("{0}")]
    Common(#[from] filmdb_common::Error),
}

pub type QueryResult<T> = Result<T, QueryError>;

impl QueryError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        QueryError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            QueryError::UnknownQuery(_) => StatusCode::NOT_FOUND,
            QueryError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            QueryError::Database(_) | QueryError::Common(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}
