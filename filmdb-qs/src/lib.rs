//! filmdb-qs library - Query Service
//!
//! Serves the named film queries, the title lookup and review submission
//! over HTTP/JSON.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod queries;

pub use crate::error::{QueryError, QueryResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/api/queries", get(api::list_queries))
        .route("/api/queries/:id", get(api::run_query))
        .route("/api/reviews", post(api::post_review))
        .route("/api/tables", get(api::list_tables));

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
