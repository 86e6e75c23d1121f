//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Health check response
///
/// `status` is `degraded` when the database does not answer.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => "ok",
        Err(e) => {
            warn!("Database ping failed: {}", e);
            "unavailable"
        }
    };

    Json(HealthResponse {
        status: if database == "ok" { "ok" } else { "degraded" },
        module: "filmdb-qs",
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
