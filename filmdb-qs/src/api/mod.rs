//! HTTP API handlers for filmdb-qs

pub mod health;
pub mod queries;
pub mod reviews;
pub mod tables;

pub use health::health_routes;
pub use queries::{list_queries, run_query};
pub use reviews::post_review;
pub use tables::list_tables;
