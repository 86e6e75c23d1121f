//! # filmdb common library
//!
//! Shared code for the filmdb tools:
//! - Configuration loading (TOML file + built-in defaults)
//! - Database connection, schema initialization and table counts
//! - Entity models shared by the loader and the query service
//! - Intermediate file layout shared by the extractor and the loader
//! - Tab-separated file helpers (null markers, lenient numeric parsing)

pub mod config;
pub mod db;
pub mod error;
pub mod layout;
pub mod tsv;

pub use error::{Error, Result};
