//! Database connection and schema initialization
//!
//! The schema lives in a static definition file (`schema.sql`) and is executed
//! one statement at a time. A failing statement aborts initialization and is
//! reported together with its text.

use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{error, info};

/// Static schema definition
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Open an existing database
///
/// Fails with `NotFound` when the file is missing; nothing is created.
pub async fn connect(db_path: &Path, max_connections: u32) -> Result<SqlitePool> {
    if !db_path.exists() {
        return Err(Error::NotFound(format!(
            "Database not found: {} (run `filmdb-ld init` first)",
            db_path.display()
        )));
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(false)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create the database file if needed and apply the schema
///
/// With `reset`, an existing database file is removed first so the schema is
/// applied to a fresh namespace.
pub async fn init_database(db_path: &Path, reset: bool) -> Result<SqlitePool> {
    if reset && db_path.exists() {
        std::fs::remove_file(db_path)?;
        info!("Removed existing database: {}", db_path.display());
    }

    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    let executed = execute_script(&pool, SCHEMA_SQL).await?;
    info!("✓ Schema applied ({} statements)", executed);

    Ok(pool)
}

/// Split a script on `;` into executable statements
///
/// Comment-only lines are dropped so a trailing comment never becomes an
/// empty statement.
pub fn schema_statements(script: &str) -> Vec<String> {
    script
        .split(';')
        .map(|chunk| {
            chunk
                .lines()
                .filter(|line| !line.trim_start().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .filter(|statement| !statement.is_empty())
        .collect()
}

/// Execute a multi-statement script, stopping at the first failure
///
/// Returns the number of statements executed.
pub async fn execute_script(pool: &SqlitePool, script: &str) -> Result<usize> {
    let statements = schema_statements(script);

    for statement in &statements {
        if let Err(source) = sqlx::query(statement).execute(pool).await {
            error!("Error executing: {}\nError: {}", statement, source);
            return Err(Error::Statement {
                statement: statement.clone(),
                source,
            });
        }
    }

    Ok(statements.len())
}
