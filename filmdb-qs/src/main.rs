//! filmdb-qs (Query Service) - HTTP/JSON access to the film database

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use filmdb_common::config::load_config;
use filmdb_common::db::connect;
use filmdb_qs::{build_router, AppState};

/// Command-line arguments for filmdb-qs
#[derive(Parser, Debug)]
#[command(name = "filmdb-qs")]
#[command(about = "Serve filmdb queries over HTTP")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides config)
    #[arg(long, env = "FILMDB_DATABASE")]
    database: Option<PathBuf>,

    /// Bind address (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .init();

    info!("Starting filmdb-qs (Query Service) v{}", env!("CARGO_PKG_VERSION"));

    let db_path = args.database.unwrap_or(config.database_path);
    info!("Database path: {}", db_path.display());

    let pool = match connect(&db_path, 4).await {
        Ok(pool) => {
            info!("✓ Connected to database");
            pool
        }
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    let app = build_router(AppState::new(pool));

    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!("filmdb-qs listening on http://{}:{}", host, port);
    info!("Health check: http://{}:{}/health", host, port);

    axum::serve(listener, app).await?;

    Ok(())
}
