//! filmdb-ld (Bulk Loader) - schema initialization and staged data load
//!
//! `init` applies the schema, `load` runs the load stages in foreign-key
//! order, `counts` prints per-table row counts.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use filmdb_common::config::load_config;
use filmdb_common::db::{connect, init_database, table_counts};
use filmdb_ld::{Loader, Stage, StageSelection};

/// Command-line arguments for filmdb-ld
#[derive(Parser, Debug)]
#[command(name = "filmdb-ld")]
#[command(about = "Create and populate the filmdb database")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides config)
    #[arg(long, global = true, env = "FILMDB_DATABASE")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the schema (idempotent)
    Init {
        /// Delete the existing database first
        #[arg(long)]
        reset: bool,
    },
    /// Run the load stages
    Load {
        /// Run a single stage
        #[arg(long, conflicts_with = "from")]
        only: Option<Stage>,

        /// Resume from a stage
        #[arg(long)]
        from: Option<Stage>,

        /// Seed for the synthetic data generator
        #[arg(long)]
        seed: Option<u64>,

        /// Directory holding the extractor output (overrides config)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Print per-table row counts
    Counts,
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

    info!("Starting filmdb-ld (Bulk Loader) v{}", env!("CARGO_PKG_VERSION"));

    let db_path = args.database.unwrap_or(config.database_path);
    info!("Database path: {}", db_path.display());

    match args.command {
        Command::Init { reset } => {
            init_database(&db_path, reset).await?;
            info!("✓ Database ready");
        }
        Command::Load {
            only,
            from,
            seed,
            data_dir,
        } => {
            let mut load = config.load;
            if seed.is_some() {
                load.seed = seed;
            }
            if let Some(dir) = data_dir {
                load.studios_file = dir.join("studios.tsv");
                load.users_file = dir.join("users.csv");
                load.reviews_file = dir.join("imdb_reviews.csv");
                load.data_dir = dir;
            }
            let selection = match (only, from) {
                (Some(stage), _) => StageSelection::Only(stage),
                (None, Some(stage)) => StageSelection::From(stage),
                (None, None) => StageSelection::All,
            };

            let pool = connect(&db_path, 1).await?;
            let mut loader = Loader::new(pool, load);
            match loader.run(selection).await {
                Ok(report) => {
                    info!("Rows inserted:\n{}", report);
                }
                Err(e) => {
                    error!("Load failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Command::Counts => {
            let pool = connect(&db_path, 1).await?;
            for table in table_counts(&pool).await? {
                println!("{:<20} {:>10}", table.name, table.row_count);
            }
        }
    }

    Ok(())
}
