//! filmdb-ex (Source Extractor) - filters raw IMDb dumps into the working set
//!
//! Reads title.basics, title.principals, title.crew and name.basics from the
//! raw directory and writes the filtered intermediate files for filmdb-ld.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use filmdb_common::config::load_config;
use filmdb_ex::Extractor;

/// Command-line arguments for filmdb-ex
#[derive(Parser, Debug)]
#[command(name = "filmdb-ex")]
#[command(about = "Filter raw IMDb dumps into the filmdb working dataset")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the raw .tsv dumps
    #[arg(long, env = "FILMDB_RAW_DIR")]
    raw_dir: Option<PathBuf>,

    /// Directory receiving the filtered files
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Maximum number of movies kept
    #[arg(long)]
    limit: Option<usize>,

    /// Earliest start year kept
    #[arg(long)]
    min_year: Option<i64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .init();

    info!("Starting filmdb-ex (Source Extractor) v{}", env!("CARGO_PKG_VERSION"));

    let mut extract = config.extract;
    if let Some(raw_dir) = args.raw_dir {
        extract.raw_dir = raw_dir;
    }
    if let Some(out_dir) = args.out_dir {
        extract.output_dir = out_dir;
    }
    if let Some(limit) = args.limit {
        extract.movie_limit = limit;
    }
    if let Some(min_year) = args.min_year {
        extract.min_year = min_year;
    }

    info!("Raw directory: {}", extract.raw_dir.display());
    info!("Output directory: {}", extract.output_dir.display());

    let extractor = Extractor::new(extract);
    let summary = match extractor.run() {
        Ok(summary) => summary,
        Err(e) => {
            error!("Extraction failed: {}", e);
            return Err(e.into());
        }
    };

    info!("Extraction complete:");
    info!("  movies:     {}", summary.movies.rows_kept);
    info!("  principals: {}", summary.principals.rows_kept);
    info!("  crew:       {}", summary.crew.rows_kept);
    info!("  people ids: {}", summary.people_ids);
    info!("  people:     {}", summary.people.rows_kept);

    Ok(())
}
