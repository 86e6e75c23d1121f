//! Configuration loading and config file resolution
//!
//! All filmdb tools share one optional TOML file. Every field has a built-in
//! default, so a missing file is not an error. Command-line flags are applied
//! on top by each binary.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "FILMDB_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Source extractor settings
    pub extract: ExtractConfig,

    /// Bulk loader settings
    pub load: LoadConfig,

    /// Query service settings
    pub server: ServerConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("filmdb.db"),
            logging: LoggingConfig::default(),
            extract: ExtractConfig::default(),
            load: LoadConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error); RUST_LOG overrides
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Source extractor configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Directory holding the raw IMDb dumps
    pub raw_dir: PathBuf,
    /// Directory receiving the filtered intermediate files
    pub output_dir: PathBuf,
    /// Hard cap on the working movie set
    pub movie_limit: usize,
    /// Earliest start year kept
    pub min_year: i64,
    /// Title types kept
    pub title_types: Vec<String>,
    /// Rows per chunk when streaming the large files
    pub chunk_size: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("raw"),
            output_dir: PathBuf::from("filtered_data"),
            movie_limit: 50_000,
            min_year: 2000,
            title_types: ["movie", "tvSeries", "short", "video"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            chunk_size: 200_000,
        }
    }
}

/// Bulk loader configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Directory holding the extractor's output
    pub data_dir: PathBuf,
    /// Studio catalog (TSV, header names the Studio columns)
    pub studios_file: PathBuf,
    /// User name list (CSV, first column)
    pub users_file: PathBuf,
    /// Sentiment review corpus (CSV: text, label)
    pub reviews_file: PathBuf,
    /// Award name list, one per line; built-in list when unset
    pub awards_file: Option<PathBuf>,
    /// Rows per multi-row INSERT
    pub batch_size: usize,
    /// Runtime used when the source value is missing
    pub runtime_fallback: i64,
    /// Movies with an earlier start year are skipped
    pub min_year: i64,
    /// Chance that an eligible movie wins an award
    pub award_probability: f64,
    /// Latest release year eligible for awards, and latest win year
    pub award_cutoff_year: i64,
    /// Reviews sampled from the corpus
    pub review_sample_size: usize,
    /// Inclusive year window for review timestamps
    pub review_window: (i32, i32),
    /// Inclusive range of favorites per user
    pub favorites_range: (usize, usize),
    /// Seed for the synthetic data generator; entropy when unset
    pub seed: Option<u64>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from("filtered_data");
        Self {
            studios_file: data_dir.join("studios.tsv"),
            users_file: data_dir.join("users.csv"),
            reviews_file: data_dir.join("imdb_reviews.csv"),
            data_dir,
            awards_file: None,
            batch_size: 500,
            runtime_fallback: 120,
            min_year: 2000,
            award_probability: 0.25,
            award_cutoff_year: 2025,
            review_sample_size: 5000,
            review_window: (2019, 2024),
            favorites_range: (5, 30),
            seed: None,
        }
    }
}

/// Query service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5730,
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the tools cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.extract.chunk_size == 0 {
            return Err(Error::Config("extract.chunk_size must be positive".to_string()));
        }
        if self.load.batch_size == 0 {
            return Err(Error::Config("load.batch_size must be positive".to_string()));
        }
        if self.load.runtime_fallback <= 0 {
            return Err(Error::Config("load.runtime_fallback must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.load.award_probability) {
            return Err(Error::Config(format!(
                "load.award_probability must be within [0, 1], got {}",
                self.load.award_probability
            )));
        }
        let (start, end) = self.load.review_window;
        if start > end {
            return Err(Error::Config(format!(
                "load.review_window is reversed: [{}, {}]",
                start, end
            )));
        }
        let (min, max) = self.load.favorites_range;
        if min > max {
            return Err(Error::Config(format!(
                "load.favorites_range is reversed: [{}, {}]",
                min, max
            )));
        }
        Ok(())
    }
}

/// Config file resolution in priority order:
/// 1. Command-line argument (must exist)
/// 2. Environment variable (must exist)
/// 3. `<config dir>/filmdb/config.toml` if present
///
/// Returns `Ok(None)` when no file applies and defaults should be used.
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Result<Option<PathBuf>> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        if !path.exists() {
            return Err(Error::Config(format!("Config file not found: {}", path.display())));
        }
        return Ok(Some(path.to_path_buf()));
    }

    // Priority 2: Environment variable
    if let Ok(value) = std::env::var(env_var_name) {
        let path = PathBuf::from(value);
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file from {} not found: {}",
                env_var_name,
                path.display()
            )));
        }
        return Ok(Some(path));
    }

    // Priority 3: per-user config directory
    Ok(default_config_file().filter(|path| path.exists()))
}

/// Per-user config file location for the platform
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("filmdb").join("config.toml"))
}

/// Load configuration, falling back to built-in defaults when no file applies
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg, CONFIG_ENV_VAR)? {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
            let config = TomlConfig::from_toml_str(&content)?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => {
            info!("No config file found, using built-in defaults");
            Ok(TomlConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.database_path, PathBuf::from("filmdb.db"));
        assert_eq!(config.extract.movie_limit, 50_000);
        assert_eq!(config.extract.min_year, 2000);
        assert_eq!(config.load.runtime_fallback, 120);
        assert_eq!(config.load.favorites_range, (5, 30));
        assert_eq!(config.server.port, 5730);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
            database_path = "/tmp/films.db"

            [load]
            seed = 7
            review_window = [2020, 2021]
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/films.db"));
        assert_eq!(config.load.seed, Some(7));
        assert_eq!(config.load.review_window, (2020, 2021));
        assert_eq!(config.load.batch_size, 500);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_rejects_bad_probability() {
        let result = TomlConfig::from_toml_str("[load]\naward_probability = 1.5\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_reversed_favorites_range() {
        let result = TomlConfig::from_toml_str("[load]\nfavorites_range = [30, 5]\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_cli_config_is_error() {
        let result = resolve_config_path(Some(Path::new("/nonexistent/filmdb.toml")), CONFIG_ENV_VAR);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
