//! Loader input files
//!
//! The extractor's working set plus the auxiliary catalogs (studios, users,
//! review corpus, optional award list).

use std::path::{Path, PathBuf};

use filmdb_common::config::LoadConfig;
use filmdb_common::layout::IntermediateFiles;
use filmdb_common::tsv;

use crate::error::{LoadError, LoadResult};

/// Every file the loader may read
#[derive(Debug, Clone)]
pub struct LoadInputs {
    pub working_set: IntermediateFiles,
    pub studios: PathBuf,
    pub users: PathBuf,
    pub reviews: PathBuf,
    pub awards: Option<PathBuf>,
}

impl LoadInputs {
    pub fn from_config(config: &LoadConfig) -> Self {
        Self {
            working_set: IntermediateFiles::new(&config.data_dir),
            studios: config.studios_file.clone(),
            users: config.users_file.clone(),
            reviews: config.reviews_file.clone(),
            awards: config
                .awards_file
                .clone()
                .filter(|path| !path.as_os_str().is_empty()),
        }
    }
}

/// Fail with `MissingInput` unless the file exists
pub fn require(path: &Path) -> LoadResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(LoadError::MissingInput(path.to_path_buf()))
    }
}

/// Tab-separated reader with its header resolved to the requested columns
pub struct ColumnReader {
    path: PathBuf,
    reader: csv::Reader<std::fs::File>,
    indices: Vec<usize>,
}

impl ColumnReader {
    /// Open `path` and locate `columns` in its header
    pub fn open(path: &Path, columns: &[&str]) -> LoadResult<Self> {
        require(path)?;
        let mut reader = tsv::tsv_reader(path)?;
        let headers = reader.headers()?.clone();
        let mut indices = Vec::with_capacity(columns.len());
        for column in columns {
            let index = tsv::column_index(&headers, column).ok_or_else(|| LoadError::InvalidRecord {
                file: path.to_path_buf(),
                line: 1,
                reason: format!("missing column '{}'", column),
            })?;
            indices.push(index);
        }
        Ok(Self {
            path: path.to_path_buf(),
            reader,
            indices,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Next record as the requested fields, in request order
    ///
    /// Absent trailing fields read as empty strings.
    pub fn next_fields(&mut self, record: &mut csv::StringRecord) -> LoadResult<Option<Vec<String>>> {
        if !self.reader.read_record(record)? {
            return Ok(None);
        }
        Ok(Some(
            self.indices
                .iter()
                .map(|&i| record.get(i).unwrap_or("").to_string())
                .collect(),
        ))
    }

    /// Line number of the record just read
    pub fn line(&self, record: &csv::StringRecord) -> u64 {
        record.position().map(|p| p.line()).unwrap_or(0)
    }
}
