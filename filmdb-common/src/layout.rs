//! Intermediate file layout
//!
//! Names of the files the extractor writes and the loader reads. This is a
//! private contract between the two tools, not a public format.

use std::path::{Path, PathBuf};

/// Filtered dataset directory
#[derive(Debug, Clone)]
pub struct IntermediateFiles {
    dir: PathBuf,
}

impl IntermediateFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Working movie rows (title.basics subset)
    pub fn movies(&self) -> PathBuf {
        self.dir.join("movies.tsv")
    }

    /// Working movie identifiers, one per line
    pub fn movie_ids(&self) -> PathBuf {
        self.dir.join("movie_ids.txt")
    }

    /// Principals restricted to the working movies
    pub fn principals(&self) -> PathBuf {
        self.dir.join("principals.tsv")
    }

    /// Crew restricted to the working movies
    pub fn crew(&self) -> PathBuf {
        self.dir.join("crew.tsv")
    }

    /// Person identifiers referenced by the retained principals
    pub fn people_ids(&self) -> PathBuf {
        self.dir.join("people_ids.txt")
    }

    /// People restricted to `people_ids`
    pub fn people(&self) -> PathBuf {
        self.dir.join("people.tsv")
    }
}

/// Read a one-identifier-per-line file, skipping blank lines
pub fn read_id_list(path: &Path) -> std::io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
