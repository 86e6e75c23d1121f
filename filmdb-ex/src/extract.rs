//! IMDb dump extraction
//!
//! Reduces the four raw dumps to a bounded, internally consistent working set:
//! recent titles (capped), then the principals, crew and people that refer to
//! them.

use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use filmdb_common::config::ExtractConfig;
use filmdb_common::layout::IntermediateFiles;
use filmdb_common::tsv::{column_index, is_null, parse_int, tsv_reader};
use tracing::info;

use crate::error::{ExtractError, ExtractResult};
use crate::filter::{filter_by_key, filtered_copy, ChunkSize, CopyStats, Decision};

/// Raw dump locations
#[derive(Debug, Clone)]
pub struct InputFiles {
    pub titles: PathBuf,
    pub principals: PathBuf,
    pub crew: PathBuf,
    pub people: PathBuf,
}

impl InputFiles {
    /// Standard IMDb dump names inside `raw_dir`
    pub fn in_dir(raw_dir: &Path) -> Self {
        Self {
            titles: raw_dir.join("title.basics.tsv"),
            principals: raw_dir.join("title.principals.tsv"),
            crew: raw_dir.join("title.crew.tsv"),
            people: raw_dir.join("name.basics.tsv"),
        }
    }

    /// Fail on the first missing file
    pub fn ensure_present(&self) -> ExtractResult<()> {
        for path in [&self.titles, &self.principals, &self.crew, &self.people] {
            if !path.is_file() {
                return Err(ExtractError::MissingInput(path.clone()));
            }
        }
        Ok(())
    }
}

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default)]
pub struct ExtractSummary {
    pub movies: CopyStats,
    pub principals: CopyStats,
    pub crew: CopyStats,
    pub people_ids: usize,
    pub people: CopyStats,
}

/// Source extractor
pub struct Extractor {
    config: ExtractConfig,
    inputs: InputFiles,
    outputs: IntermediateFiles,
}

impl Extractor {
    pub fn new(config: ExtractConfig) -> Self {
        let inputs = InputFiles::in_dir(&config.raw_dir);
        let outputs = IntermediateFiles::new(config.output_dir.clone());
        Self {
            config,
            inputs,
            outputs,
        }
    }

    pub fn outputs(&self) -> &IntermediateFiles {
        &self.outputs
    }

    /// Run all four steps
    ///
    /// Every input is checked up front, so a missing file leaves no partial
    /// output behind.
    pub fn run(&self) -> ExtractResult<ExtractSummary> {
        self.inputs.ensure_present()?;
        std::fs::create_dir_all(self.outputs.dir())?;

        let (movie_ids, movies) = self.filter_movies()?;
        let principals = self.filter_principals(&movie_ids)?;
        let crew = self.filter_crew(&movie_ids)?;
        let people_ids = self.collect_people_ids()?;
        let people = self.filter_people(&people_ids)?;

        Ok(ExtractSummary {
            movies,
            principals,
            crew,
            people_ids: people_ids.len(),
            people,
        })
    }

    /// Step 1: first N recent titles of an allowed type
    fn filter_movies(&self) -> ExtractResult<(HashSet<String>, CopyStats)> {
        info!("Filtering movies ({})...", self.inputs.titles.display());

        let allowed: HashSet<&str> = self.config.title_types.iter().map(String::as_str).collect();
        let limit = self.config.movie_limit;
        let min_year = self.config.min_year;
        let mut ordered_ids: Vec<String> = Vec::new();

        let stats = filtered_copy(
            &self.inputs.titles,
            &self.outputs.movies(),
            &["tconst", "titleType", "startYear"],
            ChunkSize::Rows(self.config.chunk_size),
            |row| {
                if ordered_ids.len() >= limit {
                    return Decision::Stop;
                }
                let type_ok = row.get("titleType").is_some_and(|t| allowed.contains(t));
                let year_ok = row
                    .get("startYear")
                    .and_then(parse_int)
                    .is_some_and(|year| year >= min_year);
                match row.get("tconst") {
                    Some(id) if type_ok && year_ok => {
                        ordered_ids.push(id.to_string());
                        Decision::Keep
                    }
                    _ => Decision::Skip,
                }
            },
        )?;

        write_id_list(&self.outputs.movie_ids(), ordered_ids.iter())?;
        info!(
            "✓ Saved {} movies to {}",
            stats.rows_kept,
            self.outputs.movies().display()
        );

        Ok((ordered_ids.into_iter().collect(), stats))
    }

    /// Step 2: principals of working movies, streamed in chunks
    fn filter_principals(&self, movie_ids: &HashSet<String>) -> ExtractResult<CopyStats> {
        info!("Filtering principals ({})...", self.inputs.principals.display());
        let stats = filter_by_key(
            &self.inputs.principals,
            &self.outputs.principals(),
            "tconst",
            movie_ids,
            ChunkSize::Rows(self.config.chunk_size),
        )?;
        info!(
            "✓ Saved {} principals ({} chunks) to {}",
            stats.rows_kept,
            stats.chunks,
            self.outputs.principals().display()
        );
        Ok(stats)
    }

    /// Step 3: crew of working movies, single pass
    fn filter_crew(&self, movie_ids: &HashSet<String>) -> ExtractResult<CopyStats> {
        info!("Filtering crew ({})...", self.inputs.crew.display());
        let stats = filter_by_key(
            &self.inputs.crew,
            &self.outputs.crew(),
            "tconst",
            movie_ids,
            ChunkSize::Unbounded,
        )?;
        info!("✓ Saved {} crew rows to {}", stats.rows_kept, self.outputs.crew().display());
        Ok(stats)
    }

    /// Step 4a: distinct person ids referenced by the retained principals
    fn collect_people_ids(&self) -> ExtractResult<BTreeSet<String>> {
        info!("Extracting people IDs from {}...", self.outputs.principals().display());

        let path = self.outputs.principals();
        let mut reader = tsv_reader(&path)?;
        let headers = reader.headers()?.clone();
        let index = column_index(&headers, "nconst").ok_or_else(|| ExtractError::MissingColumn {
            path: path.clone(),
            column: "nconst".to_string(),
        })?;

        let mut people_ids = BTreeSet::new();
        for record in reader.records() {
            let record = record?;
            if let Some(id) = record.get(index).filter(|id| !is_null(id)) {
                people_ids.insert(id.to_string());
            }
        }

        write_id_list(&self.outputs.people_ids(), people_ids.iter())?;
        info!("Found {} unique people", people_ids.len());
        Ok(people_ids)
    }

    /// Step 4b: people rows for the collected ids, streamed in chunks
    fn filter_people(&self, people_ids: &BTreeSet<String>) -> ExtractResult<CopyStats> {
        info!("Filtering people ({})...", self.inputs.people.display());
        let keys: HashSet<String> = people_ids.iter().cloned().collect();
        let stats = filter_by_key(
            &self.inputs.people,
            &self.outputs.people(),
            "nconst",
            &keys,
            ChunkSize::Rows(self.config.chunk_size),
        )?;
        info!("✓ Saved {} people to {}", stats.rows_kept, self.outputs.people().display());
        Ok(stats)
    }
}

fn write_id_list<'a>(path: &Path, ids: impl Iterator<Item = &'a String>) -> ExtractResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for id in ids {
        writeln!(out, "{}", id)?;
    }
    out.flush()?;
    Ok(())
}
