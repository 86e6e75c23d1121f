//! Awards stage: award catalog, then randomized Wins_Award rows
//!
//! Each loaded movie released no later than the cutoff year wins one random
//! award with the configured probability, in a year between its release and
//! the cutoff. A rerun appends a fresh catalog and draws wins from it only.

use std::path::Path;

use csv::StringRecord;
use filmdb_common::tsv::{nullable, parse_int};
use tracing::info;

use super::{count_of, fetch_int_column, loaded_movie_set, StageCounts};
use crate::batch::{BatchInsert, SqlValue};
use crate::error::{LoadError, LoadResult};
use crate::pipeline::LoadContext;
use crate::sources::{require, ColumnReader};
use crate::synthetic::AWARD_LIST;

const MAX_AWARD_ID: &str = "SELECT COALESCE(MAX(awardId), 0) FROM Award";

/// Award names from a one-per-line file, or the built-in catalog
pub fn award_names(file: Option<&Path>) -> LoadResult<Vec<String>> {
    match file {
        Some(path) => {
            require(path)?;
            let names: Vec<String> = std::fs::read_to_string(path)?
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect();
            if names.is_empty() {
                return Err(LoadError::InvalidRecord {
                    file: path.to_path_buf(),
                    line: 0,
                    reason: "award list is empty".to_string(),
                });
            }
            Ok(names)
        }
        None => Ok(AWARD_LIST.iter().map(|name| name.to_string()).collect()),
    }
}

pub async fn load(ctx: &mut LoadContext) -> LoadResult<StageCounts> {
    let names = award_names(ctx.inputs.awards.as_deref())?;
    let path = ctx.inputs.working_set.movies();
    let mut reader = ColumnReader::open(&path, &["tconst", "startYear"])?;
    let mut tx = ctx.pool.begin().await?;

    let previous_max: i64 = sqlx::query_scalar(MAX_AWARD_ID)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| LoadError::statement(MAX_AWARD_ID, "()", e))?;

    let mut catalog = BatchInsert::new("Award", &["awardName"], ctx.config.batch_size);
    for name in names {
        catalog.push(&mut tx, vec![name.into()]).await?;
    }
    catalog.flush(&mut tx).await?;

    let award_ids: Vec<i64> = fetch_int_column(&mut tx, "SELECT awardId FROM Award ORDER BY awardId")
        .await?
        .into_iter()
        .filter(|id| *id > previous_max)
        .collect();
    let movies = loaded_movie_set(&mut tx).await?;
    let cutoff = ctx.config.award_cutoff_year;

    let mut wins = BatchInsert::new("Wins_Award", &["movieId", "awardId", "year"], ctx.config.batch_size);
    let mut record = StringRecord::new();
    while let Some(fields) = reader.next_fields(&mut record)? {
        let (Some(movie_id), Some(year)) = (nullable(&fields[0]), parse_int(&fields[1])) else {
            continue;
        };
        if year > cutoff || !movies.contains(movie_id) {
            continue;
        }
        if !ctx.synth.chance(ctx.config.award_probability) {
            continue;
        }
        let Some(&award_id) = ctx.synth.pick(&award_ids) else {
            continue;
        };
        let win_year = ctx.synth.between(year, cutoff);
        wins.push(
            &mut tx,
            vec![movie_id.into(), SqlValue::Int(award_id), SqlValue::Int(win_year)],
        )
        .await?;
    }
    wins.flush(&mut tx).await?;
    tx.commit().await?;

    info!(
        "✓ Inserted {} awards, {} award wins",
        catalog.rows_written(),
        wins.rows_written()
    );
    Ok(vec![count_of(&catalog), count_of(&wins)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_award_names() {
        let names = award_names(None).unwrap();
        assert_eq!(names.len(), 8);
        assert_eq!(names[0], "Academy Award Best Picture");
    }

    #[test]
    fn test_award_names_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("awards.txt");
        std::fs::write(&path, "Best Picture\n\n  Best Score \n").unwrap();
        assert_eq!(award_names(Some(&path)).unwrap(), vec!["Best Picture", "Best Score"]);
    }

    #[test]
    fn test_empty_award_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("awards.txt");
        std::fs::write(&path, "\n").unwrap();
        assert!(matches!(
            award_names(Some(&path)),
            Err(LoadError::InvalidRecord { .. })
        ));
    }
}
