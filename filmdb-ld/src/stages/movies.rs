//! Movies stage

use csv::StringRecord;
use filmdb_common::config::LoadConfig;
use filmdb_common::tsv::{nullable, parse_int};
use tracing::{info, warn};

use super::{count_of, StageCounts};
use crate::batch::{BatchInsert, SqlValue};
use crate::error::LoadResult;
use crate::pipeline::LoadContext;
use crate::sources::ColumnReader;

const SOURCE_COLUMNS: [&str; 6] = [
    "tconst",
    "titleType",
    "primaryTitle",
    "originalTitle",
    "startYear",
    "runtimeMinutes",
];

const MOVIE_COLUMNS: [&str; 7] = [
    "movieId",
    "primaryTitle",
    "originalTitle",
    "titleType",
    "startYear",
    "runtimeMinutes",
    "releaseYear",
];

/// Why a movie row was not loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingId,
    MissingYear,
    TooEarly(i64),
}

/// Build the Movies row for one working-set record
///
/// The original title falls back to the primary title, the runtime to the
/// configured fallback, and the release year mirrors the start year.
pub fn movie_row(fields: &[String], config: &LoadConfig) -> Result<Vec<SqlValue>, SkipReason> {
    let movie_id = nullable(&fields[0]).ok_or(SkipReason::MissingId)?;
    let title_type = nullable(&fields[1]);
    let primary_title = nullable(&fields[2]).unwrap_or("");
    let original_title = nullable(&fields[3]).unwrap_or(primary_title);
    let start_year = parse_int(&fields[4]).ok_or(SkipReason::MissingYear)?;
    if start_year < config.min_year {
        return Err(SkipReason::TooEarly(start_year));
    }
    let runtime = parse_int(&fields[5])
        .filter(|minutes| *minutes > 0)
        .unwrap_or(config.runtime_fallback);

    Ok(vec![
        movie_id.into(),
        primary_title.into(),
        original_title.into(),
        title_type.into(),
        SqlValue::Int(start_year),
        SqlValue::Int(runtime),
        SqlValue::Int(start_year),
    ])
}

pub async fn load(ctx: &mut LoadContext) -> LoadResult<StageCounts> {
    let path = ctx.inputs.working_set.movies();
    let mut reader = ColumnReader::open(&path, &SOURCE_COLUMNS)?;
    let mut batch = BatchInsert::new("Movies", &MOVIE_COLUMNS, ctx.config.batch_size);
    let mut tx = ctx.pool.begin().await?;

    let mut record = StringRecord::new();
    let mut skipped = 0usize;
    while let Some(fields) = reader.next_fields(&mut record)? {
        match movie_row(&fields, &ctx.config) {
            Ok(row) => batch.push(&mut tx, row).await?,
            Err(reason) => {
                skipped += 1;
                warn!(
                    "Skipping movie at {}:{} ({:?})",
                    reader.path().display(),
                    reader.line(&record),
                    reason
                );
            }
        }
    }
    batch.flush(&mut tx).await?;
    tx.commit().await?;

    info!("✓ Inserted {} movies ({} skipped)", batch.rows_written(), skipped);
    Ok(vec![count_of(&batch)])
}
