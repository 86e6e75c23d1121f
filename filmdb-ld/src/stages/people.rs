//! People stage

use csv::StringRecord;
use filmdb_common::tsv::{nullable, parse_int};
use tracing::{info, warn};

use super::{count_of, fetch_int_column, StageCounts};
use crate::batch::{BatchInsert, SqlValue};
use crate::error::{LoadError, LoadResult};
use crate::pipeline::LoadContext;
use crate::sources::ColumnReader;

const SOURCE_COLUMNS: [&str; 5] = ["nconst", "primaryName", "birthYear", "deathYear", "primaryProfession"];

const PEOPLE_COLUMNS: [&str; 6] = [
    "pId",
    "primaryName",
    "birthYear",
    "deathYear",
    "primaryProfession",
    "currentStudioId",
];

pub async fn load(ctx: &mut LoadContext) -> LoadResult<StageCounts> {
    let path = ctx.inputs.working_set.people();
    let mut reader = ColumnReader::open(&path, &SOURCE_COLUMNS)?;
    let mut tx = ctx.pool.begin().await?;

    let studio_ids = fetch_int_column(&mut tx, "SELECT studioId FROM Studio ORDER BY studioId").await?;
    if studio_ids.is_empty() {
        return Err(LoadError::Precondition(
            "people need studios; run the studios stage first".to_string(),
        ));
    }

    let mut batch = BatchInsert::new("People", &PEOPLE_COLUMNS, ctx.config.batch_size);
    let mut record = StringRecord::new();
    let mut skipped = 0usize;
    while let Some(fields) = reader.next_fields(&mut record)? {
        let Some(person_id) = nullable(&fields[0]) else {
            skipped += 1;
            warn!("Skipping person without id at {}:{}", path.display(), reader.line(&record));
            continue;
        };
        let studio = ctx.synth.pick(&studio_ids).copied();
        let row: Vec<SqlValue> = vec![
            person_id.into(),
            nullable(&fields[1]).unwrap_or("").into(),
            parse_int(&fields[2]).into(),
            parse_int(&fields[3]).into(),
            nullable(&fields[4]).into(),
            studio.into(),
        ];
        batch.push(&mut tx, row).await?;
    }
    batch.flush(&mut tx).await?;
    tx.commit().await?;

    info!("✓ Inserted {} people ({} skipped)", batch.rows_written(), skipped);
    Ok(vec![count_of(&batch)])
}
