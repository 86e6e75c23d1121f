//! Studios stage: studio catalog, then Produced_By links

use std::path::Path;

use csv::StringRecord;
use filmdb_common::layout::read_id_list;
use filmdb_common::tsv::{self, nullable};
use sqlx::SqliteConnection;
use tracing::{info, warn};

use super::{count_of, fetch_int_column, loaded_movie_set, StageCounts};
use crate::batch::{BatchInsert, SqlValue};
use crate::error::{LoadError, LoadResult};
use crate::pipeline::LoadContext;
use crate::sources::require;

/// Insert every row of a headered TSV file into `table`
///
/// The header names the target columns. Null fields are stored as NULL.
/// Returns the number of rows inserted.
pub async fn insert_from_tsv(
    conn: &mut SqliteConnection,
    table: &str,
    path: &Path,
    batch_size: usize,
) -> LoadResult<u64> {
    require(path)?;
    let mut reader = tsv::tsv_reader(path)?;
    let headers = reader.headers()?.clone();
    let columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
    if let Some(bad) = columns.iter().find(|c| !is_identifier(c)) {
        return Err(LoadError::InvalidRecord {
            file: path.to_path_buf(),
            line: 1,
            reason: format!("'{}' is not a column name", bad),
        });
    }

    let width = columns.len();
    let mut batch = BatchInsert::with_columns(table, columns, batch_size);
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        let row: Vec<SqlValue> = (0..width)
            .map(|i| SqlValue::from(record.get(i).and_then(nullable)))
            .collect();
        batch.push(conn, row).await?;
    }
    batch.flush(conn).await?;
    Ok(batch.rows_written())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub async fn load(ctx: &mut LoadContext) -> LoadResult<StageCounts> {
    let movie_ids_path = ctx.inputs.working_set.movie_ids();
    require(&ctx.inputs.studios)?;
    require(&movie_ids_path)?;

    let mut tx = ctx.pool.begin().await?;

    let studios = insert_from_tsv(&mut tx, "Studio", &ctx.inputs.studios, ctx.config.batch_size).await?;
    info!("✓ Inserted {} studios", studios);

    let studio_ids = fetch_int_column(&mut tx, "SELECT studioId FROM Studio ORDER BY studioId").await?;
    if studio_ids.is_empty() {
        return Err(LoadError::Precondition(format!(
            "no studios available after loading {}",
            ctx.inputs.studios.display()
        )));
    }

    let loaded = loaded_movie_set(&mut tx).await?;
    let movie_ids = read_id_list(&movie_ids_path)?;
    let mut links = BatchInsert::new("Produced_By", &["movieId", "studioId"], ctx.config.batch_size);
    let mut unknown = 0usize;
    for movie_id in movie_ids {
        if !loaded.contains(&movie_id) {
            unknown += 1;
            continue;
        }
        let Some(&studio_id) = ctx.synth.pick(&studio_ids) else {
            continue;
        };
        links.push(&mut tx, vec![movie_id.into(), SqlValue::Int(studio_id)]).await?;
    }
    links.flush(&mut tx).await?;
    tx.commit().await?;

    if unknown > 0 {
        warn!("{} working-set movies are not loaded; no studio link created", unknown);
    }
    info!("✓ Linked {} movies to studios", links.rows_written());

    Ok(vec![
        super::TableCount {
            table: "Studio".to_string(),
            rows: studios,
        },
        count_of(&links),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_check() {
        assert!(is_identifier("foundedYear"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("name); DROP TABLE Movies; --"));
        assert!(!is_identifier(""));
    }
}
