//! Genres stage: Genre catalog and Has_Genre links
//!
//! Only the first listed genre of each movie is recorded. A genre is
//! inserted the first time it is seen; later movies reuse its id.

use std::collections::HashMap;

use csv::StringRecord;
use filmdb_common::tsv::nullable;
use sqlx::SqliteConnection;
use tracing::info;

use super::{count_of, loaded_movie_set, StageCounts, TableCount};
use crate::batch::{format_params, BatchInsert, SqlValue};
use crate::error::{LoadError, LoadResult};
use crate::pipeline::LoadContext;
use crate::sources::ColumnReader;

const INSERT_GENRE: &str = "INSERT INTO Genre (name) VALUES (?)";

/// First entry of a comma-separated genre list
pub fn primary_genre(genres: &str) -> Option<&str> {
    let first = nullable(genres)?.split(',').next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first)
    }
}

async fn insert_genre(conn: &mut SqliteConnection, name: &str) -> LoadResult<i64> {
    let done = sqlx::query(INSERT_GENRE)
        .bind(name)
        .execute(&mut *conn)
        .await
        .map_err(|e| LoadError::statement(INSERT_GENRE, format_params(&[SqlValue::from(name)]), e))?;
    Ok(done.last_insert_rowid())
}

pub async fn load(ctx: &mut LoadContext) -> LoadResult<StageCounts> {
    let path = ctx.inputs.working_set.movies();
    let mut reader = ColumnReader::open(&path, &["tconst", "genres"])?;
    let mut tx = ctx.pool.begin().await?;
    let movies = loaded_movie_set(&mut tx).await?;

    let mut genre_ids: HashMap<String, i64> = HashMap::new();
    let mut links = BatchInsert::new("Has_Genre", &["movieId", "genreId"], ctx.config.batch_size);
    let mut record = StringRecord::new();
    while let Some(fields) = reader.next_fields(&mut record)? {
        let Some(movie_id) = nullable(&fields[0]) else {
            continue;
        };
        if !movies.contains(movie_id) {
            continue;
        }
        let Some(genre) = primary_genre(&fields[1]) else {
            continue;
        };
        let genre_id = match genre_ids.get(genre) {
            Some(&id) => id,
            None => {
                let id = insert_genre(&mut tx, genre).await?;
                genre_ids.insert(genre.to_string(), id);
                id
            }
        };
        links.push(&mut tx, vec![movie_id.into(), SqlValue::Int(genre_id)]).await?;
    }
    links.flush(&mut tx).await?;
    tx.commit().await?;

    info!("✓ Inserted {} genres, {} genre links", genre_ids.len(), links.rows_written());
    Ok(vec![
        TableCount {
            table: "Genre".to_string(),
            rows: genre_ids.len() as u64,
        },
        count_of(&links),
    ])
}
