//! Favorites stage

use tracing::{info, warn};

use super::{count_of, fetch_int_column, loaded_movie_ids, StageCounts};
use crate::batch::{BatchInsert, SqlValue};
use crate::error::LoadResult;
use crate::pipeline::LoadContext;

pub async fn load(ctx: &mut LoadContext) -> LoadResult<StageCounts> {
    let mut tx = ctx.pool.begin().await?;
    let user_ids = fetch_int_column(&mut tx, "SELECT userId FROM User ORDER BY userId").await?;
    let movie_ids = loaded_movie_ids(&mut tx).await?;

    let (min, max) = ctx.config.favorites_range;
    if movie_ids.len() < min {
        warn!(
            "Only {} movies loaded; favorite lists are capped below {}",
            movie_ids.len(),
            min
        );
    }

    let mut batch = BatchInsert::new("Favorites", &["userId", "movieId"], ctx.config.batch_size);
    for user_id in user_ids {
        for movie_id in ctx.synth.subset(&movie_ids, (min, max)) {
            batch
                .push(&mut tx, vec![SqlValue::Int(user_id), movie_id.as_str().into()])
                .await?;
        }
    }
    batch.flush(&mut tx).await?;
    tx.commit().await?;

    info!("✓ Inserted {} favorites", batch.rows_written());
    Ok(vec![count_of(&batch)])
}
