//! Reviews stage
//!
//! Review texts come from a sentiment corpus (`text,label` rows). A uniform
//! sample of the configured size is drawn in one pass; each sampled text is
//! attached to a random user and movie with a random rating and timestamp.

use std::path::Path;

use csv::StringRecord;
use tracing::{info, warn};

use super::{count_of, fetch_int_column, loaded_movie_ids, StageCounts, TableCount};
use crate::batch::{BatchInsert, SqlValue};
use crate::error::LoadResult;
use crate::pipeline::LoadContext;
use crate::sources::require;
use crate::synthetic::{Synthetic, TIMESTAMP_FORMAT};

const REVIEW_COLUMNS: [&str; 5] = ["userId", "movieId", "post_time", "content", "rating"];

/// Replace HTML line breaks with spaces
pub fn clean_review_text(text: &str) -> String {
    text.replace("<br />", " ")
}

/// Uniform sample of at most `size` review texts from the corpus
pub fn sample_reviews(path: &Path, size: usize, synth: &mut Synthetic) -> LoadResult<Vec<String>> {
    require(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut sample = synth.reservoir(size);
    let mut record = StringRecord::new();
    let mut first = true;
    while reader.read_record(&mut record)? {
        let text = record.get(0).unwrap_or("").trim_start_matches('\u{feff}');
        let label = record.get(1).unwrap_or("").trim();
        let is_header = first && label.eq_ignore_ascii_case("sentiment");
        first = false;
        if is_header || text.trim().is_empty() {
            continue;
        }
        sample.offer(text.to_string());
    }
    Ok(sample.into_items())
}

pub async fn load(ctx: &mut LoadContext) -> LoadResult<StageCounts> {
    let mut tx = ctx.pool.begin().await?;
    let user_ids = fetch_int_column(&mut tx, "SELECT userId FROM User ORDER BY userId").await?;
    let movie_ids = loaded_movie_ids(&mut tx).await?;

    if user_ids.is_empty() || movie_ids.is_empty() {
        warn!(
            "No users ({}) or movies ({}); cannot insert reviews",
            user_ids.len(),
            movie_ids.len()
        );
        return Ok(vec![TableCount {
            table: "Review".to_string(),
            rows: 0,
        }]);
    }

    let texts = sample_reviews(&ctx.inputs.reviews, ctx.config.review_sample_size, &mut ctx.synth)?;
    let (start_year, end_year) = ctx.config.review_window;

    let mut batch = BatchInsert::new("Review", &REVIEW_COLUMNS, ctx.config.batch_size);
    for text in texts {
        let (Some(&user_id), Some(movie_id)) = (ctx.synth.pick(&user_ids), ctx.synth.pick(&movie_ids)) else {
            continue;
        };
        let movie_id = movie_id.clone();
        let post_time = ctx
            .synth
            .timestamp_in(start_year, end_year)
            .format(TIMESTAMP_FORMAT)
            .to_string();
        let rating = ctx.synth.rating();
        let row = vec![
            SqlValue::Int(user_id),
            movie_id.into(),
            post_time.into(),
            clean_review_text(&text).into(),
            SqlValue::Int(rating),
        ];
        batch.push(&mut tx, row).await?;
    }
    batch.flush(&mut tx).await?;
    tx.commit().await?;

    info!("✓ Inserted {} reviews", batch.rows_written());
    Ok(vec![count_of(&batch)])
}
