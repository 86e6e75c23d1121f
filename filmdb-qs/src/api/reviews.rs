//! Review submission endpoint

use axum::{extract::State, Json};

use crate::queries::{submit_review, ReviewOutcome, ReviewSubmission};
use crate::AppState;

/// POST /api/reviews
///
/// Always answers 200; `success` tells whether the row was written.
pub async fn post_review(
    State(state): State<AppState>,
    Json(submission): Json<ReviewSubmission>,
) -> Json<ReviewOutcome> {
    Json(submit_review(&state.db, submission).await)
}
