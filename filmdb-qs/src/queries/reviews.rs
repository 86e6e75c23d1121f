//! Review write path
//!
//! Validation happens before any statement is issued. Failures never
//! propagate as errors; they come back as `success: false` with a message.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::lookup::{find_movie_id, TitleLookup};

/// Timestamp format accepted for `post_time`
pub const POST_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const INSERT_REVIEW: &str =
    "INSERT INTO Review (userId, movieId, rating, content, post_time) VALUES (?, ?, ?, ?, ?)";

/// A review for an already resolved movie
#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: i64,
    pub movie_id: String,
    pub rating: i64,
    pub content: String,
    pub post_time: String,
}

/// A review as submitted over HTTP: by title, timestamp optional
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewSubmission {
    pub user_id: i64,
    pub movie_title: String,
    pub rating: i64,
    pub content: String,
    #[serde(default)]
    pub post_time: Option<String>,
}

/// Result of a write attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewOutcome {
    pub success: bool,
    pub message: String,
}

impl ReviewOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl NewReview {
    /// Reject the review before touching storage
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=10).contains(&self.rating) {
            return Err("Rating must be between 1 and 10.".to_string());
        }
        if self.content.trim().is_empty() {
            return Err("Review content must not be empty.".to_string());
        }
        if NaiveDateTime::parse_from_str(&self.post_time, POST_TIME_FORMAT).is_err() {
            return Err(format!(
                "Post time '{}' must be formatted as YYYY-MM-DD HH:MM:SS.",
                self.post_time
            ));
        }
        if self.user_id <= 0 {
            return Err("User id must be a positive integer.".to_string());
        }
        Ok(())
    }
}

/// Insert a review for a known movie id
pub async fn insert_review(pool: &SqlitePool, review: &NewReview) -> ReviewOutcome {
    if let Err(message) = review.validate() {
        return ReviewOutcome::rejected(message);
    }

    let result = sqlx::query(INSERT_REVIEW)
        .bind(review.user_id)
        .bind(&review.movie_id)
        .bind(review.rating)
        .bind(&review.content)
        .bind(&review.post_time)
        .execute(pool)
        .await;

    match result {
        Ok(done) if done.rows_affected() == 1 => {
            info!("Review inserted for movie {} by user {}", review.movie_id, review.user_id);
            ReviewOutcome::ok("Review inserted successfully.")
        }
        Ok(done) => ReviewOutcome::rejected(format!(
            "Unexpected row count {} (check user id and movie id).",
            done.rows_affected()
        )),
        Err(e) => {
            warn!("Review insert failed: {}", e);
            ReviewOutcome::rejected(format!("Database error: {}", e))
        }
    }
}

/// Resolve the title, default the timestamp to now, then insert
pub async fn submit_review(pool: &SqlitePool, submission: ReviewSubmission) -> ReviewOutcome {
    let lookup = match find_movie_id(pool, &submission.movie_title).await {
        Ok(lookup) => lookup,
        Err(e) => return ReviewOutcome::rejected(format!("Database error: {}", e)),
    };
    let movie_id = match lookup {
        TitleLookup::Found(id) => id,
        other => return ReviewOutcome::rejected(other.message(&submission.movie_title)),
    };

    let post_time = submission
        .post_time
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| Local::now().format(POST_TIME_FORMAT).to_string());

    let review = NewReview {
        user_id: submission.user_id,
        movie_id,
        rating: submission.rating,
        content: submission.content,
        post_time,
    };
    insert_review(pool, &review).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review() -> NewReview {
        NewReview {
            user_id: 1,
            movie_id: "tt1".to_string(),
            rating: 8,
            content: "Solid.".to_string(),
            post_time: "2024-05-01 12:30:00".to_string(),
        }
    }

    #[test]
    fn test_valid_review() {
        assert!(review().validate().is_ok());
    }

    #[test]
    fn test_rating_bounds() {
        for rating in [0, 11, -3] {
            let r = NewReview { rating, ..review() };
            assert_eq!(r.validate().unwrap_err(), "Rating must be between 1 and 10.");
        }
        for rating in [1, 10] {
            assert!(NewReview { rating, ..review() }.validate().is_ok());
        }
    }

    #[test]
    fn test_required_fields() {
        assert!(NewReview { content: "  ".into(), ..review() }.validate().is_err());
        assert!(NewReview { post_time: "2024-05-01".into(), ..review() }.validate().is_err());
        assert!(NewReview { user_id: 0, ..review() }.validate().is_err());
    }
}
