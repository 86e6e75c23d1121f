//! Movie title lookup

use sqlx::SqlitePool;

use crate::error::QueryResult;

/// Outcome of resolving a title to a movie id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleLookup {
    Found(String),
    NotFound,
    /// Start year of every match, in id order
    Ambiguous(Vec<Option<i64>>),
}

impl TitleLookup {
    pub fn movie_id(&self) -> Option<&str> {
        match self {
            TitleLookup::Found(id) => Some(id),
            _ => None,
        }
    }

    /// Operator-facing explanation; empty when the title resolved
    pub fn message(&self, title: &str) -> String {
        match self {
            TitleLookup::Found(_) => String::new(),
            TitleLookup::NotFound => format!("No movie found with title '{}'", title),
            TitleLookup::Ambiguous(years) => {
                let years: Vec<String> = years.iter().flatten().map(|y| y.to_string()).collect();
                let years = if years.is_empty() {
                    "various years".to_string()
                } else {
                    years.join(", ")
                };
                format!(
                    "Multiple movies found with title '{}' ({}). Please be more specific.",
                    title, years
                )
            }
        }
    }
}

/// Resolve an exact primary title to its movie id
pub async fn find_movie_id(pool: &SqlitePool, title: &str) -> QueryResult<TitleLookup> {
    let rows: Vec<(String, Option<i64>)> =
        sqlx::query_as("SELECT movieId, startYear FROM Movies WHERE primaryTitle = ? ORDER BY movieId")
            .bind(title)
            .fetch_all(pool)
            .await?;

    Ok(match rows.len() {
        0 => TitleLookup::NotFound,
        1 => TitleLookup::Found(rows[0].0.clone()),
        _ => TitleLookup::Ambiguous(rows.into_iter().map(|(_, year)| year).collect()),
    })
}
