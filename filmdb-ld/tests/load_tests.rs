//! Integration tests for the bulk loader
//!
//! Each test writes a small working set into a temp directory, creates a
//! fresh database with the schema and runs the loader against it.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use filmdb_common::config::LoadConfig;
use filmdb_common::db::init_database;
use filmdb_ld::{LoadError, Loader, Stage, StageSelection};
use sqlx::SqlitePool;
use tempfile::TempDir;

const MOVIES: &str = "tconst\ttitleType\tprimaryTitle\toriginalTitle\tisAdult\tstartYear\tendYear\truntimeMinutes\tgenres
tt001\tmovie\tAlpha\tAlpha\t0\t2015\t\t\tDrama,Comedy
tt002\tmovie\tBeta\t\t0\t2016.0\t\t95\tDrama
tt003\tshort\tGamma\tGamma\t0\t2018\t\t12\tComedy
tt004\tmovie\tDelta\tDelta\t0\t2020\t\t130\t
tt005\tmovie\tEpsilon\tEpsilon\t0\t2022\t\t150\tSci-Fi
tt006\ttvSeries\tZeta\tZeta\t0\t2024\t\t45\tDrama
tt007\tmovie\tOld\tOld\t0\t1990\t\t100\tDrama
";

const MOVIE_IDS: &str = "tt001\ntt002\ntt003\ntt004\ntt005\ntt006\ntt007\n";

const PRINCIPALS: &str = "tconst\tordering\tnconst\tcategory\tjob\tcharacters
tt001\t1\tnm001\tactor\t\t
tt002\t1\tnm001\tactor\t\t
tt001\t2\tnm002\tactress\t\t
tt001\t3\tnm003\tdirector\t\t
tt002\t2\tnm003\tdirector\t\t
tt001\t4\tnm004\twriter\t\t
tt003\t1\tnm004\tproducer\t\t
tt001\t5\tnm001\tactor\t\t
tt007\t1\tnm002\tactress\t\t
tt005\t1\tnm009\tactor\t\t
";

const PEOPLE: &str = "nconst\tprimaryName\tbirthYear\tdeathYear\tprimaryProfession\tknownForTitles
nm001\tAnn Actor\t1980\t\tactor\ttt001
nm002\tBea Actress\t1985.0\t\tactress\ttt001
nm003\tDan Director\t1960\t2021\tdirector\ttt001
nm004\tWes Writer\t\t\twriter\ttt001
";

const STUDIOS: &str = "name\tfoundedYear\theadquarters
A24\t2012\tNew York
Warner Bros.\t1923\tBurbank
Paramount\t1912\t\\N
";

const USERS: &str = "username\nalice\nbob\n\ncarol\n";

const REVIEWS: &str = "review,sentiment
\"Loved it.<br /><br />Would watch again\",positive
Dull and long,negative
\"Great cast, weak plot<br />Meh\",negative
A masterpiece,positive
";

struct Fixture {
    _dir: TempDir,
    pool: SqlitePool,
    config: LoadConfig,
}

fn write_working_set(dir: &Path) {
    fs::write(dir.join("movies.tsv"), MOVIES).unwrap();
    fs::write(dir.join("movie_ids.txt"), MOVIE_IDS).unwrap();
    fs::write(dir.join("principals.tsv"), PRINCIPALS).unwrap();
    fs::write(dir.join("people.tsv"), PEOPLE).unwrap();
    fs::write(dir.join("studios.tsv"), STUDIOS).unwrap();
    fs::write(dir.join("users.csv"), USERS).unwrap();
    fs::write(dir.join("imdb_reviews.csv"), REVIEWS).unwrap();
}

async fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    write_working_set(dir.path());
    let pool = init_database(&dir.path().join("filmdb.db"), false).await.unwrap();

    let config = LoadConfig {
        data_dir: dir.path().to_path_buf(),
        studios_file: dir.path().join("studios.tsv"),
        users_file: dir.path().join("users.csv"),
        reviews_file: dir.path().join("imdb_reviews.csv"),
        batch_size: 2,
        award_probability: 1.0,
        seed: Some(42),
        ..LoadConfig::default()
    };

    Fixture {
        _dir: dir,
        pool,
        config,
    }
}

async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

// ============================================================================
// Full pipeline
// ============================================================================

#[tokio::test]
async fn test_full_load_populates_every_table() {
    let fx = fixture().await;
    let mut loader = Loader::new(fx.pool.clone(), fx.config.clone());
    let report = loader.run(StageSelection::All).await.expect("load should succeed");

    assert_eq!(report.completed(), Stage::ALL.to_vec());
    assert_eq!(report.rows_for("Movies"), 6);
    assert_eq!(count(&fx.pool, "Movies").await, 6);
    assert_eq!(count(&fx.pool, "Studio").await, 3);
    assert_eq!(count(&fx.pool, "Produced_By").await, 6);
    assert_eq!(count(&fx.pool, "People").await, 4);
    assert_eq!(count(&fx.pool, "User").await, 3);
    assert_eq!(count(&fx.pool, "Review").await, 4);
    assert_eq!(report.rows_for("Review"), 4);
}

#[tokio::test]
async fn test_missing_runtime_falls_back_and_first_genre_linked() {
    let fx = fixture().await;
    let mut loader = Loader::new(fx.pool.clone(), fx.config.clone());
    loader.run(StageSelection::All).await.unwrap();

    let (runtime, release): (i64, i64) =
        sqlx::query_as("SELECT runtimeMinutes, releaseYear FROM Movies WHERE movieId = 'tt001'")
            .fetch_one(&fx.pool)
            .await
            .unwrap();
    assert_eq!(runtime, 120);
    assert_eq!(release, 2015);

    let genres: Vec<String> = sqlx::query_scalar(
        "SELECT g.name FROM Has_Genre h JOIN Genre g ON g.genreId = h.genreId WHERE h.movieId = 'tt001'",
    )
    .fetch_all(&fx.pool)
    .await
    .unwrap();
    assert_eq!(genres, vec!["Drama"]);

    let original: String = sqlx::query_scalar("SELECT originalTitle FROM Movies WHERE movieId = 'tt002'")
        .fetch_one(&fx.pool)
        .await
        .unwrap();
    assert_eq!(original, "Beta");
}

#[tokio::test]
async fn test_genres_are_unique_and_reused() {
    let fx = fixture().await;
    let mut loader = Loader::new(fx.pool.clone(), fx.config.clone());
    loader.run(StageSelection::All).await.unwrap();

    let names: Vec<String> = sqlx::query_scalar("SELECT name FROM Genre ORDER BY name")
        .fetch_all(&fx.pool)
        .await
        .unwrap();
    assert_eq!(names, vec!["Comedy", "Drama", "Sci-Fi"]);
    // tt004 has no genre
    assert_eq!(count(&fx.pool, "Has_Genre").await, 5);
}

#[tokio::test]
async fn test_roles_created_once_with_memberships() {
    let fx = fixture().await;
    let mut loader = Loader::new(fx.pool.clone(), fx.config.clone());
    loader.run(StageSelection::All).await.unwrap();

    assert_eq!(count(&fx.pool, "Actor").await, 2);
    assert_eq!(count(&fx.pool, "Acts_In").await, 3);
    assert_eq!(count(&fx.pool, "Director").await, 1);
    assert_eq!(count(&fx.pool, "Directs").await, 2);
    assert_eq!(count(&fx.pool, "Writer").await, 1);
    assert_eq!(count(&fx.pool, "Writes_Script_For").await, 1);

    let best_known: String =
        sqlx::query_scalar("SELECT best_known_movieId FROM Director WHERE directorId = 'nm003'")
            .fetch_one(&fx.pool)
            .await
            .unwrap();
    assert_eq!(best_known, "tt001");

    let fans: Vec<i64> = sqlx::query_scalar("SELECT number_of_fans FROM Actor")
        .fetch_all(&fx.pool)
        .await
        .unwrap();
    assert!(fans.iter().all(|f| (0..=3000).contains(f)));
}

#[tokio::test]
async fn test_people_get_loaded_studios() {
    let fx = fixture().await;
    let mut loader = Loader::new(fx.pool.clone(), fx.config.clone());
    loader.run(StageSelection::All).await.unwrap();

    let orphans: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM People p LEFT JOIN Studio s ON s.studioId = p.currentStudioId WHERE s.studioId IS NULL",
    )
    .fetch_one(&fx.pool)
    .await
    .unwrap();
    assert_eq!(orphans, 0);

    let birth: i64 = sqlx::query_scalar("SELECT birthYear FROM People WHERE pId = 'nm002'")
        .fetch_one(&fx.pool)
        .await
        .unwrap();
    assert_eq!(birth, 1985);
}

#[tokio::test]
async fn test_award_years_within_bounds() {
    let fx = fixture().await;
    let mut loader = Loader::new(fx.pool.clone(), fx.config.clone());
    loader.run(StageSelection::All).await.unwrap();

    assert_eq!(count(&fx.pool, "Award").await, 8);
    let wins: Vec<(i64, i64)> = sqlx::query_as(
        "SELECT w.year, m.startYear FROM Wins_Award w JOIN Movies m ON m.movieId = w.movieId",
    )
    .fetch_all(&fx.pool)
    .await
    .unwrap();
    // probability 1.0: every loaded movie wins once
    assert_eq!(wins.len(), 6);
    for (year, start) in wins {
        assert!(year >= start && year <= 2025, "win year {} for movie from {}", year, start);
    }
}

#[tokio::test]
async fn test_reviews_cleaned_and_rated() {
    let fx = fixture().await;
    let mut loader = Loader::new(fx.pool.clone(), fx.config.clone());
    loader.run(StageSelection::All).await.unwrap();

    let rows: Vec<(String, i64, String)> =
        sqlx::query_as("SELECT content, rating, post_time FROM Review")
            .fetch_all(&fx.pool)
            .await
            .unwrap();
    assert_eq!(rows.len(), 4);
    for (content, rating, post_time) in rows {
        assert!(!content.contains("<br />"), "unstripped: {}", content);
        assert!((1..=10).contains(&rating));
        let parsed = chrono::NaiveDateTime::parse_from_str(&post_time, "%Y-%m-%d %H:%M:%S").unwrap();
        let year = chrono::Datelike::year(&parsed);
        assert!((2019..=2024).contains(&year));
    }
}

#[tokio::test]
async fn test_favorites_distinct_and_sized() {
    let fx = fixture().await;
    let mut loader = Loader::new(fx.pool.clone(), fx.config.clone());
    loader.run(StageSelection::All).await.unwrap();

    let user_ids: Vec<i64> = sqlx::query_scalar("SELECT userId FROM User")
        .fetch_all(&fx.pool)
        .await
        .unwrap();
    for user_id in user_ids {
        let movies: Vec<String> = sqlx::query_scalar("SELECT movieId FROM Favorites WHERE userId = ?")
            .bind(user_id)
            .fetch_all(&fx.pool)
            .await
            .unwrap();
        // six movies loaded, so lists hold five or six entries
        assert!((5..=6).contains(&movies.len()), "user {} has {}", user_id, movies.len());
        let distinct: HashSet<_> = movies.iter().collect();
        assert_eq!(distinct.len(), movies.len());
    }
}

// ============================================================================
// Failure handling
// ============================================================================

#[tokio::test]
async fn test_rerunning_movies_fails_on_unique_key() {
    let fx = fixture().await;
    let mut loader = Loader::new(fx.pool.clone(), fx.config.clone());
    loader.run(StageSelection::Only(Stage::Movies)).await.unwrap();

    let err = loader.run(StageSelection::Only(Stage::Movies)).await.unwrap_err();
    assert!(err.is_unique_violation());
    assert!(matches!(err, LoadError::StageFailed { stage: Stage::Movies, .. }));
    assert_eq!(count(&fx.pool, "Movies").await, 6);
}

#[tokio::test]
async fn test_rerunning_genres_fails_without_duplicates() {
    let fx = fixture().await;
    let mut loader = Loader::new(fx.pool.clone(), fx.config.clone());
    loader.run(StageSelection::Only(Stage::Movies)).await.unwrap();
    loader.run(StageSelection::Only(Stage::Genres)).await.unwrap();

    let err = loader.run(StageSelection::Only(Stage::Genres)).await.unwrap_err();
    assert!(err.is_unique_violation());
    assert_eq!(count(&fx.pool, "Genre").await, 3);
    assert_eq!(count(&fx.pool, "Has_Genre").await, 5);
}

#[tokio::test]
async fn test_rerunning_people_fails_on_unique_key() {
    let fx = fixture().await;
    let mut loader = Loader::new(fx.pool.clone(), fx.config.clone());
    loader.run(StageSelection::Only(Stage::Studios)).await.unwrap();
    loader.run(StageSelection::Only(Stage::People)).await.unwrap();

    let err = loader.run(StageSelection::Only(Stage::People)).await.unwrap_err();
    assert!(err.is_unique_violation());
    assert!(matches!(err, LoadError::StageFailed { stage: Stage::People, .. }));
    assert_eq!(count(&fx.pool, "People").await, 4);
}

#[tokio::test]
async fn test_rerunning_awards_appends_catalog_and_wins() {
    let fx = fixture().await;
    let mut loader = Loader::new(fx.pool.clone(), fx.config.clone());
    loader.run(StageSelection::Only(Stage::Movies)).await.unwrap();
    loader.run(StageSelection::Only(Stage::Awards)).await.unwrap();
    assert_eq!(count(&fx.pool, "Award").await, 8);
    assert_eq!(count(&fx.pool, "Wins_Award").await, 6);

    loader.run(StageSelection::Only(Stage::Awards)).await.unwrap();
    assert_eq!(count(&fx.pool, "Award").await, 16);
    assert_eq!(count(&fx.pool, "Wins_Award").await, 12);

    // second run draws only from its own catalog rows
    let stale: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM Wins_Award WHERE winId > 6 AND awardId <= 8",
    )
    .fetch_one(&fx.pool)
    .await
    .unwrap();
    assert_eq!(stale, 0);
}

#[tokio::test]
async fn test_failed_stage_rolls_back_flushed_batches() {
    let fx = fixture().await;
    fs::write(
        fx.config.data_dir.join("people.tsv"),
        "nconst\tprimaryName\tbirthYear\tdeathYear\tprimaryProfession\tknownForTitles
nm001\tAnn Actor\t1980\t\tactor\ttt001
nm002\tBea Actress\t1985\t\tactress\ttt001
nm003\tDan Director\t1960\t\tdirector\ttt001
nm001\tAnn Again\t1980\t\tactor\ttt002
",
    )
    .unwrap();

    // batch_size 2: the first pair is flushed before the duplicate fails
    let mut loader = Loader::new(fx.pool.clone(), fx.config.clone());
    loader.run(StageSelection::Only(Stage::Studios)).await.unwrap();
    let err = loader.run(StageSelection::Only(Stage::People)).await.unwrap_err();

    assert!(err.is_unique_violation());
    assert_eq!(count(&fx.pool, "People").await, 0);
    assert_eq!(count(&fx.pool, "Studio").await, 3);
}

#[tokio::test]
async fn test_failed_stage_keeps_earlier_commits() {
    let fx = fixture().await;
    let mut config = fx.config.clone();
    config.users_file = fx.config.data_dir.join("missing_users.csv");

    let mut loader = Loader::new(fx.pool.clone(), config);
    let err = loader.run(StageSelection::All).await.unwrap_err();

    match err {
        LoadError::StageFailed { stage, source } => {
            assert_eq!(stage, Stage::Users);
            assert!(matches!(*source, LoadError::MissingInput(_)));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(count(&fx.pool, "Movies").await, 6);
    assert_eq!(count(&fx.pool, "Wins_Award").await, 6);
    assert_eq!(count(&fx.pool, "Review").await, 0);
    assert_eq!(count(&fx.pool, "Favorites").await, 0);
}

#[tokio::test]
async fn test_people_require_studios() {
    let fx = fixture().await;
    let mut loader = Loader::new(fx.pool.clone(), fx.config.clone());

    let err = loader.run(StageSelection::Only(Stage::People)).await.unwrap_err();
    match err {
        LoadError::StageFailed { stage, source } => {
            assert_eq!(stage, Stage::People);
            assert!(matches!(*source, LoadError::Precondition(_)));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(count(&fx.pool, "People").await, 0);
}

#[tokio::test]
async fn test_reviews_without_users_insert_nothing() {
    let fx = fixture().await;
    let mut loader = Loader::new(fx.pool.clone(), fx.config.clone());
    loader.run(StageSelection::Only(Stage::Movies)).await.unwrap();

    let report = loader.run(StageSelection::Only(Stage::Reviews)).await.unwrap();
    assert_eq!(report.rows_for("Review"), 0);
    assert_eq!(count(&fx.pool, "Review").await, 0);
}

#[tokio::test]
async fn test_resume_from_stage() {
    let fx = fixture().await;
    let mut loader = Loader::new(fx.pool.clone(), fx.config.clone());
    loader.run(StageSelection::Only(Stage::Movies)).await.unwrap();

    let report = loader.run(StageSelection::From(Stage::Studios)).await.unwrap();
    assert_eq!(report.completed().first(), Some(&Stage::Studios));
    assert_eq!(report.completed().len(), 8);
    assert_eq!(count(&fx.pool, "Favorites").await as u64, report.rows_for("Favorites"));
}
