//! Shared fixture: a small populated database

#![allow(dead_code)]

use filmdb_common::db::{execute_script, init_database};
use sqlx::SqlitePool;
use tempfile::TempDir;

const SEED: &str = "
INSERT INTO Movies (movieId, primaryTitle, originalTitle, titleType, startYear, runtimeMinutes, releaseYear) VALUES
    ('tt0001', 'Dune', 'Dune', 'movie', 1984, 137, 1984),
    ('tt0002', 'Dune', 'Dune', 'movie', 2021, 155, 2021),
    ('tt0003', 'Inception', 'Inception', 'movie', 2010, 148, 2010),
    ('tt0004', 'Arrival', 'Arrival', 'movie', 2016, 116, 2016),
    ('tt0005', 'The Irishman', 'The Irishman', 'movie', 2019, 209, 2019),
    ('tt0006', 'Old Space', 'Old Space', 'movie', 2001, 95, 2001);

INSERT INTO Studio (name, foundedYear, headquarters) VALUES
    ('A24', 2012, 'New York'),
    ('MGM', 1924, 'Beverly Hills');

INSERT INTO Produced_By (movieId, studioId) VALUES
    ('tt0002', 1), ('tt0004', 1), ('tt0003', 2);

INSERT INTO People (pId, primaryName, birthYear, deathYear, primaryProfession, currentStudioId) VALUES
    ('nm01', 'Leonardo DiCaprio', 1974, NULL, 'actor', 2),
    ('nm02', 'Elliot Page', 1987, NULL, 'actor', 1),
    ('nm03', 'Christopher Nolan', 1970, NULL, 'director', 1),
    ('nm04', 'Martin Scorsese', 1942, NULL, 'director', 2),
    ('nm05', 'Steven Zaillian', 1953, NULL, 'writer', 2),
    ('nm06', 'Amy Adams', 1974, NULL, 'actress', 1),
    ('nm07', 'Joe Pesci', 1943, NULL, 'actor', 2);

INSERT INTO Actor (actorId, number_of_fans) VALUES ('nm01', 3000), ('nm02', 1200), ('nm06', 900), ('nm07', 50);
INSERT INTO Director (directorId, directing_style, best_known_movieId) VALUES
    ('nm03', 'Experimental', 'tt0003'), ('nm04', 'Realism', 'tt0005');
INSERT INTO Writer (writerId, writing_style, best_known_movieId) VALUES ('nm05', 'Dark drama', 'tt0005');

INSERT INTO Acts_In (movieId, actorId) VALUES
    ('tt0003', 'nm01'), ('tt0003', 'nm02'), ('tt0004', 'nm06'), ('tt0005', 'nm07'), ('tt0005', 'nm01');
INSERT INTO Directs (movieId, directorId) VALUES ('tt0003', 'nm03'), ('tt0005', 'nm04');
INSERT INTO Writes_Script_For (movieId, writerId) VALUES ('tt0005', 'nm05');

INSERT INTO Genre (name) VALUES ('Sci-Fi'), ('Drama'), ('Comedy');
INSERT INTO Has_Genre (movieId, genreId) VALUES
    ('tt0001', 1), ('tt0002', 1), ('tt0003', 1), ('tt0004', 1), ('tt0005', 2), ('tt0006', 1);

INSERT INTO Award (awardName) VALUES ('Academy Award Best Picture'), ('Cannes Palme d''Or');
INSERT INTO Wins_Award (movieId, awardId, year) VALUES
    ('tt0003', 1, 2011), ('tt0005', 1, 2020), ('tt0004', 2, 2017);

INSERT INTO User (userName) VALUES ('alice'), ('bob');
INSERT INTO Favorites (userId, movieId) VALUES (1, 'tt0004'), (1, 'tt0002'), (2, 'tt0003');

INSERT INTO Review (userId, movieId, post_time, content, rating) VALUES
    (1, 'tt0002', '2021-11-01 10:00:00', 'Spice must flow', 9),
    (2, 'tt0002', '2022-01-15 18:30:00', 'Too long', 5),
    (1, 'tt0004', '2020-03-03 09:00:00', 'Moving', 8),
    (2, 'tt0003', '2019-07-07 21:00:00', 'Mind bending', 10);
";

/// Fresh database with the schema and the seed rows
pub async fn seeded_db() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("filmdb.db"), false).await.unwrap();
    execute_script(&pool, SEED).await.unwrap();
    (dir, pool)
}

/// Add one Drama movie per entry; movie `i` gets the ratings listed at `i`
pub async fn add_drama_movies(pool: &SqlitePool, ratings: &[&[i64]]) {
    let drama: i64 = sqlx::query_scalar("SELECT genreId FROM Genre WHERE name = 'Drama'")
        .fetch_one(pool)
        .await
        .unwrap();
    for (i, movie_ratings) in ratings.iter().enumerate() {
        let movie_id = format!("td{:03}", i);
        sqlx::query(
            "INSERT INTO Movies (movieId, primaryTitle, titleType, startYear, runtimeMinutes, releaseYear)
             VALUES (?, ?, 'movie', 2015, 100, 2015)",
        )
        .bind(&movie_id)
        .bind(format!("Drama {}", i))
        .execute(pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO Has_Genre (movieId, genreId) VALUES (?, ?)")
            .bind(&movie_id)
            .bind(drama)
            .execute(pool)
            .await
            .unwrap();
        for rating in movie_ratings.iter() {
            sqlx::query(
                "INSERT INTO Review (userId, movieId, post_time, content, rating)
                 VALUES (1, ?, '2023-01-01 00:00:00', 'ok', ?)",
            )
            .bind(&movie_id)
            .bind(rating)
            .execute(pool)
            .await
            .unwrap();
        }
    }
}

pub async fn review_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM Review")
        .fetch_one(pool)
        .await
        .unwrap()
}
