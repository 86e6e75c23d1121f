//! Named query catalog
//!
//! Every query takes exactly one scalar parameter and has a fixed
//! projection, ordering and row cap.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Catalog identifier (Q1 through Q12)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QueryId {
    Q1,
    Q2,
    Q3,
    Q4,
    Q5,
    Q6,
    Q7,
    Q8,
    Q9,
    Q10,
    Q11,
    Q12,
}

impl QueryId {
    pub const ALL: [QueryId; 12] = [
        QueryId::Q1,
        QueryId::Q2,
        QueryId::Q3,
        QueryId::Q4,
        QueryId::Q5,
        QueryId::Q6,
        QueryId::Q7,
        QueryId::Q8,
        QueryId::Q9,
        QueryId::Q10,
        QueryId::Q11,
        QueryId::Q12,
    ];

    pub fn number(self) -> usize {
        self as usize + 1
    }

    pub fn definition(self) -> &'static QueryDef {
        &CATALOG[self as usize]
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.number())
    }
}

impl FromStr for QueryId {
    type Err = String;

    /// Accepts `Q7`, `q7` or `7`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('Q')
            .or_else(|| trimmed.strip_prefix('q'))
            .unwrap_or(trimmed);
        digits
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| QueryId::ALL.get(index).copied())
            .ok_or_else(|| s.to_string())
    }
}

/// Declared parameter type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Int,
    Text,
}

/// How a text parameter is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    Exact,
    /// Wrapped in `%...%` for a LIKE comparison
    Contains,
}

/// The single parameter of a query
#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: Option<&'static str>,
    #[serde(skip)]
    pub matching: Match,
}

/// One catalog entry
#[derive(Debug, Clone, Serialize)]
pub struct QueryDef {
    pub id: QueryId,
    pub title: &'static str,
    pub param: ParamSpec,
    pub columns: &'static [&'static str],
    #[serde(skip)]
    pub sql: &'static str,
}

const fn int_param(name: &'static str, default: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Int,
        default: Some(default),
        matching: Match::Exact,
    }
}

const fn text_param(name: &'static str, default: Option<&'static str>) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Text,
        default,
        matching: Match::Exact,
    }
}

pub static CATALOG: [QueryDef; 12] = [
    QueryDef {
        id: QueryId::Q1,
        title: "Sci-Fi movies released since a year",
        param: int_param("year", "2010"),
        columns: &["movieId", "primaryTitle", "startYear", "runtimeMinutes", "genre"],
        sql: "SELECT m.movieId, m.primaryTitle, m.startYear, m.runtimeMinutes, g.name AS genre
              FROM Movies AS m
              JOIN Has_Genre AS hg ON m.movieId = hg.movieId
              JOIN Genre AS g ON hg.genreId = g.genreId
              WHERE m.startYear >= ? AND g.name IN ('Sci-Fi', 'Science Fiction')
              ORDER BY m.startYear ASC, m.primaryTitle ASC
              LIMIT 200",
    },
    QueryDef {
        id: QueryId::Q2,
        title: "Actors in a movie",
        param: text_param("movie_title", Some("Inception")),
        columns: &["actorId", "actorName"],
        sql: "SELECT DISTINCT p.pId AS actorId, p.primaryName AS actorName
              FROM Movies AS m
              JOIN Acts_In AS ai ON m.movieId = ai.movieId
              JOIN Actor AS a ON ai.actorId = a.actorId
              JOIN People AS p ON a.actorId = p.pId
              WHERE m.primaryTitle = ?
              ORDER BY p.primaryName ASC",
    },
    QueryDef {
        id: QueryId::Q3,
        title: "Reviews for a movie",
        param: text_param("movie_title", Some("Dune")),
        columns: &["movieTitle", "userName", "rating", "postTime", "reviewContent"],
        sql: "SELECT m.primaryTitle AS movieTitle, u.userName AS userName, r.rating AS rating,
                     r.post_time AS postTime, r.content AS reviewContent
              FROM Movies AS m
              JOIN Review AS r ON m.movieId = r.movieId
              JOIN User AS u ON r.userId = u.userId
              WHERE m.primaryTitle = ?
              ORDER BY r.post_time DESC",
    },
    QueryDef {
        id: QueryId::Q4,
        title: "Movies by a director",
        param: text_param("director_name", Some("Christopher Nolan")),
        columns: &["movieId", "primaryTitle", "startYear", "runtimeMinutes"],
        sql: "SELECT m.movieId, m.primaryTitle, m.startYear, m.runtimeMinutes
              FROM People AS p
              JOIN Director AS d ON p.pId = d.directorId
              JOIN Directs AS di ON d.directorId = di.directorId
              JOIN Movies AS m ON di.movieId = m.movieId
              WHERE p.primaryName = ?
              ORDER BY m.startYear, m.primaryTitle",
    },
    QueryDef {
        id: QueryId::Q5,
        title: "Average rating by studio",
        param: text_param("studio_name", Some("A24")),
        columns: &["studioName", "avgUserRating", "numMovies", "numReviews"],
        sql: "SELECT s.name AS studioName, AVG(r.rating) AS avgUserRating,
                     COUNT(DISTINCT m.movieId) AS numMovies, COUNT(r.reviewId) AS numReviews
              FROM Studio AS s
              JOIN Produced_By AS pb ON s.studioId = pb.studioId
              JOIN Movies AS m ON pb.movieId = m.movieId
              JOIN Review AS r ON m.movieId = r.movieId
              WHERE s.name = ?
              GROUP BY s.name",
    },
    QueryDef {
        id: QueryId::Q6,
        title: "Award-winning movies",
        param: ParamSpec {
            name: "award_keyword",
            kind: ParamKind::Text,
            default: Some("Best Picture"),
            matching: Match::Contains,
        },
        columns: &["movieId", "primaryTitle", "releaseYear", "awardName", "awardYear"],
        sql: "SELECT m.movieId, m.primaryTitle, m.releaseYear, a.awardName, w.year AS awardYear
              FROM Movies AS m
              JOIN Wins_Award AS w ON m.movieId = w.movieId
              JOIN Award AS a ON w.awardId = a.awardId
              WHERE a.awardName LIKE ?
              ORDER BY w.year DESC, m.primaryTitle ASC
              LIMIT 200",
    },
    QueryDef {
        id: QueryId::Q7,
        title: "Actors at studios founded before a year",
        param: int_param("cutoff_year", "1950"),
        columns: &["actorId", "primaryName", "studioName", "foundedYear"],
        sql: "SELECT DISTINCT p.pId AS actorId, p.primaryName, s.name AS studioName, s.foundedYear
              FROM People AS p
              JOIN Actor AS a ON p.pId = a.actorId
              JOIN Studio AS s ON p.currentStudioId = s.studioId
              WHERE s.foundedYear < ?
              ORDER BY s.foundedYear ASC, p.primaryName ASC
              LIMIT 500",
    },
    QueryDef {
        id: QueryId::Q8,
        title: "Writers who worked with a director",
        param: text_param("director_name", Some("Martin Scorsese")),
        columns: &["writerId", "writerName", "movieTitle"],
        sql: "SELECT DISTINCT pw.pId AS writerId, pw.primaryName AS writerName, m.primaryTitle AS movieTitle
              FROM People AS pd
              JOIN Directs AS d ON d.directorId = pd.pId
              JOIN Movies AS m ON m.movieId = d.movieId
              JOIN Writes_Script_For AS wsf ON wsf.movieId = m.movieId
              JOIN People AS pw ON pw.pId = wsf.writerId
              WHERE pd.primaryName = ?
              ORDER BY pw.primaryName ASC, m.primaryTitle ASC",
    },
    QueryDef {
        id: QueryId::Q9,
        title: "Favorite movies of a user",
        param: text_param("username", None),
        columns: &["movieId", "primaryTitle", "releaseYear"],
        sql: "SELECT m.movieId, m.primaryTitle, m.releaseYear
              FROM User AS u
              JOIN Favorites AS f ON u.userId = f.userId
              JOIN Movies AS m ON f.movieId = m.movieId
              WHERE u.userName = ?
              ORDER BY m.primaryTitle ASC, m.releaseYear ASC",
    },
    QueryDef {
        id: QueryId::Q10,
        title: "Top 10 movies in a genre",
        param: text_param("genre_name", Some("Drama")),
        columns: &["movieId", "primaryTitle", "startYear", "genre", "avgRating", "numReviews"],
        sql: "SELECT m.movieId, m.primaryTitle, m.startYear, g.name AS genre,
                     AVG(r.rating) AS avgRating, COUNT(r.reviewId) AS numReviews
              FROM Movies AS m
              JOIN Has_Genre AS hg ON m.movieId = hg.movieId
              JOIN Genre AS g ON hg.genreId = g.genreId
              LEFT JOIN Review AS r ON m.movieId = r.movieId
              WHERE g.name = ?
              GROUP BY m.movieId, m.primaryTitle, m.startYear, g.name
              HAVING AVG(r.rating) IS NOT NULL
              ORDER BY avgRating DESC, numReviews DESC
              LIMIT 10",
    },
    QueryDef {
        id: QueryId::Q11,
        title: "Movies at least as long as a runtime",
        param: int_param("min_runtime", "180"),
        columns: &["movieId", "primaryTitle", "startYear", "runtimeMinutes"],
        sql: "SELECT m.movieId, m.primaryTitle, m.startYear, m.runtimeMinutes
              FROM Movies AS m
              WHERE m.runtimeMinutes >= ?
              ORDER BY m.runtimeMinutes DESC, m.primaryTitle ASC
              LIMIT 200",
    },
    QueryDef {
        id: QueryId::Q12,
        title: "Actors born in a year",
        param: int_param("birth_year", "1980"),
        columns: &["actorId", "actorName", "birthYear", "primaryProfession"],
        sql: "SELECT p.pId AS actorId, p.primaryName AS actorName, p.birthYear, p.primaryProfession
              FROM People AS p
              JOIN Actor AS a ON p.pId = a.actorId
              WHERE p.birthYear = ?
              ORDER BY p.primaryName ASC",
    },
];
