use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Creates a SQLite connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// Foreign keys are enabled on every connection so that cache entries
/// and feedback rows cascade with their movie.
pub async fn create_pool(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Statements run at startup to bring an empty database up to the expected
/// layout. Every statement is idempotent; there is no migration tooling.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS moods (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        genre_ids TEXT NOT NULL,
        description TEXT
    )",
    "CREATE TABLE IF NOT EXISTS movies (
        tmdb_id INTEGER PRIMARY KEY,
        title TEXT NOT NULL,
        poster_path TEXT,
        vote_average REAL NOT NULL DEFAULT 0,
        overview TEXT,
        release_date TEXT
    )",
    "CREATE TABLE IF NOT EXISTS mood_movies (
        mood_id INTEGER NOT NULL REFERENCES moods(id) ON DELETE CASCADE,
        movie_id INTEGER NOT NULL REFERENCES movies(tmdb_id) ON DELETE CASCADE,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (mood_id, movie_id)
    )",
    "CREATE TABLE IF NOT EXISTS feedback (
        movie_id INTEGER NOT NULL REFERENCES movies(tmdb_id) ON DELETE CASCADE,
        session_id TEXT NOT NULL,
        label TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (movie_id, session_id)
    )",
    "CREATE INDEX IF NOT EXISTS idx_feedback_session ON feedback (session_id, label)",
];

/// Creates the tables if they do not exist yet
pub async fn ensure_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// In-memory pool for tests. A single connection keeps the in-memory
/// database alive for the lifetime of the pool.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    ensure_schema(&pool).await.unwrap();
    pool
}
