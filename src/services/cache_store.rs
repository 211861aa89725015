use std::collections::HashSet;

use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::models::{CandidateMovie, Movie};

/// Durable store for movies and their per-mood cache associations
///
/// Owns the Movie and CacheEntry lifecycle. Duplicate prevention for
/// concurrent writers lives in the storage constraints (primary key on
/// `tmdb_id`, unique index on `(mood_id, movie_id)`), never in
/// check-then-act application code.
#[derive(Clone)]
pub struct CacheStore {
    pool: SqlitePool,
}

impl CacheStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All movies cache-associated with the mood, minus the excluded ids.
    /// No ordering guarantee.
    pub async fn find_eligible(
        &self,
        mood_id: i64,
        excluded: &HashSet<i64>,
    ) -> AppResult<Vec<Movie>> {
        let movies: Vec<Movie> = sqlx::query_as(
            "SELECT m.tmdb_id, m.title, m.poster_path, m.vote_average, m.overview, m.release_date
             FROM movies m
             JOIN mood_movies mm ON mm.movie_id = m.tmdb_id
             WHERE mm.mood_id = ?",
        )
        .bind(mood_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movies
            .into_iter()
            .filter(|movie| !excluded.contains(&movie.tmdb_id))
            .collect())
    }

    /// Creates the movie if its catalog id is unseen, otherwise overwrites
    /// the mutable fields with the latest catalog values. Idempotent.
    pub async fn upsert_movie(&self, candidate: &CandidateMovie) -> AppResult<Movie> {
        // One decimal of precision, matching the catalog's own rating scale.
        let vote_average = (candidate.vote_average * 10.0).round() / 10.0;

        sqlx::query(
            "INSERT INTO movies (tmdb_id, title, poster_path, vote_average, overview, release_date)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT (tmdb_id) DO UPDATE SET
                 title = excluded.title,
                 poster_path = excluded.poster_path,
                 vote_average = excluded.vote_average,
                 overview = excluded.overview,
                 release_date = excluded.release_date",
        )
        .bind(candidate.id)
        .bind(&candidate.title)
        .bind(&candidate.poster_path)
        .bind(vote_average)
        .bind(&candidate.overview)
        .bind(&candidate.release_date)
        .execute(&self.pool)
        .await?;

        Ok(Movie {
            tmdb_id: candidate.id,
            title: candidate.title.clone(),
            poster_path: candidate.poster_path.clone(),
            vote_average,
            overview: candidate.overview.clone(),
            release_date: candidate.release_date.clone(),
        })
    }

    /// Creates the (mood, movie) cache entry if absent; no-op if present
    pub async fn associate(&self, mood_id: i64, movie_id: i64) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO mood_movies (mood_id, movie_id) VALUES (?, ?)
             ON CONFLICT (mood_id, movie_id) DO NOTHING",
        )
        .bind(mood_id)
        .bind(movie_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
