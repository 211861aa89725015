use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::middleware::SessionId;
use crate::models::{FeedbackLabel, Movie};
use crate::services::{CacheStore, CatalogClient, CatalogResult, FeedbackStore, MoodStore, Picker};

/// How many catalog candidates are persisted per fetch, bounding write
/// volume while still leaving the cache enough alternatives for later
/// requests to hit without another outbound call.
const MAX_CACHED_PER_FETCH: usize = 10;

/// Outcome of a recommendation request
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    Found(Movie),
    /// Candidates exist for the mood, but the session has marked every one
    /// of them Bad. A legitimate terminal state, not an error.
    Exhausted,
}

/// Orchestrates mood resolution, cache lookup, catalog fallback and
/// feedback filtering. Owns no persistent state of its own.
///
/// The cache is pull-through: it is only ever populated as a side effect
/// of serving a request, never pre-warmed.
pub struct Recommender {
    moods: MoodStore,
    cache: CacheStore,
    feedback: FeedbackStore,
    catalog: Arc<dyn CatalogClient>,
    picker: Arc<dyn Picker>,
}

impl Recommender {
    pub fn new(
        moods: MoodStore,
        cache: CacheStore,
        feedback: FeedbackStore,
        catalog: Arc<dyn CatalogClient>,
        picker: Arc<dyn Picker>,
    ) -> Self {
        Self {
            moods,
            cache,
            feedback,
            catalog,
            picker,
        }
    }

    /// Produces one eligible movie for the mood, or reports why none exists
    ///
    /// Errors: `NotFound` for an unknown mood, `InvalidInput` for a mood
    /// with no genres configured, `UpstreamUnavailable` when the cache is
    /// empty and the catalog is down or yields nothing.
    pub async fn recommend(
        &self,
        mood_id: i64,
        session: &SessionId,
    ) -> AppResult<Recommendation> {
        let mood = self
            .moods
            .get(mood_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("mood {} not found", mood_id)))?;

        // A mood with no genres is a configuration error, distinct from a
        // mood that merely has no results.
        if mood.genre_ids.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "mood '{}' has no genres configured",
                mood.name
            )));
        }

        let excluded = self
            .feedback
            .exclusions_for(session, FeedbackLabel::Bad)
            .await?;

        let cached = self.cache.find_eligible(mood.id, &excluded).await?;
        if !cached.is_empty() {
            tracing::debug!(
                mood = %mood.name,
                candidates = cached.len(),
                excluded = excluded.len(),
                "Cache hit"
            );
            return Ok(Recommendation::Found(self.pick(cached)));
        }

        tracing::debug!(mood = %mood.name, "Cache miss, querying catalog");

        let candidates = match self.catalog.fetch_by_genres(&mood.genre_ids).await {
            CatalogResult::Candidates(candidates) if !candidates.is_empty() => candidates,
            CatalogResult::Candidates(_) => {
                tracing::info!(mood = %mood.name, "Catalog returned no candidates");
                return Err(AppError::UpstreamUnavailable(
                    "the movie catalog returned no movies for this mood".to_string(),
                ));
            }
            CatalogResult::Unavailable => {
                tracing::warn!(mood = %mood.name, "Catalog unavailable");
                return Err(AppError::UpstreamUnavailable(
                    "the movie catalog is currently unavailable".to_string(),
                ));
            }
        };

        // Persist every fetched candidate, excluded or not: the cache
        // records "seen for this mood", and the next request filters again.
        let mut eligible = Vec::new();
        let mut persisted = 0usize;
        for candidate in candidates.into_iter().take(MAX_CACHED_PER_FETCH) {
            let movie = self.cache.upsert_movie(&candidate).await?;
            self.cache.associate(mood.id, movie.tmdb_id).await?;
            persisted += 1;

            if !excluded.contains(&movie.tmdb_id) {
                eligible.push(movie);
            }
        }

        tracing::info!(
            mood = %mood.name,
            persisted,
            eligible = eligible.len(),
            "Catalog results cached"
        );

        if eligible.is_empty() {
            return Ok(Recommendation::Exhausted);
        }

        Ok(Recommendation::Found(self.pick(eligible)))
    }

    fn pick(&self, mut movies: Vec<Movie>) -> Movie {
        let index = self.picker.pick_index(movies.len());
        movies.swap_remove(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::models::CandidateMovie;
    use crate::services::catalog::MockCatalogClient;
    use sqlx::SqlitePool;

    /// Always picks the given index
    struct FixedPicker(usize);

    impl Picker for FixedPicker {
        fn pick_index(&self, len: usize) -> usize {
            self.0.min(len - 1)
        }
    }

    fn candidate(id: i64) -> CandidateMovie {
        CandidateMovie {
            id,
            title: format!("Movie {}", id),
            poster_path: None,
            vote_average: 6.5,
            overview: None,
            release_date: None,
        }
    }

    fn recommender(pool: &SqlitePool, catalog: MockCatalogClient) -> Recommender {
        Recommender::new(
            MoodStore::new(pool.clone()),
            CacheStore::new(pool.clone()),
            FeedbackStore::new(pool.clone()),
            Arc::new(catalog),
            Arc::new(FixedPicker(0)),
        )
    }

    async fn seed_mood(pool: &SqlitePool, genre_ids: &[i64]) -> i64 {
        MoodStore::new(pool.clone())
            .create("Happy", genre_ids, None)
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_unknown_mood_is_not_found() {
        let pool = test_pool().await;
        let mut catalog = MockCatalogClient::new();
        catalog.expect_fetch_by_genres().times(0);

        let result = recommender(&pool, catalog)
            .recommend(42, &SessionId::from_token("s"))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_zero_genre_mood_is_invalid_even_with_cache_entries() {
        let pool = test_pool().await;
        let mood_id = seed_mood(&pool, &[]).await;

        let cache = CacheStore::new(pool.clone());
        cache.upsert_movie(&candidate(101)).await.unwrap();
        cache.associate(mood_id, 101).await.unwrap();

        let mut catalog = MockCatalogClient::new();
        catalog.expect_fetch_by_genres().times(0);

        let result = recommender(&pool, catalog)
            .recommend(mood_id, &SessionId::from_token("s"))
            .await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_cache_hit_makes_no_catalog_call() {
        let pool = test_pool().await;
        let mood_id = seed_mood(&pool, &[35, 10751]).await;

        let cache = CacheStore::new(pool.clone());
        cache.upsert_movie(&candidate(101)).await.unwrap();
        cache.associate(mood_id, 101).await.unwrap();

        let mut catalog = MockCatalogClient::new();
        catalog.expect_fetch_by_genres().times(0);

        let result = recommender(&pool, catalog)
            .recommend(mood_id, &SessionId::from_token("s"))
            .await
            .unwrap();

        match result {
            Recommendation::Found(movie) => assert_eq!(movie.tmdb_id, 101),
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cache_hit_never_returns_a_bad_marked_movie() {
        let pool = test_pool().await;
        let mood_id = seed_mood(&pool, &[35]).await;
        let session = SessionId::from_token("s");

        let cache = CacheStore::new(pool.clone());
        let feedback = FeedbackStore::new(pool.clone());
        for id in [101, 102] {
            cache.upsert_movie(&candidate(id)).await.unwrap();
            cache.associate(mood_id, id).await.unwrap();
        }
        feedback.record(101, &session, FeedbackLabel::Bad).await.unwrap();

        let mut catalog = MockCatalogClient::new();
        catalog.expect_fetch_by_genres().times(0);

        // FixedPicker(0) picks the first eligible movie; 101 is excluded.
        let result = recommender(&pool, catalog)
            .recommend(mood_id, &session)
            .await
            .unwrap();

        assert_eq!(
            result,
            Recommendation::Found(Movie {
                tmdb_id: 102,
                title: "Movie 102".to_string(),
                poster_path: None,
                vote_average: 6.5,
                overview: None,
                release_date: None,
            })
        );
    }

    #[tokio::test]
    async fn test_fetch_fallback_persists_all_candidates() {
        let pool = test_pool().await;
        let mood_id = seed_mood(&pool, &[35, 10751]).await;

        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_fetch_by_genres()
            .withf(|ids| ids == [35, 10751])
            .times(1)
            .returning(|_| {
                CatalogResult::Candidates(vec![candidate(101), candidate(102), candidate(103)])
            });

        let result = recommender(&pool, catalog)
            .recommend(mood_id, &SessionId::from_token("s"))
            .await
            .unwrap();

        match result {
            Recommendation::Found(movie) => {
                assert!([101, 102, 103].contains(&movie.tmdb_id));
            }
            other => panic!("expected Found, got {:?}", other),
        }

        // All three candidates are now cache entries for the mood.
        let cached = CacheStore::new(pool)
            .find_eligible(mood_id, &Default::default())
            .await
            .unwrap();
        let ids: std::collections::HashSet<i64> = cached.iter().map(|m| m.tmdb_id).collect();
        assert_eq!(ids, [101, 102, 103].into_iter().collect());
    }

    #[tokio::test]
    async fn test_fetch_fallback_filters_excluded_but_still_caches_them() {
        let pool = test_pool().await;
        let mood_id = seed_mood(&pool, &[35]).await;
        let session = SessionId::from_token("s");

        // 102 needs to exist before feedback can reference it.
        CacheStore::new(pool.clone()).upsert_movie(&candidate(102)).await.unwrap();
        FeedbackStore::new(pool.clone())
            .record(102, &session, FeedbackLabel::Bad)
            .await
            .unwrap();

        let mut catalog = MockCatalogClient::new();
        catalog.expect_fetch_by_genres().times(1).returning(|_| {
            CatalogResult::Candidates(vec![candidate(101), candidate(102), candidate(103)])
        });

        let result = recommender(&pool, catalog)
            .recommend(mood_id, &session)
            .await
            .unwrap();

        match result {
            Recommendation::Found(movie) => assert!([101, 103].contains(&movie.tmdb_id)),
            other => panic!("expected Found, got {:?}", other),
        }

        // The excluded movie was still recorded as seen for this mood.
        let cached = CacheStore::new(pool)
            .find_eligible(mood_id, &Default::default())
            .await
            .unwrap();
        assert_eq!(cached.len(), 3);
    }

    #[tokio::test]
    async fn test_all_candidates_excluded_is_exhausted() {
        let pool = test_pool().await;
        let mood_id = seed_mood(&pool, &[35]).await;
        let session = SessionId::from_token("s");

        let cache = CacheStore::new(pool.clone());
        let feedback = FeedbackStore::new(pool.clone());
        for id in [101, 102, 103] {
            cache.upsert_movie(&candidate(id)).await.unwrap();
            cache.associate(mood_id, id).await.unwrap();
            feedback.record(id, &session, FeedbackLabel::Bad).await.unwrap();
        }

        // The cache finds nothing eligible, so the catalog is consulted and
        // returns the same excluded movies.
        let mut catalog = MockCatalogClient::new();
        catalog.expect_fetch_by_genres().times(1).returning(|_| {
            CatalogResult::Candidates(vec![candidate(101), candidate(102), candidate(103)])
        });

        let result = recommender(&pool, catalog)
            .recommend(mood_id, &session)
            .await
            .unwrap();

        assert_eq!(result, Recommendation::Exhausted);
    }

    #[tokio::test]
    async fn test_catalog_unavailable_is_upstream_error() {
        let pool = test_pool().await;
        let mood_id = seed_mood(&pool, &[35]).await;

        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_fetch_by_genres()
            .times(1)
            .returning(|_| CatalogResult::Unavailable);

        let result = recommender(&pool, catalog)
            .recommend(mood_id, &SessionId::from_token("s"))
            .await;

        assert!(matches!(result, Err(AppError::UpstreamUnavailable(_))));
    }

    #[tokio::test]
    async fn test_catalog_empty_result_is_upstream_error() {
        let pool = test_pool().await;
        let mood_id = seed_mood(&pool, &[35]).await;

        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_fetch_by_genres()
            .times(1)
            .returning(|_| CatalogResult::Candidates(vec![]));

        let result = recommender(&pool, catalog)
            .recommend(mood_id, &SessionId::from_token("s"))
            .await;

        assert!(matches!(result, Err(AppError::UpstreamUnavailable(_))));
    }

    #[tokio::test]
    async fn test_fetch_persists_at_most_ten_candidates() {
        let pool = test_pool().await;
        let mood_id = seed_mood(&pool, &[35]).await;

        let mut catalog = MockCatalogClient::new();
        catalog.expect_fetch_by_genres().times(1).returning(|_| {
            CatalogResult::Candidates((1..=20).map(candidate).collect())
        });

        recommender(&pool, catalog)
            .recommend(mood_id, &SessionId::from_token("s"))
            .await
            .unwrap();

        let cached = CacheStore::new(pool)
            .find_eligible(mood_id, &Default::default())
            .await
            .unwrap();
        assert_eq!(cached.len(), MAX_CACHED_PER_FETCH);
    }
}
