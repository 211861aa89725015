use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::error::AppResult;
use crate::models::{CandidateMovie, DiscoverResponse};

/// Outcome of a catalog lookup
///
/// Every transport error, timeout, non-success status, or decode failure
/// collapses to `Unavailable` at this boundary; callers must treat it like
/// an empty result set for user-facing purposes. The cause is logged here.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogResult {
    /// Candidates in the catalog's relevance order (popularity-descending).
    /// The order is advisory only; selection downstream is randomized.
    Candidates(Vec<CandidateMovie>),
    Unavailable,
}

/// External movie catalog abstraction
///
/// A stateless read-through to the catalog service. Passing an empty genre
/// set is a caller error; implementations reject it before building a query.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch candidate movies matching any of the given genre ids
    async fn fetch_by_genres(&self, genre_ids: &[i64]) -> CatalogResult;
}

/// TMDB-backed catalog client
#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    base_url: String,
}

impl TmdbCatalog {
    /// Creates a client with a bounded request timeout so a slow upstream
    /// fails the call instead of hanging a request handler.
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            base_url,
        })
    }
}

/// Joins genre ids with `|`, which TMDB treats as an OR-filter
/// (`,` would mean AND and starve multi-genre moods of results)
fn genre_filter(genre_ids: &[i64]) -> String {
    genre_ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join("|")
}

#[async_trait::async_trait]
impl CatalogClient for TmdbCatalog {
    async fn fetch_by_genres(&self, genre_ids: &[i64]) -> CatalogResult {
        if genre_ids.is_empty() {
            tracing::error!("fetch_by_genres called with an empty genre set");
            return CatalogResult::Unavailable;
        }

        let url = format!("{}/discover/movie", self.base_url);
        let with_genres = genre_filter(genre_ids);

        let response = match self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("with_genres", with_genres.as_str()),
                ("sort_by", "popularity.desc"),
                ("language", "en-US"),
                ("include_adult", "false"),
            ])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Catalog request failed");
                return CatalogResult::Unavailable;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(
                status = %response.status(),
                "Catalog returned non-success status"
            );
            return CatalogResult::Unavailable;
        }

        match response.json::<DiscoverResponse>().await {
            Ok(body) => {
                tracing::info!(
                    genres = %with_genres,
                    results = body.results.len(),
                    "Catalog lookup completed"
                );
                CatalogResult::Candidates(body.results)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Catalog response decode failed");
                CatalogResult::Unavailable
            }
        }
    }
}
