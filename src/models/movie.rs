use serde::{Deserialize, Serialize};

/// A movie persisted from the external catalog
///
/// Identity is the TMDB id and is stable across fetches; every other field
/// is overwritten with the latest catalog values on each upsert. Serialized
/// with the catalog's field names so clients see one consistent shape
/// whether a movie came from the cache or straight from a fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Movie {
    #[serde(rename = "id")]
    pub tmdb_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub vote_average: f64,
    pub overview: Option<String>,
    pub release_date: Option<String>,
}

/// A movie as returned by the catalog, not yet persisted
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CandidateMovie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

/// Raw response from TMDB's discover endpoint
#[derive(Debug, Deserialize)]
pub struct DiscoverResponse {
    #[serde(default)]
    pub results: Vec<CandidateMovie>,
}
