use serde::{Deserialize, Serialize};

/// A named category mapping to a set of TMDB genre identifiers
///
/// Moods are the lookup key for both the catalog query and the cache.
/// The genre set is stored as a JSON array so the movie catalog's own
/// identifiers never leak into the schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Mood {
    pub id: i64,
    pub name: String,
    pub genre_ids: Vec<i64>,
    pub description: Option<String>,
}
