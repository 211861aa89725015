use std::sync::Arc;

use sqlx::SqlitePool;

use crate::services::{
    CacheStore, CatalogClient, FeedbackStore, MoodStore, Picker, Recommender,
};

/// Shared application state
///
/// Stores are cheap pool handles; the recommender is the only composite.
#[derive(Clone)]
pub struct AppState {
    pub moods: MoodStore,
    pub feedback: FeedbackStore,
    pub recommender: Arc<Recommender>,
}

impl AppState {
    /// Wires the stores and resolver over one pool, with the catalog client
    /// and random source injected so tests can substitute both.
    pub fn new(
        pool: SqlitePool,
        catalog: Arc<dyn CatalogClient>,
        picker: Arc<dyn Picker>,
    ) -> Self {
        let moods = MoodStore::new(pool.clone());
        let feedback = FeedbackStore::new(pool.clone());
        let cache = CacheStore::new(pool);

        let recommender = Arc::new(Recommender::new(
            moods.clone(),
            cache,
            feedback.clone(),
            catalog,
            picker,
        ));

        Self {
            moods,
            feedback,
            recommender,
        }
    }
}
