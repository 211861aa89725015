pub mod cache_store;
pub mod catalog;
pub mod feedback_store;
pub mod mood_store;
pub mod recommender;
pub mod selection;

pub use cache_store::CacheStore;
pub use catalog::{CatalogClient, CatalogResult, TmdbCatalog};
pub use feedback_store::FeedbackStore;
pub use mood_store::MoodStore;
pub use recommender::{Recommendation, Recommender};
pub use selection::{Picker, UniformPicker};
