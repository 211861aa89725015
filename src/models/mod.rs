pub mod feedback;
pub mod mood;
pub mod movie;

pub use feedback::FeedbackLabel;
pub use mood::Mood;
pub use movie::{CandidateMovie, DiscoverResponse, Movie};
