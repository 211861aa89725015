use rand::Rng;

/// Source of randomness for candidate selection
///
/// Injected into the recommender so tests can substitute a deterministic
/// implementation and assert exact selections.
pub trait Picker: Send + Sync {
    /// Returns an index in `0..len`. Callers guarantee `len > 0`.
    fn pick_index(&self, len: usize) -> usize;
}

/// Uniform random selection
///
/// Uniform (rather than top-1 or rank-weighted) so repeated visits to the
/// same mood do not keep surfacing the same movie.
pub struct UniformPicker;

impl Picker for UniformPicker {
    fn pick_index(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}
