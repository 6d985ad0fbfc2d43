//! Token estimation for chunk-boundary decisions

/// Estimates how many model-input tokens a string occupies.
///
/// The estimate only has to be roughly monotonic in text length; it is used
/// to decide chunk boundaries, never to truncate text.
pub trait TokenEstimator: Send + Sync {
    fn estimate_tokens(&self, text: &str) -> usize;
}

/// Word-count token proxy.
///
/// English text averages about four tokens for every three words, so the
/// estimate is words + words / 3. Exact model parity is not required here.
#[derive(Debug, Default, Clone, Copy)]
pub struct WordCountEstimator;

impl TokenEstimator for WordCountEstimator {
    fn estimate_tokens(&self, text: &str) -> usize {
        let words = text.split_whitespace().count();
        words + words / 3
    }
}
