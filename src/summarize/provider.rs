use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Settings;
use crate::summarize::gemini::GeminiClient;

/// Length and decoding constraints for a single summarization call.
///
/// `max_length`/`min_length` are target word counts. `do_sample` and
/// `num_beams` are decoding parameters forwarded to the backend untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryBounds {
    pub max_length: usize,
    pub min_length: usize,
    pub do_sample: bool,
    pub num_beams: u32,
}

impl Default for SummaryBounds {
    fn default() -> Self {
        Self {
            max_length: 150,
            min_length: 30,
            do_sample: false,
            num_beams: 4,
        }
    }
}

impl SummaryBounds {
    pub fn new(max_length: usize, min_length: usize) -> Self {
        Self {
            max_length,
            min_length,
            ..Self::default()
        }
    }
}

/// Bounded-input summarization primitive.
///
/// Callers must keep the input's token estimate within the backend's
/// supported maximum; the chunked driver enforces that before delegating.
#[async_trait]
pub trait BoundedSummarizer: Send + Sync {
    async fn summarize_bounded(&self, text: &str, bounds: &SummaryBounds) -> Result<String>;
}

/// Build a summarization backend from runtime settings.
pub fn build_provider(settings: &Settings) -> Result<Arc<dyn BoundedSummarizer>> {
    match settings.summarizer.provider.to_lowercase().as_str() {
        "gemini" => Ok(Arc::new(GeminiClient::from_settings(settings)?)),
        other => anyhow::bail!(
            "Unsupported summarizer.provider '{}'. Supported providers: gemini",
            other
        ),
    }
}
