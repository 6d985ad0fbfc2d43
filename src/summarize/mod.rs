//! Summarization module for recap
//!
//! Wraps a bounded-input summarization primitive and extends it to
//! arbitrary-length transcripts via chunked summarization.

mod chunker;
mod estimator;
mod gemini;
mod prompts;
mod provider;

pub use chunker::ChunkedSummarizer;
pub use estimator::{TokenEstimator, WordCountEstimator};
pub use gemini::GeminiClient;
pub use provider::{build_provider, BoundedSummarizer, SummaryBounds};
