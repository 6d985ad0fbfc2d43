//! Engine registry for the processing service
//!
//! Owns the transcription and summarization engines with an explicit
//! construct-once lifecycle: built on first use (or on preload), reused for
//! every subsequent request, dropped when the service exits.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Settings;
use crate::summarize::{build_provider, ChunkedSummarizer, WordCountEstimator};
use crate::transcription::TranscriptionPipeline;

/// Lazily constructed engines shared across requests
pub struct Engines {
    settings: Settings,
    transcriber: RwLock<Option<Arc<TranscriptionPipeline>>>,
    summarizer: RwLock<Option<Arc<ChunkedSummarizer>>>,
}

/// Thread-safe engine registry handle
pub type SharedEngines = Arc<Engines>;

impl Engines {
    pub fn new(settings: Settings) -> SharedEngines {
        Arc::new(Self {
            settings,
            transcriber: RwLock::new(None),
            summarizer: RwLock::new(None),
        })
    }

    /// Get the transcription pipeline, constructing it on first use.
    pub async fn transcriber(&self) -> Result<Arc<TranscriptionPipeline>> {
        if let Some(pipeline) = self.transcriber.read().await.as_ref() {
            return Ok(pipeline.clone());
        }

        let mut guard = self.transcriber.write().await;
        if let Some(pipeline) = guard.as_ref() {
            return Ok(pipeline.clone());
        }

        tracing::info!("Loading Whisper model: {}", self.settings.whisper.model);
        let pipeline = Arc::new(TranscriptionPipeline::new(&self.settings)?);
        *guard = Some(pipeline.clone());

        Ok(pipeline)
    }

    /// Get the chunked summarizer, constructing it on first use.
    pub async fn summarizer(&self) -> Result<Arc<ChunkedSummarizer>> {
        if let Some(summarizer) = self.summarizer.read().await.as_ref() {
            return Ok(summarizer.clone());
        }

        let mut guard = self.summarizer.write().await;
        if let Some(summarizer) = guard.as_ref() {
            return Ok(summarizer.clone());
        }

        tracing::info!(
            "Building summarization backend: {}",
            self.settings.summarizer.provider
        );
        let backend = build_provider(&self.settings)?;
        let summarizer = Arc::new(ChunkedSummarizer::new(
            Arc::new(WordCountEstimator),
            backend,
        ));
        *guard = Some(summarizer.clone());

        Ok(summarizer)
    }

    /// Construct both engines ahead of the first request.
    pub async fn preload(&self) -> Result<()> {
        self.transcriber().await?;
        self.summarizer().await?;
        Ok(())
    }

    /// Whether the transcription pipeline has been constructed
    pub async fn transcriber_loaded(&self) -> bool {
        self.transcriber.read().await.is_some()
    }

    /// Whether the summarization backend has been constructed
    pub async fn summarizer_ready(&self) -> bool {
        self.summarizer.read().await.is_some()
    }

    /// Runtime settings the engines were built from
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn engines_start_unloaded() {
        let engines = Engines::new(Settings::default());
        assert!(!engines.transcriber_loaded().await);
        assert!(!engines.summarizer_ready().await);
    }

    #[tokio::test]
    async fn summarizer_build_fails_without_api_key() {
        let engines = Engines::new(Settings::default());
        let err = match engines.summarizer().await {
            Ok(_) => panic!("expected summarizer build to fail"),
            Err(e) => e.to_string(),
        };
        assert!(err.contains("Gemini API key is missing"));
        assert!(!engines.summarizer_ready().await);
    }
}
