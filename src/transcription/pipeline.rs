//! Transcription pipeline orchestration

use anyhow::Result;
use std::path::Path;

use crate::config::Settings;
use crate::transcription::whisper::{load_audio, WhisperTranscriber};
use crate::transcription::{TranscriptSegment, Transcription};

/// Whisper expects 16kHz input
const SAMPLE_RATE: u32 = 16000;

/// Progress callback type
pub type ProgressCallback = Box<dyn Fn(f32) + Send + Sync>;

/// Transcription pipeline for processing audio files
pub struct TranscriptionPipeline {
    transcriber: WhisperTranscriber,
    chunk_duration_secs: f32,
}

impl TranscriptionPipeline {
    /// Create a new transcription pipeline
    pub fn new(settings: &Settings) -> Result<Self> {
        let transcriber = WhisperTranscriber::new(settings)?;

        Ok(Self {
            transcriber,
            chunk_duration_secs: 30.0, // Process in 30-second windows
        })
    }

    /// Transcribe an audio file
    pub fn transcribe(
        &self,
        audio_path: &Path,
        progress_callback: ProgressCallback,
    ) -> Result<Transcription> {
        // Load audio
        tracing::info!("Loading audio from: {}", audio_path.display());
        let samples = load_audio(audio_path)?;

        let duration_seconds = samples.len() as f64 / SAMPLE_RATE as f64;
        let chunk_samples = (self.chunk_duration_secs * SAMPLE_RATE as f32) as usize;

        let mut all_segments = Vec::new();
        let mut language = String::new();
        let mut offset_time = 0.0;

        // Process in windows
        let windows: Vec<_> = samples.chunks(chunk_samples).collect();
        let total_windows = windows.len();

        for (i, window) in windows.iter().enumerate() {
            tracing::debug!("Processing window {}/{}", i + 1, total_windows);

            // Report progress
            let progress = (i as f32 + 0.5) / total_windows as f32;
            progress_callback(progress);

            // Transcribe window
            let (mut segments, detected) = self.transcriber.transcribe(window)?;

            // The first window's detection stands for the whole recording
            if language.is_empty() {
                language = detected;
            }

            // Adjust timestamps for window offset
            for segment in &mut segments {
                segment.start_time += offset_time;
                segment.end_time += offset_time;
            }

            all_segments.extend(segments);

            // Update offset for next window
            offset_time += window.len() as f64 / SAMPLE_RATE as f64;
        }

        // Final progress update
        progress_callback(1.0);

        // Merge adjacent segments if they're continuous
        let merged_segments = merge_segments(all_segments);

        tracing::info!("Transcription complete: {} segments", merged_segments.len());

        Ok(Transcription::from_segments(
            merged_segments,
            language,
            duration_seconds,
        ))
    }
}

/// Merge adjacent segments with small gaps
fn merge_segments(segments: Vec<TranscriptSegment>) -> Vec<TranscriptSegment> {
    let mut iter = segments.into_iter();
    let mut merged = Vec::new();

    let mut current = match iter.next() {
        Some(first) => first,
        None => return merged,
    };

    for segment in iter {
        // If segments are close together (within 0.5s), merge
        let gap = segment.start_time - current.end_time;

        if gap < 0.5 {
            current.end_time = segment.end_time;
            current.text.push(' ');
            current.text.push_str(&segment.text);
        } else {
            merged.push(current);
            current = segment;
        }
    }

    merged.push(current);
    merged
}
