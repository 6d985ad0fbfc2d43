//! Transcription result models

use serde::{Deserialize, Serialize};

/// A single timed segment of transcribed speech
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds
    pub start_time: f64,

    /// End time in seconds
    pub end_time: f64,

    /// Transcribed text
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start_time: f64, end_time: f64, text: String) -> Self {
        Self {
            start_time,
            end_time,
            text,
        }
    }
}

/// Full result of transcribing one audio recording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    /// Complete transcript text (segments joined with spaces)
    pub text: String,

    /// Detected (or configured) language code, e.g. "en"
    pub language: String,

    /// Length of the source audio in seconds
    pub duration_seconds: f64,

    /// Timed segments making up the transcript
    pub segments: Vec<TranscriptSegment>,
}

impl Transcription {
    /// Assemble a transcription from merged segments.
    pub fn from_segments(
        segments: Vec<TranscriptSegment>,
        language: String,
        duration_seconds: f64,
    ) -> Self {
        let text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            text,
            language,
            duration_seconds,
            segments,
        }
    }

    /// Word count of the full transcript
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
