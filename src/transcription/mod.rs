//! Transcription module for recap
//!
//! Handles speech-to-text using whisper-rs.

mod pipeline;
mod transcript;
mod whisper;

pub use pipeline::TranscriptionPipeline;
pub use transcript::{TranscriptSegment, Transcription};
pub use whisper::WhisperTranscriber;
