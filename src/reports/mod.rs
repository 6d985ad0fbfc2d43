//! Report file writers
//!
//! Renders transcript and summary reports as plain-text files with a
//! banner header and writes them under the configured reports directory.

use anyhow::{Context, Result};
use chrono::Local;
use std::path::{Path, PathBuf};

use crate::transcription::Transcription;

const BANNER: &str = "============================================================";

/// Render a transcription report.
pub fn render_transcript_report(source: &str, transcription: &Transcription) -> String {
    let now = Local::now();

    format!(
        "{BANNER}\n\
SPEECH TO TEXT TRANSCRIPTION\n\
{BANNER}\n\
\n\
Date: {date}\n\
Time: {time}\n\
Audio File: {source}\n\
Detected Language: {language}\n\
Duration: {duration:.1}s\n\
\n\
{BANNER}\n\
TRANSCRIPTION\n\
{BANNER}\n\
\n\
{text}\n",
        date = now.format("%Y-%m-%d"),
        time = now.format("%H:%M:%S"),
        language = transcription.language,
        duration = transcription.duration_seconds,
        text = transcription.text,
    )
}

/// Render a summary report.
pub fn render_summary_report(source: &str, original: &str, summary: &str) -> String {
    let now = Local::now();

    format!(
        "{BANNER}\n\
TEXT SUMMARY\n\
{BANNER}\n\
\n\
Summary Generated: {date} {time}\n\
Source: {source}\n\
Original Length: {original_words} words\n\
Summary Length: {summary_words} words\n\
\n\
{BANNER}\n\
SUMMARY\n\
{BANNER}\n\
\n\
{summary}\n",
        date = now.format("%Y-%m-%d"),
        time = now.format("%H:%M:%S"),
        original_words = original.split_whitespace().count(),
        summary_words = summary.split_whitespace().count(),
    )
}

/// Write a transcript report under `output_dir`, creating it if needed.
///
/// Returns the path of the written file.
pub fn save_transcript_report(
    output_dir: &Path,
    source: &Path,
    transcription: &Transcription,
) -> Result<PathBuf> {
    let stem = file_stem(source);
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = output_dir.join(format!("{}_{}.txt", stem, timestamp));

    let report = render_transcript_report(&source.display().to_string(), transcription);
    write_report(&path, &report)?;

    Ok(path)
}

/// Write a summary report under `output_dir`, creating it if needed.
pub fn save_summary_report(
    output_dir: &Path,
    source: &str,
    original: &str,
    summary: &str,
) -> Result<PathBuf> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = output_dir.join(format!("summary_{}.txt", timestamp));

    let report = render_summary_report(source, original, summary);
    write_report(&path, &report)?;

    Ok(path)
}

fn write_report(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create report directory: {}", parent.display()))?;
    }

    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write report: {}", path.display()))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("recording")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::TranscriptSegment;

    fn sample_transcription() -> Transcription {
        Transcription::from_segments(
            vec![TranscriptSegment::new(
                0.0,
                2.0,
                "We agreed to ship on Friday.".to_string(),
            )],
            "en".to_string(),
            2.0,
        )
    }

    #[test]
    fn transcript_report_contains_header_and_text() {
        let report = render_transcript_report("meeting.wav", &sample_transcription());

        assert!(report.contains("SPEECH TO TEXT TRANSCRIPTION"));
        assert!(report.contains("Audio File: meeting.wav"));
        assert!(report.contains("Detected Language: en"));
        assert!(report.contains("We agreed to ship on Friday."));
    }

    #[test]
    fn summary_report_counts_words() {
        let report = render_summary_report("input text", "one two three four", "one two");

        assert!(report.contains("Original Length: 4 words"));
        assert!(report.contains("Summary Length: 2 words"));
        assert!(report.contains("TEXT SUMMARY"));
    }

    #[test]
    fn save_creates_the_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested").join("reports");

        let path = save_summary_report(&output, "inline text", "a b c", "a").unwrap();

        assert!(path.exists());
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("SUMMARY"));
    }
}
