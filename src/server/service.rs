//! Main processing service implementation

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Local;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::Settings;
use crate::server::ipc::{ApiRequest, ApiResponse};
use crate::server::listener::{CommandReceiver, IpcListener};
use crate::server::state::{Engines, SharedEngines};
use crate::summarize::SummaryBounds;
use crate::transcription::Transcription;

/// Shortest text (in characters, trimmed) the summarize endpoint accepts.
const MIN_SUMMARIZE_CHARS: usize = 50;

/// Transcripts below this word count are returned verbatim instead of
/// being summarized.
const MIN_SUMMARIZABLE_WORDS: usize = 20;

/// Run the processing service
pub async fn run(settings: &Settings) -> Result<()> {
    info!("Starting recap service");

    // Ensure directories exist
    settings.ensure_dirs()?;

    // Write PID file
    let pid = std::process::id();
    std::fs::write(settings.pid_path(), pid.to_string())?;

    // Engine registry: constructed once here, shared by every request
    let engines = Engines::new(settings.clone());

    // Create command channel
    let (cmd_tx, cmd_rx) = mpsc::channel::<(ApiRequest, mpsc::Sender<ApiResponse>)>(32);

    // Start listener
    let mut listener = IpcListener::new(settings.socket_path());
    listener.start().await?;

    // Spawn listener task
    let listener_handle = tokio::spawn(async move {
        if let Err(e) = listener.run(cmd_tx).await {
            error!("Listener error: {}", e);
        }
    });

    // Run request handler
    let handler_result = request_handler(engines, cmd_rx).await;

    // Cleanup
    info!("Shutting down service");

    // Remove PID file
    let _ = std::fs::remove_file(settings.pid_path());

    listener_handle.abort();

    handler_result
}

/// Handle incoming requests
async fn request_handler(engines: SharedEngines, mut cmd_rx: CommandReceiver) -> Result<()> {
    while let Some((request, resp_tx)) = cmd_rx.recv().await {
        let response = match request {
            ApiRequest::Ping => ApiResponse::Pong,
            ApiRequest::Health => ApiResponse::Health {
                transcriber_loaded: engines.transcriber_loaded().await,
                summarizer_ready: engines.summarizer_ready().await,
            },
            ApiRequest::PreloadModels => {
                // Load on a background task so the first real request does
                // not pay model load latency.
                let engines = engines.clone();
                tokio::spawn(async move {
                    if let Err(e) = engines.preload().await {
                        error!("Model preload failed: {}", e);
                    } else {
                        info!("Models preloaded");
                    }
                });
                ApiResponse::Ok
            }
            ApiRequest::Transcribe {
                file_name,
                audio_base64,
            } => handle_transcribe(&engines, &file_name, &audio_base64)
                .await
                .map(|t| ApiResponse::Transcription {
                    text: t.text,
                    language: t.language,
                    duration_seconds: t.duration_seconds,
                })
                .unwrap_or_else(|e| ApiResponse::Error {
                    message: format!("Transcription failed: {}", e),
                }),
            ApiRequest::Summarize {
                text,
                max_length,
                min_length,
            } => handle_summarize(&engines, &text, max_length, min_length)
                .await
                .unwrap_or_else(|e| ApiResponse::Error {
                    message: format!("Summarization failed: {}", e),
                }),
            ApiRequest::ProcessMeeting {
                file_name,
                audio_base64,
            } => handle_process_meeting(&engines, &file_name, &audio_base64)
                .await
                .unwrap_or_else(|e| ApiResponse::Error {
                    message: format!("Processing failed: {}", e),
                }),
            ApiRequest::Shutdown => {
                let _ = resp_tx.send(ApiResponse::Ok).await;
                break;
            }
        };

        let _ = resp_tx.send(response).await;
    }

    Ok(())
}

/// Decode an uploaded recording into a scratch file and transcribe it.
async fn handle_transcribe(
    engines: &SharedEngines,
    file_name: &str,
    audio_base64: &str,
) -> Result<Transcription> {
    if file_name.trim().is_empty() {
        anyhow::bail!("No audio file provided");
    }

    let audio = BASE64
        .decode(audio_base64)
        .context("Audio payload is not valid base64")?;
    if audio.is_empty() {
        anyhow::bail!("Audio payload is empty");
    }

    // Uploaded bytes land in a scratch file with the upload's extension
    let suffix = file_suffix(file_name);
    let tmp = tempfile::Builder::new()
        .prefix("recap-upload-")
        .suffix(&suffix)
        .tempfile()
        .context("Failed to create scratch file for upload")?;
    std::fs::write(tmp.path(), &audio).context("Failed to write uploaded audio")?;

    let pipeline = engines.transcriber().await?;
    let transcription = pipeline.transcribe(
        tmp.path(),
        Box::new(|progress| debug!("Transcription progress: {:.0}%", progress * 100.0)),
    )?;

    // Scratch file is removed when `tmp` drops
    Ok(transcription)
}

/// Summarize request text with the caller's (or configured default) bounds.
async fn handle_summarize(
    engines: &SharedEngines,
    text: &str,
    max_length: Option<usize>,
    min_length: Option<usize>,
) -> Result<ApiResponse> {
    if text.trim().chars().count() < MIN_SUMMARIZE_CHARS {
        anyhow::bail!(
            "Text is too short to summarize. Minimum {} characters required.",
            MIN_SUMMARIZE_CHARS
        );
    }

    let bounds = resolve_bounds(engines.settings(), max_length, min_length);
    let summarizer = engines.summarizer().await?;
    let summary = summarizer.summarize(text, &bounds).await?;

    Ok(ApiResponse::Summary {
        original_words: text.split_whitespace().count(),
        summary_words: summary.split_whitespace().count(),
        summary,
    })
}

/// Full pipeline: transcribe the upload, then summarize the transcript.
async fn handle_process_meeting(
    engines: &SharedEngines,
    file_name: &str,
    audio_base64: &str,
) -> Result<ApiResponse> {
    let transcription = handle_transcribe(engines, file_name, audio_base64).await?;

    let summary = match verbatim_summary(&transcription) {
        Some(summary) => summary,
        None => {
            let bounds = resolve_bounds(engines.settings(), None, None);
            let summarizer = engines.summarizer().await?;
            summarizer.summarize(&transcription.text, &bounds).await?
        }
    };

    Ok(ApiResponse::Meeting {
        meeting_id: Uuid::new_v4().to_string(),
        transcription: transcription.text,
        summary,
        language: transcription.language,
        processed_at: Local::now().to_rfc3339(),
    })
}

/// Transcripts under the word minimum stand in for their own summary.
fn verbatim_summary(transcription: &Transcription) -> Option<String> {
    if transcription.word_count() < MIN_SUMMARIZABLE_WORDS {
        Some(transcription.text.clone())
    } else {
        None
    }
}

fn resolve_bounds(
    settings: &Settings,
    max_length: Option<usize>,
    min_length: Option<usize>,
) -> SummaryBounds {
    SummaryBounds::new(
        max_length.unwrap_or(settings.summarizer.max_length),
        min_length.unwrap_or(settings.summarizer.min_length),
    )
}

/// Extension of the uploaded file, dot included. Defaults to `.wav`.
fn file_suffix(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_else(|| ".wav".to_string())
}
