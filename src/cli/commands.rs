//! CLI command implementations

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::path::{Path, PathBuf};

use crate::cli::args::{ConfigCommand, DaemonCommand};
use crate::config::Settings;
use crate::reports;
use crate::server::client::ServiceClient;
use crate::server::ipc::{ApiRequest, ApiResponse};
use crate::transcription::Transcription;

/// Transcribe an audio file via the service
pub async fn transcribe(
    settings: &Settings,
    audio: &Path,
    save: bool,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let (file_name, audio_base64) = load_upload(audio)?;

    let mut client = ServiceClient::connect(settings).await?;
    let response = client
        .send(ApiRequest::Transcribe {
            file_name,
            audio_base64,
        })
        .await?;

    match response {
        ApiResponse::Transcription {
            text,
            language,
            duration_seconds,
        } => {
            println!("Language: {}", language);
            println!("Duration: {:.1}s", duration_seconds);
            println!();
            println!("{}", text);

            if save {
                let transcription = Transcription {
                    text,
                    language,
                    duration_seconds,
                    segments: Vec::new(),
                };
                let dir = output_dir.unwrap_or_else(|| settings.general.reports_dir.clone());
                let path = reports::save_transcript_report(&dir, audio, &transcription)?;
                println!();
                println!("Transcript saved to: {}", path.display());
            }
        }
        ApiResponse::Error { message } => {
            anyhow::bail!("{}", message);
        }
        _ => {
            anyhow::bail!("Unexpected response from daemon");
        }
    }

    Ok(())
}

/// Summarize text via the service
#[allow(clippy::too_many_arguments)]
pub async fn summarize(
    settings: &Settings,
    file: Option<PathBuf>,
    text: Option<String>,
    max_length: Option<usize>,
    min_length: Option<usize>,
    save: bool,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let (source, text) = match (file, text) {
        (Some(path), None) => {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            (path.display().to_string(), contents)
        }
        (None, Some(text)) => ("command line".to_string(), text),
        _ => anyhow::bail!("Provide the text to summarize with --text or --file"),
    };

    let mut client = ServiceClient::connect(settings).await?;
    let response = client
        .send(ApiRequest::Summarize {
            text: text.clone(),
            max_length,
            min_length,
        })
        .await?;

    match response {
        ApiResponse::Summary {
            summary,
            original_words,
            summary_words,
        } => {
            println!("{}", summary);
            println!();
            println!("({} words, down from {})", summary_words, original_words);

            if save {
                let dir = output_dir.unwrap_or_else(|| settings.general.reports_dir.clone());
                let path = reports::save_summary_report(&dir, &source, &text, &summary)?;
                println!("Summary saved to: {}", path.display());
            }
        }
        ApiResponse::Error { message } => {
            anyhow::bail!("{}", message);
        }
        _ => {
            anyhow::bail!("Unexpected response from daemon");
        }
    }

    Ok(())
}

/// Run the full transcribe-and-summarize pipeline via the service
pub async fn process(
    settings: &Settings,
    audio: &Path,
    save: bool,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let (file_name, audio_base64) = load_upload(audio)?;

    let mut client = ServiceClient::connect(settings).await?;
    let response = client
        .send(ApiRequest::ProcessMeeting {
            file_name,
            audio_base64,
        })
        .await?;

    match response {
        ApiResponse::Meeting {
            meeting_id,
            transcription,
            summary,
            language,
            processed_at,
        } => {
            println!("Meeting: {}", meeting_id);
            println!("Language: {}", language);
            println!("Processed: {}", processed_at);
            println!();
            println!("Summary:");
            println!("{}", summary);

            if save {
                let dir = output_dir.unwrap_or_else(|| settings.general.reports_dir.clone());
                let source = audio.display().to_string();
                let path = reports::save_summary_report(&dir, &source, &transcription, &summary)?;
                println!();
                println!("Summary saved to: {}", path.display());
            }
        }
        ApiResponse::Error { message } => {
            anyhow::bail!("{}", message);
        }
        _ => {
            anyhow::bail!("Unexpected response from daemon");
        }
    }

    Ok(())
}

/// Show which models the service has loaded
pub async fn health(settings: &Settings) -> Result<()> {
    let mut client = match ServiceClient::connect(settings).await {
        Ok(c) => c,
        Err(_) => {
            println!("Daemon is not running");
            return Ok(());
        }
    };

    let response = client.send(ApiRequest::Health).await?;

    match response {
        ApiResponse::Health {
            transcriber_loaded,
            summarizer_ready,
        } => {
            println!("Status: healthy");
            println!(
                "  Transcriber: {}",
                if transcriber_loaded { "loaded" } else { "not loaded" }
            );
            println!(
                "  Summarizer:  {}",
                if summarizer_ready { "ready" } else { "not ready" }
            );
        }
        _ => {
            anyhow::bail!("Unexpected response from daemon");
        }
    }

    Ok(())
}

/// Ask the service to load its models now
pub async fn preload(settings: &Settings) -> Result<()> {
    let mut client = ServiceClient::connect(settings).await?;
    let response = client.send(ApiRequest::PreloadModels).await?;

    match response {
        ApiResponse::Ok => {
            println!("Models loading in background");
        }
        ApiResponse::Error { message } => {
            anyhow::bail!("{}", message);
        }
        _ => {
            anyhow::bail!("Unexpected response from daemon");
        }
    }

    Ok(())
}

/// Handle daemon subcommands
pub async fn daemon_command(settings: &Settings, cmd: DaemonCommand) -> Result<()> {
    match cmd {
        DaemonCommand::Start { foreground } => {
            if foreground {
                crate::server::run_foreground(settings).await?;
            } else {
                crate::server::start_daemon(settings)?;
                println!("Daemon started");
            }
        }
        DaemonCommand::Stop => {
            let mut client = ServiceClient::connect(settings).await?;
            client.send(ApiRequest::Shutdown).await?;
            println!("Daemon stopped");
        }
        DaemonCommand::Restart => {
            // Try to stop existing daemon
            if let Ok(mut client) = ServiceClient::connect(settings).await {
                let _ = client.send(ApiRequest::Shutdown).await;
                tokio::time::sleep(std::time::Duration::from_millis(500)).await;
            }
            crate::server::start_daemon(settings)?;
            println!("Daemon restarted");
        }
        DaemonCommand::Status => match ServiceClient::connect(settings).await {
            Ok(mut client) => {
                let response = client.send(ApiRequest::Ping).await?;
                if matches!(response, ApiResponse::Pong) {
                    println!("Daemon is running");
                }
            }
            Err(_) => {
                println!("Daemon is not running");
            }
        },
    }

    Ok(())
}

/// Handle config subcommands
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let toml = toml::to_string_pretty(settings)?;
            println!("{}", toml);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path()?;
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
        ConfigCommand::Set { key, value } => {
            let mut updated = settings.clone();
            apply_setting(&mut updated, &key, &value)?;

            let path = Settings::config_path()?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, toml::to_string_pretty(&updated)?)
                .with_context(|| format!("Failed to write config file: {}", path.display()))?;
            println!("Set {} = {}", key, value);
        }
    }

    Ok(())
}

/// Update one dotted `section.key` in the settings.
fn apply_setting(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    match key {
        "general.data_dir" => settings.general.data_dir = PathBuf::from(value),
        "general.log_level" => settings.general.log_level = value.to_string(),
        "general.reports_dir" => settings.general.reports_dir = PathBuf::from(value),
        "whisper.model" => settings.whisper.model = value.to_string(),
        "whisper.models_dir" => settings.whisper.models_dir = PathBuf::from(value),
        "whisper.language" => settings.whisper.language = value.to_string(),
        "whisper.translate" => {
            settings.whisper.translate = value
                .parse()
                .with_context(|| format!("{} expects true or false, got '{}'", key, value))?;
        }
        "whisper.threads" => {
            settings.whisper.threads = value
                .parse()
                .with_context(|| format!("{} expects a number, got '{}'", key, value))?;
        }
        "summarizer.provider" => settings.summarizer.provider = value.to_string(),
        "summarizer.api_key" => settings.summarizer.api_key = value.to_string(),
        "summarizer.model" => settings.summarizer.model = value.to_string(),
        "summarizer.endpoint" => settings.summarizer.endpoint = value.to_string(),
        "summarizer.max_length" => {
            settings.summarizer.max_length = value
                .parse()
                .with_context(|| format!("{} expects a number, got '{}'", key, value))?;
        }
        "summarizer.min_length" => {
            settings.summarizer.min_length = value
                .parse()
                .with_context(|| format!("{} expects a number, got '{}'", key, value))?;
        }
        _ => anyhow::bail!("Unknown configuration key: {}", key),
    }
    Ok(())
}

/// Read an audio file and encode it for the wire.
fn load_upload(audio: &Path) -> Result<(String, String)> {
    let bytes = std::fs::read(audio)
        .with_context(|| format!("Failed to read audio file: {}", audio.display()))?;

    let file_name = audio
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.wav")
        .to_string();

    Ok((file_name, BASE64.encode(bytes)))
}
