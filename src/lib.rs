//! recap - Meeting-recording processing service
//!
//! Upload audio, transcribe it to text, and produce a shortened summary
//! via a small set of request/response endpoints.

pub mod cli;
pub mod config;
pub mod reports;
pub mod server;
pub mod summarize;
pub mod transcription;

use thiserror::Error;

/// Main error type for recap
#[derive(Error, Debug)]
pub enum RecapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Summarization error: {0}")]
    Summarization(String),

    #[error("IPC error: {0}")]
    Ipc(String),

    #[error("Daemon error: {0}")]
    Daemon(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RecapError>;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "recap";
