//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// recap - Meeting audio transcription and summarization service
#[derive(Parser, Debug)]
#[command(name = "recap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe an audio recording to text
    Transcribe {
        /// Path to the audio file (WAV)
        audio: PathBuf,

        /// Save a transcript report file
        #[arg(short, long)]
        save: bool,

        /// Directory for report files (defaults to the configured reports dir)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Summarize text from a file or the command line
    Summarize {
        /// Read the text to summarize from this file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Text to summarize
        #[arg(short, long)]
        text: Option<String>,

        /// Maximum summary length in words
        #[arg(long)]
        max_length: Option<usize>,

        /// Minimum summary length in words
        #[arg(long)]
        min_length: Option<usize>,

        /// Save a summary report file
        #[arg(short, long)]
        save: bool,

        /// Directory for report files (defaults to the configured reports dir)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Full pipeline: transcribe a recording and summarize it in one call
    Process {
        /// Path to the audio file (WAV)
        audio: PathBuf,

        /// Save transcript and summary report files
        #[arg(short, long)]
        save: bool,

        /// Directory for report files (defaults to the configured reports dir)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Show which models the service has loaded
    Health,

    /// Ask the service to load its models ahead of the first request
    Preload,

    /// Daemon management commands
    #[command(subcommand)]
    Daemon(DaemonCommand),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum DaemonCommand {
    /// Start the background daemon
    Start {
        /// Run in foreground (don't daemonize)
        #[arg(short, long)]
        foreground: bool,
    },

    /// Stop the running daemon
    Stop,

    /// Restart the daemon
    Restart,

    /// Check daemon status
    Status,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., whisper.model)
        key: String,

        /// Value to set
        value: String,
    },
}
