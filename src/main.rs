//! recap - Meeting audio transcription and summarization service
//!
//! Entry point for the recap CLI application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use recap::cli::{Cli, Commands};
use recap::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Completions { shell } => {
            recap::cli::completions::print(shell);
        }
        command => {
            // Load configuration only for runtime commands.
            let settings = Settings::load()?;

            // Execute command
            match command {
                Commands::Transcribe {
                    audio,
                    save,
                    output_dir,
                } => {
                    recap::cli::commands::transcribe(&settings, &audio, save, output_dir).await?;
                }
                Commands::Summarize {
                    file,
                    text,
                    max_length,
                    min_length,
                    save,
                    output_dir,
                } => {
                    recap::cli::commands::summarize(
                        &settings, file, text, max_length, min_length, save, output_dir,
                    )
                    .await?;
                }
                Commands::Process {
                    audio,
                    save,
                    output_dir,
                } => {
                    recap::cli::commands::process(&settings, &audio, save, output_dir).await?;
                }
                Commands::Health => {
                    recap::cli::commands::health(&settings).await?;
                }
                Commands::Preload => {
                    recap::cli::commands::preload(&settings).await?;
                }
                Commands::Daemon(daemon_cmd) => {
                    recap::cli::commands::daemon_command(&settings, daemon_cmd).await?;
                }
                Commands::Config(config_cmd) => {
                    recap::cli::commands::config_command(&settings, config_cmd)?;
                }
                Commands::Completions { .. } => unreachable!(),
            }
        }
    }

    Ok(())
}
