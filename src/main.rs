//! EstudIA CLI entry point.

use anyhow::Result;
use clap::Parser;
use estudia::cli::{commands, Cli, Commands};
use estudia::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("estudia={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match cli.command {
        Commands::Transcribe {
            input,
            output,
            no_summary,
        } => {
            commands::run_transcribe(&input, output, no_summary, settings).await?;
        }

        Commands::Summarize { input } => {
            commands::run_summarize(&input, settings).await?;
        }

        Commands::Ask {
            transcript,
            question,
            sources,
        } => {
            commands::run_ask(&transcript, &question, sources, settings).await?;
        }

        Commands::Chat { transcript } => {
            commands::run_chat(&transcript, settings).await?;
        }

        Commands::Tutor { profile } => {
            commands::run_tutor(profile, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings, config_path.as_deref())?;
        }
    }

    Ok(())
}
