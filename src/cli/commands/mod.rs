//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod serve;
mod summarize;
mod transcribe;
mod tutor;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use serve::{router, run_serve, AppState};
pub use summarize::run_summarize;
pub use transcribe::run_transcribe;
pub use tutor::run_tutor;

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::document::Document;
use crate::orchestrator::Orchestrator;
use crate::transcription::is_supported_audio;
use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Run pre-flight checks and create the orchestrator.
fn start(operation: Operation, settings: Settings) -> Result<Orchestrator> {
    if let Err(e) = preflight::check(operation, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'estudia config path' to locate the configuration file.");
        return Err(e.into());
    }
    Ok(Orchestrator::new(settings)?)
}

/// Load a transcript from a text file, or transcribe it from an audio file.
async fn load_document(orchestrator: &Orchestrator, input: &str) -> Result<Document> {
    let path = Path::new(input);
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(input)
        .to_string();

    if is_supported_audio(&filename) {
        let audio = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", input))?;
        let spinner = Output::spinner(&format!("Transcribing {}...", filename));
        let result = orchestrator.transcribe(audio, &filename).await;
        spinner.finish_and_clear();
        return Ok(result?);
    }

    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", input))?;
    Ok(Document::new(text).with_source(filename))
}

/// Read one trimmed line from stdin after printing `prompt`; `None` at end of input.
fn read_line(prompt: &str) -> Result<Option<String>> {
    print!("{} ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn is_exit(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}
