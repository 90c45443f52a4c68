//! Transcribe command implementation.

use super::start;
use crate::cli::output::format_size;
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::{Context, Result};
use std::path::Path;

/// Run the transcribe command.
pub async fn run_transcribe(
    input: &str,
    output: Option<String>,
    no_summary: bool,
    mut settings: Settings,
) -> Result<()> {
    if no_summary {
        settings.summary.enabled = false;
    }
    let orchestrator = start(Operation::Transcribe, settings)?;

    let path = Path::new(input);
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(input)
        .to_string();
    let audio = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", input))?;

    Output::info(&format!("Transcribing {} ({})", filename, format_size(audio.len())));
    let spinner = Output::spinner("Transcribing and summarizing...");
    let result = orchestrator.process_recording(audio, &filename).await;
    spinner.finish_and_clear();

    let lecture = match result {
        Ok(lecture) => lecture,
        Err(e) => {
            Output::error(&format!("Transcription failed: {}", e));
            return Err(e.into());
        }
    };

    match output {
        Some(out) => {
            tokio::fs::write(&out, lecture.document.text()).await?;
            Output::success(&format!(
                "Transcript written to {} ({} characters)",
                out,
                lecture.document.char_len()
            ));
        }
        None => {
            Output::header("Transcript");
            println!("{}", lecture.document.text());
        }
    }

    if let Some(summary) = &lecture.summary {
        Output::header("Summary");
        println!("{}", summary);
    } else if orchestrator.settings().summary.enabled {
        Output::warning("Summary could not be generated; run 'estudia summarize' to retry.");
    }

    Ok(())
}
