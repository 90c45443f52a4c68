//! Ask command implementation.

use super::{load_document, start};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    transcript: &str,
    question: &str,
    show_sources: bool,
    settings: Settings,
) -> Result<()> {
    let orchestrator = start(Operation::Ask, settings)?;
    let document = load_document(&orchestrator, transcript).await?;

    let spinner = Output::spinner("Reading the transcript...");
    let result = orchestrator.ask(&document, question).await;
    spinner.finish_and_clear();

    match result {
        Ok(response) => {
            println!("\n{}\n", response.answer);

            if show_sources && !response.not_found && !response.sources.is_empty() {
                Output::header("Sources");
                for source in &response.sources {
                    Output::source(source);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
