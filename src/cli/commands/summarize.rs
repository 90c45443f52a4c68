//! Summarize command implementation.

use super::{load_document, start};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the summarize command.
pub async fn run_summarize(input: &str, settings: Settings) -> Result<()> {
    let orchestrator = start(Operation::Ask, settings)?;
    let document = load_document(&orchestrator, input).await?;

    let spinner = Output::spinner("Summarizing...");
    let result = orchestrator.summarize(&document).await;
    spinner.finish_and_clear();

    match result {
        Ok(summary) => {
            println!("\n{}\n", summary);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to summarize: {}", e));
            Err(e.into())
        }
    }
}
