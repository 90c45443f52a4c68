//! Interactive chat grounded on one transcript.

use super::{is_exit, load_document, read_line, start};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use console::style;

/// Run the interactive transcript chat.
pub async fn run_chat(transcript: &str, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = start(Operation::Ask, settings)?;
    let document = load_document(&orchestrator, transcript).await?;

    let spinner = Output::spinner("Indexing transcript...");
    let built: Result<_> = orchestrator.pipeline_for(&document).await;
    spinner.finish_and_clear();
    let pipeline = built?;

    println!("\n{}", style("EstudIA Transcript Chat").bold().cyan());
    println!(
        "{}\n",
        style(format!(
            "{} excerpts indexed. Answers come only from the transcript. Type 'exit' to quit.",
            pipeline.chunk_count()
        ))
        .dim()
    );

    while let Some(input) = read_line(&style("You:").green().bold().to_string())? {
        if input.is_empty() {
            continue;
        }
        if is_exit(&input) {
            Output::info("Goodbye!");
            break;
        }

        match pipeline.answer(&input).await {
            Ok(answer) => Output::reply("EstudIA", &answer),
            Err(e) => Output::error(&format!("Error: {}", e)),
        }
    }

    Ok(())
}
