//! Interactive Socratic tutoring command.

use super::{is_exit, read_line, start};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::session::{ChatMode, Session};
use crate::tutor::TutorProfile;
use anyhow::Result;
use console::style;

/// Run the interactive tutor.
pub async fn run_tutor(profile: TutorProfile, settings: Settings) -> Result<()> {
    let orchestrator = start(Operation::Ask, settings)?;
    let mode = ChatMode::from(profile);
    let mut session = Session::new();

    println!("\n{}", style("EstudIA Tutor").bold().cyan());
    println!(
        "{}\n",
        style(format!(
            "Profile: {}. Type 'exit' to quit, 'clear' to start over.",
            profile
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
        if input.eq_ignore_ascii_case("clear") {
            session = Session::new();
            Output::info("Conversation history cleared.");
            continue;
        }

        let history = session.messages(mode);
        match orchestrator.tutor_reply(profile, &history, &input).await {
            Ok(reply) => {
                Output::reply("EstudIA", &reply);
                session.record_exchange(mode, &input, &reply);
            }
            Err(e) => Output::error(&format!("Error: {}", e)),
        }
    }

    Ok(())
}
