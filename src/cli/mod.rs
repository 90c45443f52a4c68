//! CLI module for EstudIA.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::tutor::TutorProfile;
use clap::{Parser, Subcommand};

/// EstudIA - Study assistant for recorded lectures
///
/// Transcribe a lecture, get a summary, and ask questions answered only from what was said.
#[derive(Parser, Debug)]
#[command(name = "estudia")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe a lecture recording and summarize it
    Transcribe {
        /// Audio file (mp3, m4a, wav, ...)
        input: String,

        /// Write the transcript to this file
        #[arg(short, long)]
        output: Option<String>,

        /// Skip the summary
        #[arg(long)]
        no_summary: bool,
    },

    /// Summarize a transcript or recording
    Summarize {
        /// Transcript text file or audio file
        input: String,
    },

    /// Ask one question answered only from a transcript
    Ask {
        /// Transcript text file or audio file
        transcript: String,

        /// The question to ask
        question: String,

        /// Show the transcript excerpts used for the answer
        #[arg(short, long)]
        sources: bool,
    },

    /// Chat with a transcript interactively
    Chat {
        /// Transcript text file or audio file
        transcript: String,
    },

    /// Start an interactive Socratic tutoring session
    Tutor {
        /// Student profile (new_student, demo_student)
        #[arg(short, long, default_value = "new_student")]
        profile: TutorProfile,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "retrieval.top_k")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_tutor_profile() {
        let cli = Cli::parse_from(["estudia", "tutor", "--profile", "demo_student"]);
        match cli.command {
            Commands::Tutor { profile } => assert_eq!(profile, TutorProfile::DemoStudent),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_ask() {
        let cli = Cli::parse_from(["estudia", "-v", "ask", "lecture.txt", "What is ATP?", "-s"]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Ask {
                transcript,
                question,
                sources,
            } => {
                assert_eq!(transcript, "lecture.txt");
                assert_eq!(question, "What is ATP?");
                assert!(sources);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
