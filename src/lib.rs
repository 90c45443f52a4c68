//! EstudIA - Study assistant for recorded lectures
//!
//! Transcribe a lecture or pitch, summarize it, and question it either with a Socratic
//! tutor or in a mode that answers strictly from the transcript.
//!
//! # Overview
//!
//! The core is the grounded-answer pipeline: a transcript is split into overlapping
//! chunks, embedded once, and indexed in memory. Each question retrieves the nearest
//! chunks and asks the model to answer only from them, replying with a fixed fallback
//! sentence when the transcript does not cover the question. Built pipelines are cached
//! per transcript and configuration, so repeated questions never re-embed the document.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `document` - Transcript documents
//! - `chunking` - Overlapping character windows
//! - `embedding` - Embedding generation
//! - `index` - In-memory nearest-neighbour index
//! - `generation` - Chat-completion backends
//! - `rag` - Retrieval, grounded prompts, pipelines and the pipeline cache
//! - `transcription` - Speech-to-text
//! - `summary` - Lecture summaries
//! - `tutor` - Socratic tutoring
//! - `session` - Per-user chat state
//! - `orchestrator` - Wiring used by the CLI and HTTP server
//!
//! # Example
//!
//! ```rust,no_run
//! use estudia::config::Settings;
//! use estudia::document::Document;
//! use estudia::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let lecture = Document::new(std::fs::read_to_string("lecture.txt")?);
//!     let response = orchestrator.ask(&lecture, "What do plants use to absorb light?").await?;
//!     println!("{}", response.format_for_display());
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod session;
pub mod summary;
pub mod transcription;
pub mod tutor;

pub use error::{EstudiaError, ProviderError, ProviderErrorKind, Result};
