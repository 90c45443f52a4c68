//! Configuration module for EstudIA.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{
    Prompts, RagPrompts, SummaryPrompts, TutorPrompts, DEFAULT_FALLBACK_ANSWER,
    SPANISH_FALLBACK_ANSWER,
};
pub use settings::{
    ChunkingSettings, EmbeddingSettings, GeneralSettings, OpenAISettings, PromptSettings,
    RagSettings, RetrievalSettings, ServerSettings, Settings, SummarySettings,
    TranscriptionSettings, TutorSettings,
};
