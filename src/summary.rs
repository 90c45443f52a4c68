//! Lecture summaries.

use crate::document::Document;
use crate::error::{EstudiaError, Result};
use crate::generation::{ChatMessage, Generator};
use std::sync::Arc;
use tracing::{info, instrument};

/// Produces a short Markdown summary with the key points of a transcript.
pub struct Summarizer {
    generator: Arc<dyn Generator>,
    system_prompt: String,
}

impl Summarizer {
    pub fn new(generator: Arc<dyn Generator>, system_prompt: impl Into<String>) -> Self {
        Self {
            generator,
            system_prompt: system_prompt.into(),
        }
    }

    #[instrument(skip_all, fields(chars = document.char_len()))]
    pub async fn summarize(&self, document: &Document) -> Result<String> {
        if document.is_blank() {
            return Err(EstudiaError::EmptyInput(
                "cannot summarize an empty transcript".to_string(),
            ));
        }

        let messages = [
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(document.text()),
        ];
        let summary = self.generator.generate(&messages).await?;

        info!("Generated summary ({} characters)", summary.len());
        Ok(summary.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingGenerator {
        seen: Mutex<Vec<ChatMessage>>,
    }

    #[async_trait]
    impl Generator for RecordingGenerator {
        async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
            self.seen.lock().unwrap().extend_from_slice(messages);
            Ok("  **Summary:** Plants make food.\n".to_string())
        }

        fn model(&self) -> &str {
            "recording"
        }
    }

    #[tokio::test]
    async fn test_summary_sends_transcript_as_user_message() {
        let generator = Arc::new(RecordingGenerator::default());
        let summarizer = Summarizer::new(generator.clone(), "Summarize.");

        let summary = summarizer
            .summarize(&Document::new("Photosynthesis converts light."))
            .await
            .unwrap();
        assert_eq!(summary, "**Summary:** Plants make food.");

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], ChatMessage::system("Summarize."));
        assert_eq!(seen[1], ChatMessage::user("Photosynthesis converts light."));
    }

    #[tokio::test]
    async fn test_blank_transcript_is_rejected() {
        let summarizer = Summarizer::new(Arc::new(RecordingGenerator::default()), "Summarize.");
        let err = summarizer.summarize(&Document::new("\n ")).await.unwrap_err();
        assert!(matches!(err, EstudiaError::EmptyInput(_)));
    }
}
