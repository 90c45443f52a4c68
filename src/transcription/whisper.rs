//! OpenAI Whisper transcription implementation.

use super::{check_upload, Transcriber};
use crate::config::{OpenAISettings, TranscriptionSettings};
use crate::document::Document;
use crate::error::{EstudiaError, ProviderError, Result};
use crate::openai::{create_client, OpenAIClient};
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

const PROVIDER: &str = "transcription";

/// OpenAI Whisper-based transcriber.
pub struct WhisperTranscriber {
    client: OpenAIClient,
    model: String,
    language: Option<String>,
    max_upload_bytes: usize,
}

impl WhisperTranscriber {
    /// Create a transcriber from settings.
    pub fn from_settings(openai: &OpenAISettings, settings: &TranscriptionSettings) -> Result<Self> {
        Ok(Self::with_client(create_client(openai)?, settings))
    }

    /// Create a transcriber over an existing client.
    pub fn with_client(client: OpenAIClient, settings: &TranscriptionSettings) -> Self {
        Self {
            client,
            model: settings.model.clone(),
            language: settings.language.clone().filter(|l| !l.is_empty()),
            max_upload_bytes: settings.max_upload_bytes,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    #[instrument(skip(self, audio), fields(bytes = audio.len(), model = %self.model))]
    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<Document> {
        check_upload(&audio, filename, self.max_upload_bytes)?;
        debug!("Transcribing {}", filename);

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(AudioInput::from_vec_u8(filename.to_string(), audio))
            .model(&self.model)
            .response_format(AudioResponseFormat::Json);

        if let Some(lang) = &self.language {
            request_builder.language(lang);
        }

        let request = request_builder.build().map_err(|e| {
            EstudiaError::Transcription(format!("Failed to build request: {}", e))
        })?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| ProviderError::from_openai(PROVIDER, e))?;

        let text = response.text.trim();
        if text.is_empty() {
            return Err(EstudiaError::EmptyInput(format!(
                "no speech recognized in {}",
                filename
            )));
        }

        info!("Transcribed {} characters", text.chars().count());
        Ok(Document::new(text).with_source(filename))
    }
}
