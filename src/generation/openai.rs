//! OpenAI chat completions implementation.

use super::{ChatMessage, Generator, Role};
use crate::config::OpenAISettings;
use crate::error::{EstudiaError, ProviderError, Result};
use crate::openai::{create_client, OpenAIClient};
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

const PROVIDER: &str = "generation";

/// OpenAI-based generator.
pub struct OpenAIGenerator {
    client: OpenAIClient,
    model: String,
    temperature: Option<f32>,
}

impl OpenAIGenerator {
    /// Create a generator for `model` from settings.
    pub fn from_settings(openai: &OpenAISettings, model: &str) -> Result<Self> {
        Ok(Self::with_client(create_client(openai)?, model))
    }

    /// Create a generator over an existing client.
    pub fn with_client(client: OpenAIClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
            temperature: None,
        }
    }

    /// Pin the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let built: ChatCompletionRequestMessage = match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(message.content.clone())
            .build()
            .map_err(|e| EstudiaError::InvalidInput(e.to_string()))?
            .into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.clone())
            .build()
            .map_err(|e| EstudiaError::InvalidInput(e.to_string()))?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(message.content.clone())
            .build()
            .map_err(|e| EstudiaError::InvalidInput(e.to_string()))?
            .into(),
    };
    Ok(built)
}

#[async_trait]
impl Generator for OpenAIGenerator {
    #[instrument(skip(self, messages), fields(model = %self.model, count = messages.len()))]
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        let messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(messages);
        if let Some(temperature) = self.temperature {
            builder.temperature(temperature);
        }
        let request = builder
            .build()
            .map_err(|e| EstudiaError::InvalidInput(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| ProviderError::from_openai(PROVIDER, e))?;

        let answer = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "empty response from LLM"))?;

        debug!("Generated {} characters", answer.len());
        Ok(answer)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn temperature(&self) -> Option<f32> {
        self.temperature
    }
}
