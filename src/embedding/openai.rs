//! OpenAI embeddings implementation.

use super::{Embedder, Embedding};
use crate::config::{EmbeddingSettings, OpenAISettings};
use crate::error::{EstudiaError, ProviderError, Result};
use crate::openai::{create_client, OpenAIClient};
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use tracing::{debug, instrument};

const PROVIDER: &str = "embedding";

/// OpenAI has a limit on inputs per request.
const BATCH_SIZE: usize = 100;

/// OpenAI-based embedder.
pub struct OpenAIEmbedder {
    client: OpenAIClient,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    /// Create an embedder from settings.
    pub fn from_settings(openai: &OpenAISettings, embedding: &EmbeddingSettings) -> Result<Self> {
        Ok(Self::with_client(
            create_client(openai)?,
            &embedding.model,
            embedding.dimensions as usize,
        ))
    }

    /// Create an embedder over an existing client.
    pub fn with_client(client: OpenAIClient, model: &str, dimensions: usize) -> Self {
        Self {
            client,
            model: model.to_string(),
            dimensions,
        }
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings.into_iter().next().ok_or_else(|| {
            ProviderError::malformed(PROVIDER, "empty embedding response").into()
        })
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(BATCH_SIZE) {
            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(EmbeddingInput::StringArray(batch.to_vec()))
                .dimensions(self.dimensions as u32)
                .build()
                .map_err(|e| EstudiaError::Config(format!("Invalid embedding request: {}", e)))?;

            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| ProviderError::from_openai(PROVIDER, e))?;

            if response.data.len() != batch.len() {
                return Err(ProviderError::malformed(
                    PROVIDER,
                    format!(
                        "expected {} embeddings, received {}",
                        batch.len(),
                        response.data.len()
                    ),
                )
                .into());
            }

            // Sort by index to ensure correct order
            let mut embeddings: Vec<_> = response.data.into_iter().collect();
            embeddings.sort_by_key(|e| e.index);

            all_embeddings.extend(embeddings.into_iter().map(|e| e.embedding));
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_from_settings() {
        let openai = OpenAISettings {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };

        let embedder = OpenAIEmbedder::from_settings(&openai, &EmbeddingSettings::default()).unwrap();
        assert_eq!(embedder.dimensions(), 1536);
        assert_eq!(embedder.model(), "text-embedding-3-small");

        let large = EmbeddingSettings {
            model: "text-embedding-3-large".to_string(),
            dimensions: 3072,
        };
        let embedder = OpenAIEmbedder::from_settings(&openai, &large).unwrap();
        assert_eq!(embedder.dimensions(), 3072);
    }
}
