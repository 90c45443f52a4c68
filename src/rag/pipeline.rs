//! Grounded question answering over one transcript.

use super::prompt::GroundedPrompt;
use super::retriever::{join_context, Retriever};
use crate::chunking::{create_chunker, ChunkingConfig, ChunkingStrategy};
use crate::config::{Prompts, Settings};
use crate::document::Document;
use crate::embedding::Embedder;
use crate::error::{EstudiaError, ProviderError, Result};
use crate::generation::{ChatMessage, Generator};
use crate::index::{DistanceMetric, IndexEntry, SearchHit, VectorIndex};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Everything that shapes a pipeline besides the providers.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub strategy: ChunkingStrategy,
    pub chunking: ChunkingConfig,
    /// Chunks retrieved per question.
    pub top_k: usize,
    pub metric: DistanceMetric,
    pub prompt: GroundedPrompt,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            strategy: ChunkingStrategy::Fixed,
            chunking: ChunkingConfig::default(),
            top_k: 4,
            metric: DistanceMetric::Cosine,
            prompt: GroundedPrompt::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_settings(settings: &Settings, prompts: &Prompts) -> Result<Self> {
        let config = Self {
            strategy: settings.chunking.strategy,
            chunking: settings.chunking.config(),
            top_k: settings.retrieval.top_k,
            metric: settings.retrieval.metric,
            prompt: GroundedPrompt::from_prompts(&prompts.rag)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        if self.top_k == 0 {
            return Err(EstudiaError::Config(
                "top_k must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// A grounded answer with the transcript excerpts it was generated from.
#[derive(Debug, Clone)]
pub struct GroundedAnswer {
    /// The generated answer, unmodified.
    pub answer: String,
    /// Retrieved chunks, nearest first.
    pub sources: Vec<SearchHit>,
    /// The model replied with the fallback answer.
    pub not_found: bool,
}

impl GroundedAnswer {
    /// Format the response for display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.answer.clone();

        if !self.sources.is_empty() && !self.not_found {
            output.push_str("\n\n--- Sources ---\n");
            for source in &self.sources {
                output.push_str(&format!(
                    "\n[chunk {}, chars {}-{}] (distance: {:.3})",
                    source.chunk.index + 1,
                    source.chunk.start,
                    source.chunk.end,
                    source.distance
                ));
            }
        }

        output
    }
}

/// Retriever, prompt and generator bound to one transcript.
///
/// Immutable once built; answering never re-chunks or re-embeds the transcript.
pub struct RagPipeline {
    retriever: Retriever,
    prompt: GroundedPrompt,
    generator: Arc<dyn Generator>,
}

impl RagPipeline {
    /// Chunk, embed and index `document`, then bind the prompt and generator.
    #[instrument(skip_all, fields(chars = document.char_len(), strategy = %config.strategy))]
    pub async fn build(
        document: &Document,
        config: &PipelineConfig,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        config.validate()?;

        let chunker = create_chunker(config.strategy, config.chunking)?;
        let chunks = chunker.chunk(document.text())?;
        debug!("Split transcript into {} chunks", chunks.len());

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(ProviderError::malformed(
                "embedding",
                format!(
                    "expected {} embeddings, received {}",
                    chunks.len(),
                    embeddings.len()
                ),
            )
            .into());
        }

        let entries = embeddings
            .into_iter()
            .zip(chunks)
            .map(|(embedding, chunk)| IndexEntry::new(embedding, chunk))
            .collect();
        let index = VectorIndex::build(entries, config.metric)?;

        info!(
            chunks = index.len(),
            dimensions = index.dimensions(),
            "Built grounded answer pipeline"
        );

        Ok(Self {
            retriever: Retriever::new(Arc::new(index), embedder, config.top_k),
            prompt: config.prompt.clone(),
            generator,
        })
    }

    /// Answer `query` from the transcript only.
    ///
    /// Questions the transcript does not cover yield the prompt's fallback answer, not an
    /// error.
    pub async fn answer(&self, query: &str) -> Result<String> {
        self.answer_with_sources(query).await.map(|a| a.answer)
    }

    /// Answer `query` and return the excerpts used.
    #[instrument(skip(self, query))]
    pub async fn answer_with_sources(&self, query: &str) -> Result<GroundedAnswer> {
        let sources = self
            .retriever
            .retrieve_hits(query, self.retriever.top_k())
            .await
            .map_err(EstudiaError::pipeline)?;

        let prompt = self.prompt.render(&join_context(&sources), query);

        let answer = self
            .generator
            .generate(&[ChatMessage::user(prompt)])
            .await
            .map_err(EstudiaError::pipeline)?;

        let not_found = self.prompt.is_fallback(&answer);
        debug!(sources = sources.len(), not_found, "Generated grounded answer");

        Ok(GroundedAnswer {
            answer,
            sources,
            not_found,
        })
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn prompt(&self) -> &GroundedPrompt {
        &self.prompt
    }

    /// Number of indexed chunks.
    pub fn chunk_count(&self) -> usize {
        self.retriever.index().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedding;
    use crate::error::ProviderErrorKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct LengthEmbedder;

    #[async_trait]
    impl Embedder for LengthEmbedder {
        async fn embed(&self, text: &str) -> Result<Embedding> {
            Ok(vec![text.len() as f32, 1.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn model(&self) -> &str {
            "length"
        }
    }

    /// Fails the first call, then echoes the prompt.
    struct FlakyGenerator {
        failed: AtomicBool,
    }

    #[async_trait]
    impl Generator for FlakyGenerator {
        async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
            if !self.failed.swap(true, Ordering::SeqCst) {
                return Err(ProviderError::new(
                    "generation",
                    ProviderErrorKind::RateLimit,
                    "try again",
                )
                .into());
            }
            Ok(messages[0].content.clone())
        }

        fn model(&self) -> &str {
            "flaky"
        }
    }

    fn config(size: usize, overlap: usize) -> PipelineConfig {
        PipelineConfig {
            chunking: ChunkingConfig::new(size, overlap).unwrap(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_failure_is_per_call() {
        let generator = Arc::new(FlakyGenerator {
            failed: AtomicBool::new(false),
        });
        let pipeline = RagPipeline::build(
            &Document::new("Mitochondria produce ATP for the cell."),
            &config(20, 5),
            Arc::new(LengthEmbedder),
            generator,
        )
        .await
        .unwrap();

        let err = pipeline.answer("What produces ATP?").await.unwrap_err();
        assert!(matches!(err, EstudiaError::Pipeline(_)));
        assert!(err.is_transient());

        let answer = pipeline.answer("What produces ATP?").await.unwrap();
        assert!(answer.contains("What produces ATP?"));
    }

    #[tokio::test]
    async fn test_build_rejects_blank_transcript() {
        let result = RagPipeline::build(
            &Document::new("   "),
            &PipelineConfig::default(),
            Arc::new(LengthEmbedder),
            Arc::new(FlakyGenerator {
                failed: AtomicBool::new(true),
            }),
        )
        .await;

        assert!(matches!(result, Err(EstudiaError::EmptyInput(_))));
    }

    #[tokio::test]
    async fn test_build_rejects_zero_top_k() {
        let config = PipelineConfig {
            top_k: 0,
            ..Default::default()
        };
        let result = RagPipeline::build(
            &Document::new("Some lecture."),
            &config,
            Arc::new(LengthEmbedder),
            Arc::new(FlakyGenerator {
                failed: AtomicBool::new(true),
            }),
        )
        .await;

        assert!(matches!(result, Err(EstudiaError::Config(_))));
    }

    #[test]
    fn test_display_lists_sources() {
        let answer = GroundedAnswer {
            answer: "ATP.".to_string(),
            sources: vec![SearchHit {
                chunk: crate::chunking::Chunk {
                    index: 0,
                    text: "Mitochondria produce ATP".to_string(),
                    start: 0,
                    end: 24,
                },
                distance: 0.125,
            }],
            not_found: false,
        };

        let display = answer.format_for_display();
        assert!(display.starts_with("ATP."));
        assert!(display.contains("[chunk 1, chars 0-24] (distance: 0.125)"));
    }
}
