//! Embedding generation for retrieval.

mod openai;

pub use openai::OpenAIEmbedder;

use crate::error::Result;
use async_trait::async_trait;

/// A fixed-dimension vector representing a chunk or a query.
pub type Embedding = Vec<f32>;

/// Trait for embedding generation.
///
/// Implementations call an external service and surface its failures as provider
/// errors without retrying.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text (a query).
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Generate embeddings for multiple texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;

    /// Model identifier, part of the pipeline cache key.
    fn model(&self) -> &str;
}
