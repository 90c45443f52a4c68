//! Query-time retrieval of transcript context.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::index::{SearchHit, VectorIndex};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Separator placed between retrieved chunks.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Finds the chunks most relevant to a query.
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl Retriever {
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn Embedder>, top_k: usize) -> Self {
        Self {
            index,
            embedder,
            top_k,
        }
    }

    /// Default number of chunks per query.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Retrieve the `k` nearest chunks joined into one context string, nearest first.
    ///
    /// An empty index yields an empty context.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<String> {
        let hits = self.retrieve_hits(query, k).await?;
        Ok(join_context(&hits))
    }

    /// Retrieve the `k` nearest chunks with their distances.
    #[instrument(skip(self, query))]
    pub async fn retrieve_hits(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        if self.index.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let hits = self.index.search(&query_embedding, k)?;

        debug!("Retrieved {} chunks", hits.len());
        Ok(hits)
    }
}

/// Join chunk texts with a blank line, keeping their order.
pub fn join_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| hit.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::Chunk;
    use crate::embedding::Embedding;
    use crate::index::{DistanceMetric, IndexEntry};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embeds text as counts of a few marker words.
    struct MarkerEmbedder {
        calls: AtomicUsize,
    }

    impl MarkerEmbedder {
        fn vector(text: &str) -> Embedding {
            let text = text.to_lowercase();
            ["light", "plants", "water"]
                .iter()
                .map(|w| text.matches(w).count() as f32)
                .collect()
        }
    }

    #[async_trait]
    impl Embedder for MarkerEmbedder {
        async fn embed(&self, text: &str) -> Result<Embedding> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Self::vector(text))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
            Ok(texts.iter().map(|t| Self::vector(t)).collect())
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn model(&self) -> &str {
            "marker"
        }
    }

    fn chunk(index: usize, text: &str) -> Chunk {
        Chunk {
            index,
            text: text.to_string(),
            start: 0,
            end: text.chars().count(),
        }
    }

    fn retriever(texts: &[&str]) -> (Retriever, Arc<MarkerEmbedder>) {
        let embedder = Arc::new(MarkerEmbedder {
            calls: AtomicUsize::new(0),
        });
        let entries = texts
            .iter()
            .enumerate()
            .map(|(i, t)| IndexEntry::new(MarkerEmbedder::vector(t), chunk(i, t)))
            .collect();
        let index = VectorIndex::build(entries, DistanceMetric::Cosine).unwrap();
        (Retriever::new(Arc::new(index), embedder.clone(), 2), embedder)
    }

    #[tokio::test]
    async fn test_retrieve_joins_nearest_first() {
        let (retriever, _) = retriever(&[
            "Light is energy.",
            "Plants need water.",
            "Plants grow.",
        ]);

        let context = retriever.retrieve("plants", 2).await.unwrap();
        assert_eq!(context, "Plants grow.\n\nPlants need water.");
    }

    #[tokio::test]
    async fn test_empty_index_gives_empty_context() {
        let (retriever, embedder) = retriever(&[]);
        let context = retriever.retrieve("anything", 4).await.unwrap();

        assert_eq!(context, "");
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }
}
