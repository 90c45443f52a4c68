//! In-memory nearest-neighbour index over chunk embeddings.
//!
//! The index is built once per transcript and only queried afterwards.

mod distance;

pub use distance::{cosine_similarity, euclidean_distance, DistanceMetric};

use crate::chunking::Chunk;
use crate::embedding::Embedding;
use crate::error::{EstudiaError, Result};
use std::cmp::Ordering;

/// A chunk with its embedding.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub embedding: Embedding,
    pub chunk: Chunk,
}

impl IndexEntry {
    pub fn new(embedding: Embedding, chunk: Chunk) -> Self {
        Self { embedding, chunk }
    }
}

/// A search result with its distance to the query.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// The matched chunk.
    pub chunk: Chunk,
    /// Distance to the query (lower is nearer).
    pub distance: f32,
}

/// Immutable brute-force vector index.
#[derive(Debug)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    metric: DistanceMetric,
    dimensions: usize,
}

impl VectorIndex {
    /// Build an index from entries. All embeddings must share one dimension.
    pub fn build(entries: Vec<IndexEntry>, metric: DistanceMetric) -> Result<Self> {
        let dimensions = entries.first().map(|e| e.embedding.len()).unwrap_or(0);

        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != dimensions) {
            return Err(EstudiaError::Index(format!(
                "chunk {} has {} dimensions, expected {}",
                bad.chunk.index,
                bad.embedding.len(),
                dimensions
            )));
        }

        Ok(Self {
            entries,
            metric,
            dimensions,
        })
    }

    /// Return up to `k` chunks nearest to `query`, nearest first.
    ///
    /// `k` larger than the index is clamped. Equal distances keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimensions {
            return Err(EstudiaError::Index(format!(
                "query has {} dimensions, index has {}",
                query.len(),
                self.dimensions
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, self.metric.distance(query, &entry.embedding)))
            .collect();

        scored.sort_by(|a, b| compare_distance(a.1, b.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, distance)| SearchHit {
                chunk: self.entries[i].chunk.clone(),
                distance,
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }
}

/// Ascending distance with NaN sorted last.
fn compare_distance(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (a_nan, b_nan) => a_nan.cmp(&b_nan),
    }
}
