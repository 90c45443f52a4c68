//! Transcript chunking for retrieval.
//!
//! A transcript is split into ordered, overlapping windows of characters. Overlap keeps
//! sentences that straddle a boundary retrievable from either side.

mod boundary;
mod fixed;

pub use boundary::BoundaryChunker;
pub use fixed::FixedSizeChunker;

use crate::error::{EstudiaError, Result};
use serde::{Deserialize, Serialize};

/// A contiguous piece of a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position of this chunk in the transcript.
    pub index: usize,
    /// Text content of this chunk.
    pub text: String,
    /// Start offset in characters (inclusive).
    pub start: usize,
    /// End offset in characters (exclusive).
    pub end: usize,
}

impl Chunk {
    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.end - self.start
    }
}

/// Chunking strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChunkingStrategy {
    /// Fixed windows of `size` characters.
    #[default]
    Fixed,
    /// Windows that end on a paragraph, line, sentence or word boundary when possible.
    Boundary,
}

impl std::str::FromStr for ChunkingStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed" => Ok(ChunkingStrategy::Fixed),
            "boundary" => Ok(ChunkingStrategy::Boundary),
            _ => Err(format!("Unknown chunking strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for ChunkingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkingStrategy::Fixed => write!(f, "fixed"),
            ChunkingStrategy::Boundary => write!(f, "boundary"),
        }
    }
}

/// Configuration for chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Target chunk length in characters.
    pub size: usize,
    /// Characters shared between neighbouring chunks.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            size: 1000,
            overlap: 200,
        }
    }
}

impl ChunkingConfig {
    pub fn new(size: usize, overlap: usize) -> Result<Self> {
        let config = Self { size, overlap };
        config.validate()?;
        Ok(config)
    }

    /// Require `size > 0` and `overlap < size`.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(EstudiaError::Config(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if self.overlap >= self.size {
            return Err(EstudiaError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.overlap, self.size
            )));
        }
        Ok(())
    }

    /// Distance between the starts of consecutive fixed windows.
    pub fn step(&self) -> usize {
        self.size - self.overlap
    }
}

/// Trait for chunking implementations.
pub trait Chunker: Send + Sync {
    /// Split a transcript into ordered chunks.
    ///
    /// Blank input is an [`EstudiaError::EmptyInput`]; the result is never empty.
    fn chunk(&self, text: &str) -> Result<Vec<Chunk>>;

    fn config(&self) -> ChunkingConfig;
}

/// Create a chunker based on the strategy.
pub fn create_chunker(strategy: ChunkingStrategy, config: ChunkingConfig) -> Result<Box<dyn Chunker>> {
    Ok(match strategy {
        ChunkingStrategy::Fixed => Box::new(FixedSizeChunker::new(config)?),
        ChunkingStrategy::Boundary => Box::new(BoundaryChunker::new(config)?),
    })
}

/// Split `text` into fixed windows of `size` characters overlapping by `overlap`.
pub fn chunk(text: &str, size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    FixedSizeChunker::new(ChunkingConfig::new(size, overlap)?)?.chunk(text)
}

fn ensure_not_blank(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(EstudiaError::EmptyInput(
            "transcript has no text to chunk".to_string(),
        ));
    }
    Ok(())
}

/// Byte offset of every character, followed by `text.len()`.
fn char_boundaries(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect()
}

fn make_chunk(text: &str, bounds: &[usize], index: usize, start: usize, end: usize) -> Chunk {
    Chunk {
        index,
        text: text[bounds[start]..bounds[end]].to_string(),
        start,
        end,
    }
}
