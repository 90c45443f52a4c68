//! Fixed-size window chunking.

use super::{char_boundaries, ensure_not_blank, make_chunk, Chunk, Chunker, ChunkingConfig};
use crate::error::Result;

/// Fixed-size chunker.
///
/// Produces windows of `size` characters advancing by `size - overlap`. The final window
/// may be shorter.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    config: ChunkingConfig,
}

impl FixedSizeChunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, text: &str) -> Result<Vec<Chunk>> {
        ensure_not_blank(text)?;

        let bounds = char_boundaries(text);
        let total = bounds.len() - 1;
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let end = (start + self.config.size).min(total);
            chunks.push(make_chunk(text, &bounds, chunks.len(), start, end));
            if end == total {
                break;
            }
            start += self.config.step();
        }

        Ok(chunks)
    }

    fn config(&self) -> ChunkingConfig {
        self.config
    }
}
