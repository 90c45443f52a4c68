//! Boundary-aware window chunking.
//!
//! Same windowing as the fixed chunker, but a window that would cut through a word is
//! shortened to the last natural boundary in its second half. Paragraph breaks are
//! preferred over line breaks, line breaks over sentence ends, sentence ends over spaces.

use super::{char_boundaries, ensure_not_blank, make_chunk, Chunk, Chunker, ChunkingConfig};
use crate::error::Result;

/// Boundary-aware chunker.
#[derive(Debug, Clone)]
pub struct BoundaryChunker {
    config: ChunkingConfig,
}

impl BoundaryChunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }
}

fn is_paragraph_break(chars: &[char], p: usize) -> bool {
    p >= 2 && chars[p - 1] == '\n' && chars[p - 2] == '\n'
}

fn is_line_break(chars: &[char], p: usize) -> bool {
    chars[p - 1] == '\n'
}

fn is_sentence_end(chars: &[char], p: usize) -> bool {
    p >= 2 && chars[p - 1].is_whitespace() && matches!(chars[p - 2], '.' | '?' | '!')
}

fn is_space(chars: &[char], p: usize) -> bool {
    chars[p - 1].is_whitespace()
}

/// Kinds of split points, strongest first.
const LEVELS: [fn(&[char], usize) -> bool; 4] =
    [is_paragraph_break, is_line_break, is_sentence_end, is_space];

/// Rightmost split point in `lower..=upper` of the strongest available kind.
///
/// A split point `p` ends a chunk right after `chars[p - 1]`.
fn find_split(chars: &[char], lower: usize, upper: usize) -> Option<usize> {
    LEVELS
        .iter()
        .find_map(|is_split| (lower..=upper).rev().find(|&p| is_split(chars, p)))
}

impl Chunker for BoundaryChunker {
    fn chunk(&self, text: &str) -> Result<Vec<Chunk>> {
        ensure_not_blank(text)?;

        let chars: Vec<char> = text.chars().collect();
        let bounds = char_boundaries(text);
        let total = chars.len();
        let size = self.config.size;
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let hard_end = (start + size).min(total);
            let end = if hard_end == total {
                total
            } else {
                let lower = start + (size / 2).max(1);
                find_split(&chars, lower, hard_end).unwrap_or(hard_end)
            };

            chunks.push(make_chunk(text, &bounds, chunks.len(), start, end));
            if end == total {
                break;
            }
            start = end.saturating_sub(self.config.overlap).max(start + 1);
        }

        Ok(chunks)
    }

    fn config(&self) -> ChunkingConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_sentence_end() {
        let chunker = BoundaryChunker::new(ChunkingConfig::new(30, 0).unwrap()).unwrap();
        let chunks = chunker
            .chunk("Light becomes energy. Plants use chlorophyll to do it.")
            .unwrap();

        assert_eq!(chunks[0].text, "Light becomes energy. ");
        assert!(chunks[1].text.starts_with("Plants"));
    }

    #[test]
    fn test_prefers_paragraph_break() {
        let chunker = BoundaryChunker::new(ChunkingConfig::new(24, 0).unwrap()).unwrap();
        let chunks = chunker.chunk("First idea here.\n\nSecond idea. More.").unwrap();
        assert_eq!(chunks[0].text, "First idea here.\n\n");
    }

    #[test]
    fn test_falls_back_to_hard_cut() {
        let chunker = BoundaryChunker::new(ChunkingConfig::new(5, 1).unwrap()).unwrap();
        let chunks = chunker.chunk("abcdefghijkl").unwrap();
        assert_eq!(chunks[0].text, "abcde");
        assert_eq!(chunks[1].start, 4);
    }

    #[test]
    fn test_chunks_cover_text_with_bounded_overlap() {
        let text = "One two three four five six seven eight nine ten eleven twelve.";
        let chunker = BoundaryChunker::new(ChunkingConfig::new(16, 4).unwrap()).unwrap();
        let chunks = chunker.chunk(text).unwrap();

        assert_eq!(chunks[0].start, 0);
        assert_eq!(chunks.last().unwrap().end, text.chars().count());
        for pair in chunks.windows(2) {
            assert!(pair[1].start <= pair[0].end);
            assert!(pair[0].end - pair[1].start <= 4);
            assert!(pair[1].start > pair[0].start);
        }
        assert!(chunks.iter().all(|c| c.char_len() <= 16 && c.char_len() > 0));
    }
}
