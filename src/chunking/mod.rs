//! Splitting source text into overlapping chunks.
//!
//! Chunks are the unit of retrieval: each one is embedded and stored
//! independently, and answers cite the chunks they were built from.

use crate::error::{Result, SvarError};
use crate::source::PageText;
use serde::{Deserialize, Serialize};

/// A bounded-length piece of a larger source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Text content of this chunk.
    pub content: String,
    /// Identifier of the source the chunk was cut from.
    pub source_id: String,
    /// Position of this chunk in the source.
    pub sequence_index: i32,
}

/// Fixed-size character windower with overlap between consecutive chunks.
///
/// Adjacent chunks share exactly `overlap` characters, except at the final
/// boundary where fewer characters may remain.
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Chunker {
    /// Create a chunker. The overlap must be strictly smaller than the chunk
    /// size, otherwise every window would be contained in its neighbor.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(SvarError::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(SvarError::Config(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Split a text into chunks. Empty input yields no chunks; input shorter
    /// than the chunk size yields a single chunk equal to the input.
    pub fn split(&self, source_id: &str, text: &str) -> Vec<TextChunk> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut sequence_index = 0;

        loop {
            let end = (start + self.chunk_size).min(chars.len());
            chunks.push(TextChunk {
                content: chars[start..end].iter().collect(),
                source_id: source_id.to_string(),
                sequence_index,
            });
            sequence_index += 1;

            if end == chars.len() {
                break;
            }
            start = end - self.overlap;
        }

        chunks
    }

    /// Split extracted document pages. Page texts are joined before
    /// splitting so chunks may span page boundaries.
    pub fn split_pages(&self, source_id: &str, pages: &[PageText]) -> Vec<TextChunk> {
        let text = pages
            .iter()
            .map(|p| p.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        self.split(source_id, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_overlap_not_smaller_than_size() {
        assert!(matches!(Chunker::new(100, 100), Err(SvarError::Config(_))));
        assert!(matches!(Chunker::new(100, 200), Err(SvarError::Config(_))));
        assert!(matches!(Chunker::new(0, 0), Err(SvarError::Config(_))));
        assert!(Chunker::new(100, 99).is_ok());
    }

    #[test]
    fn test_short_input_single_chunk() {
        let chunker = Chunker::new(1000, 200).unwrap();
        let chunks = chunker.split("src", "short text");

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "short text");
        assert_eq!(chunks[0].sequence_index, 0);
    }

    #[test]
    fn test_empty_input_no_chunks() {
        let chunker = Chunker::new(1000, 200).unwrap();
        assert!(chunker.split("src", "").is_empty());
    }

    #[test]
    fn test_adjacent_chunks_share_exact_overlap() {
        let chunker = Chunker::new(10, 3).unwrap();
        let text: String = ('a'..='z').collect();
        let chunks = chunker.split("src", &text);

        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].content.chars().collect();
            let next: Vec<char> = pair[1].content.chars().collect();
            let tail: String = prev[prev.len() - 3..].iter().collect();
            let head: String = next[..3].iter().collect();
            assert_eq!(tail, head);
        }

        // No chunk exceeds the configured size, and order is preserved
        for (i, chunk) in chunks.iter().enumerate() {
            assert!(chunk.content.chars().count() <= 10);
            assert_eq!(chunk.sequence_index, i as i32);
        }
    }

    #[test]
    fn test_chunking_is_deterministic() {
        let chunker = Chunker::new(50, 10).unwrap();
        let text = "the quick brown fox jumps over the lazy dog ".repeat(20);

        let first = chunker.split("src", &text);
        let second = chunker.split("src", &text);
        assert_eq!(first, second);
    }

    #[test]
    fn test_chunks_cover_full_text() {
        let chunker = Chunker::new(10, 3).unwrap();
        let text = "abcdefghijklmnopqrstuvwxyz0123456789";
        let chunks = chunker.split("src", text);

        // Reassembling without the overlapping prefixes restores the input
        let mut rebuilt = chunks[0].content.clone();
        for chunk in &chunks[1..] {
            let chars: Vec<char> = chunk.content.chars().collect();
            rebuilt.extend(chars[3..].iter());
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_split_pages_joins_page_texts() {
        let chunker = Chunker::new(1000, 200).unwrap();
        let pages = vec![
            PageText {
                page_number: 1,
                text: "first page".to_string(),
            },
            PageText {
                page_number: 2,
                text: "  ".to_string(),
            },
            PageText {
                page_number: 3,
                text: "third page".to_string(),
            },
        ];

        let chunks = chunker.split_pages("doc", &pages);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "first page\nthird page");
    }
}
