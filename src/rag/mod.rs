//! Retrieval-augmented question answering.
//!
//! Answers a question by retrieving the most relevant chunks for it and
//! conditioning a single LLM call on them. Every question is answered
//! independently; no conversation history is kept.

pub mod context;
mod response;

pub use context::ContextBuilder;
pub use response::{RagEngine, RagResponse};

use crate::vector_store::SearchResult;

/// A retrieved chunk with its similarity score, ready for prompting and
/// display.
#[derive(Debug, Clone)]
pub struct ContextChunk {
    /// Source ID.
    pub source_id: String,
    /// Position of the chunk in the source.
    pub sequence_index: i32,
    /// Text content.
    pub content: String,
    /// Similarity score.
    pub score: f32,
}

impl From<SearchResult> for ContextChunk {
    fn from(result: SearchResult) -> Self {
        Self {
            source_id: result.document.source_id.clone(),
            sequence_index: result.document.sequence_index,
            content: result.document.content.clone(),
            score: result.score,
        }
    }
}
