//! Context building for RAG responses.

use super::ContextChunk;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::VectorStore;
use std::sync::Arc;

/// Builds retrieval context for a question.
pub struct ContextBuilder {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    max_chunks: usize,
}

impl ContextBuilder {
    /// Create a new context builder.
    pub fn new(vector_store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            vector_store,
            embedder,
            max_chunks: 4,
        }
    }

    /// Set the maximum number of context chunks.
    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    /// Build context for a question: embed it with the same model the index
    /// was built with, then take the top-k most similar chunks.
    pub async fn build(&self, question: &str) -> Result<Vec<ContextChunk>> {
        let query_embedding = self.embedder.embed(question).await?;

        let results = self
            .vector_store
            .search(&query_embedding, self.max_chunks)
            .await?;

        Ok(results.into_iter().map(ContextChunk::from).collect())
    }
}

/// Format context chunks for inclusion in a prompt.
pub fn format_context_for_prompt(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("---\n[{}]\n{}\n---", i + 1, chunk.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::TextChunk;
    use crate::vector_store::{Document, MemoryVectorStore, VectorStore};
    use async_trait::async_trait;

    /// Deterministic embedder for tests: one dimension per vocabulary word,
    /// counting occurrences.
    struct KeywordEmbedder {
        vocab: Vec<&'static str>,
    }

    impl KeywordEmbedder {
        fn new(vocab: Vec<&'static str>) -> Self {
            Self { vocab }
        }

        fn vector(&self, text: &str) -> Vec<f32> {
            let lowered = text.to_lowercase();
            self.vocab
                .iter()
                .map(|word| lowered.matches(word).count() as f32)
                .collect()
        }
    }

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(self.vector(text))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| self.vector(t)).collect())
        }

        fn dimensions(&self) -> usize {
            self.vocab.len()
        }
    }

    async fn fixture_store(embedder: &KeywordEmbedder) -> MemoryVectorStore {
        let store = MemoryVectorStore::new();
        let texts = [
            "the capital of france is paris",
            "rust has a strong ownership model",
            "whales are the largest mammals in the ocean",
        ];

        let docs: Vec<Document> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                Document::new(
                    TextChunk {
                        content: text.to_string(),
                        source_id: "fixture".to_string(),
                        sequence_index: i as i32,
                    },
                    embedder.vector(text),
                )
            })
            .collect();

        store.upsert_batch(&docs).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_retrieval_finds_known_fact() {
        let embedder = KeywordEmbedder::new(vec![
            "capital", "france", "paris", "rust", "ownership", "whales", "ocean",
        ]);
        let store = fixture_store(&embedder).await;

        let builder = ContextBuilder::new(
            Arc::new(store),
            Arc::new(KeywordEmbedder::new(vec![
                "capital", "france", "paris", "rust", "ownership", "whales", "ocean",
            ])),
        )
        .with_max_chunks(2);

        let chunks = builder.build("What is the capital of France?").await.unwrap();

        assert!(!chunks.is_empty());
        assert!(chunks
            .iter()
            .any(|c| c.content.contains("capital of france")));
        // Best match first
        assert!(chunks[0].content.contains("paris"));
    }

    #[tokio::test]
    async fn test_retrieval_is_independent_across_questions() {
        let vocab = vec!["capital", "france", "paris", "rust", "ownership", "whales", "ocean"];
        let embedder = KeywordEmbedder::new(vocab.clone());
        let store = fixture_store(&embedder).await;

        let builder = ContextBuilder::new(
            Arc::new(store),
            Arc::new(KeywordEmbedder::new(vocab)),
        )
        .with_max_chunks(2);

        let first = builder.build("Tell me about rust ownership").await.unwrap();
        // A different question in between must not influence the next answer
        let _ = builder.build("whales in the ocean").await.unwrap();
        let again = builder.build("Tell me about rust ownership").await.unwrap();

        assert_eq!(first.len(), again.len());
        for (a, b) in first.iter().zip(again.iter()) {
            assert_eq!(a.content, b.content);
            assert_eq!(a.score, b.score);
        }
    }

    #[test]
    fn test_format_context_numbers_chunks() {
        let chunks = vec![
            ContextChunk {
                source_id: "video1".to_string(),
                sequence_index: 0,
                content: "alpha".to_string(),
                score: 0.9,
            },
            ContextChunk {
                source_id: "video1".to_string(),
                sequence_index: 4,
                content: "beta".to_string(),
                score: 0.8,
            },
        ];

        let formatted = format_context_for_prompt(&chunks);
        assert!(formatted.contains("[1]\nalpha"));
        assert!(formatted.contains("[2]\nbeta"));
    }
}
