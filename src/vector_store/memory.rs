//! In-memory vector index.
//!
//! Backs the document Q&A path, where the index lives only as long as the
//! loaded document, and is rebuilt on every load.

use super::{cosine_similarity, Document, SearchResult, VectorStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory vector store.
pub struct MemoryVectorStore {
    documents: RwLock<HashMap<String, Document>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let mut store = self.documents.write().unwrap();
        for doc in docs {
            store.insert(doc.id.to_string(), doc.clone());
        }
        Ok(docs.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let docs = self.documents.read().unwrap();

        let mut results: Vec<SearchResult> = docs
            .values()
            .map(|doc| {
                let score = cosine_similarity(query_embedding, &doc.embedding);
                SearchResult {
                    document: doc.clone(),
                    score,
                }
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        Ok(results)
    }

    async fn delete_by_source_id(&self, source_id: &str) -> Result<usize> {
        let mut docs = self.documents.write().unwrap();
        let initial_len = docs.len();
        docs.retain(|_, doc| doc.source_id != source_id);
        Ok(initial_len - docs.len())
    }

    async fn get_by_source_id(&self, source_id: &str) -> Result<Vec<Document>> {
        let docs = self.documents.read().unwrap();
        let mut result: Vec<Document> = docs
            .values()
            .filter(|d| d.source_id == source_id)
            .cloned()
            .collect();
        result.sort_by_key(|d| d.sequence_index);
        Ok(result)
    }

    async fn document_count(&self) -> Result<usize> {
        let docs = self.documents.read().unwrap();
        Ok(docs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::TextChunk;

    fn doc(source_id: &str, index: i32, content: &str, embedding: Vec<f32>) -> Document {
        Document::new(
            TextChunk {
                content: content.to_string(),
                source_id: source_id.to_string(),
                sequence_index: index,
            },
            embedding,
        )
    }

    #[tokio::test]
    async fn test_memory_vector_store() {
        let store = MemoryVectorStore::new();

        store
            .upsert_batch(&[
                doc("doc1", 0, "Hello world", vec![1.0, 0.0, 0.0]),
                doc("doc1", 1, "Goodbye world", vec![0.0, 1.0, 0.0]),
            ])
            .await
            .unwrap();

        assert_eq!(store.document_count().await.unwrap(), 2);

        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].score > results[1].score);
        assert_eq!(results[0].document.content, "Hello world");

        let removed = store.delete_by_source_id("doc1").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.document_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_limit() {
        let store = MemoryVectorStore::new();
        let docs: Vec<Document> = (0..10)
            .map(|i| doc("doc1", i, &format!("chunk {}", i), vec![i as f32, 1.0]))
            .collect();
        store.upsert_batch(&docs).await.unwrap();

        let results = store.search(&[1.0, 1.0], 3).await.unwrap();
        assert_eq!(results.len(), 3);
    }
}
