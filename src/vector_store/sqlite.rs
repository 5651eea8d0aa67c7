//! SQLite-based vector index, persisted per source.
//!
//! Each indexed source owns its own database file at
//! `<index_root>/<source_id>/index.db`. Similarity is cosine computed in
//! Rust; for large corpora consider the sqlite-vec extension or a dedicated
//! vector database.

use super::{cosine_similarity, Document, IndexedSource, SearchResult, VectorStore};
use crate::error::{Result, SvarError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        id TEXT PRIMARY KEY,
        source_id TEXT NOT NULL,
        content TEXT NOT NULL,
        sequence_index INTEGER NOT NULL,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_documents_source_id ON documents(source_id);
"#;

/// SQLite-based vector store for one source.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Path of the database file for a source.
    pub fn db_path(index_root: &Path, source_id: &str) -> PathBuf {
        index_root.join(source_id).join("index.db")
    }

    /// Whether a persisted index exists for the source.
    pub fn index_exists(index_root: &Path, source_id: &str) -> bool {
        Self::db_path(index_root, source_id).exists()
    }

    /// Open the index for a source, creating it if needed.
    #[instrument(skip(index_root))]
    pub fn create(index_root: &Path, source_id: &str) -> Result<Self> {
        let path = Self::db_path(index_root, source_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;

        // WAL mode and a busy timeout soften cross-process contention on the
        // same source index.
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Opened index for source {} at {:?}", source_id, path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open the index for a source that has already been built.
    pub fn open_existing(index_root: &Path, source_id: &str) -> Result<Self> {
        if !Self::index_exists(index_root, source_id) {
            return Err(SvarError::IndexNotFound(source_id.to_string()));
        }
        Self::create(index_root, source_id)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// List all sources indexed under a root directory.
    pub fn list_sources(index_root: &Path) -> Result<Vec<IndexedSource>> {
        let mut sources = Vec::new();

        if !index_root.exists() {
            return Ok(sources);
        }

        for entry in std::fs::read_dir(index_root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let source_id = entry.file_name().to_string_lossy().to_string();
            if !Self::index_exists(index_root, &source_id) {
                continue;
            }

            let store = Self::open_existing(index_root, &source_id)?;
            if let Some(summary) = store.summarize(&source_id)? {
                sources.push(summary);
            }
        }

        sources.sort_by(|a, b| b.indexed_at.cmp(&a.indexed_at));
        Ok(sources)
    }

    /// Summary of the documents stored for a source.
    fn summarize(&self, source_id: &str) -> Result<Option<IndexedSource>> {
        let conn = self.lock_conn()?;

        let row = conn.query_row(
            "SELECT COUNT(*), MAX(indexed_at) FROM documents WHERE source_id = ?1",
            params![source_id],
            |row| {
                let count: u32 = row.get(0)?;
                let indexed_at: Option<String> = row.get(1)?;
                Ok((count, indexed_at))
            },
        )?;

        match row {
            (0, _) | (_, None) => Ok(None),
            (count, Some(indexed_at)) => Ok(Some(IndexedSource {
                source_id: source_id.to_string(),
                chunk_count: count,
                indexed_at: parse_timestamp(&indexed_at),
            })),
        }
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SvarError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
        let id_str: String = row.get(0)?;
        let embedding_bytes: Vec<u8> = row.get(4)?;
        let indexed_at_str: String = row.get(5)?;

        Ok(Document {
            id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
            source_id: row.get(1)?,
            content: row.get(2)?,
            sequence_index: row.get(3)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            indexed_at: parse_timestamp(&indexed_at_str),
        })
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, docs))]
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let conn = self.lock_conn()?;
        let tx = conn.unchecked_transaction()?;

        for doc in docs {
            let embedding_bytes = Self::embedding_to_bytes(&doc.embedding);

            tx.execute(
                r#"
                INSERT OR REPLACE INTO documents
                (id, source_id, content, sequence_index, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    doc.id.to_string(),
                    doc.source_id,
                    doc.content,
                    doc.sequence_index,
                    embedding_bytes,
                    doc.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Batch upserted {} documents", docs.len());
        Ok(docs.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, source_id, content, sequence_index, embedding, indexed_at FROM documents",
        )?;

        let docs = stmt.query_map([], Self::row_to_document)?;

        let mut results: Vec<SearchResult> = docs
            .filter_map(|doc_result| doc_result.ok())
            .map(|doc| {
                let score = cosine_similarity(query_embedding, &doc.embedding);
                SearchResult {
                    document: doc,
                    score,
                }
            })
            .collect();

        // Sort by score descending
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        debug!("Found {} matching documents", results.len());
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn delete_by_source_id(&self, source_id: &str) -> Result<usize> {
        let conn = self.lock_conn()?;

        let deleted = conn.execute(
            "DELETE FROM documents WHERE source_id = ?1",
            params![source_id],
        )?;

        info!("Deleted {} documents for source {}", deleted, source_id);
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn get_by_source_id(&self, source_id: &str) -> Result<Vec<Document>> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, source_id, content, sequence_index, embedding, indexed_at
            FROM documents
            WHERE source_id = ?1
            ORDER BY sequence_index
            "#,
        )?;

        let docs = stmt.query_map(params![source_id], Self::row_to_document)?;
        let result: Vec<Document> = docs.filter_map(|d| d.ok()).collect();
        debug!("Found {} documents for source {}", result.len(), source_id);
        Ok(result)
    }

    async fn document_count(&self) -> Result<usize> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
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
    async fn test_upsert_search_delete() {
        let store = SqliteVectorStore::in_memory().unwrap();

        store
            .upsert_batch(&[
                doc("video1", 0, "first chunk", vec![1.0, 0.0, 0.0]),
                doc("video1", 1, "second chunk", vec![0.0, 1.0, 0.0]),
            ])
            .await
            .unwrap();

        assert_eq!(store.document_count().await.unwrap(), 2);

        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.content, "first chunk");
        assert!((results[0].score - 1.0).abs() < 0.001);
        assert!(results[0].score > results[1].score);

        let deleted = store.delete_by_source_id("video1").await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.document_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_by_source_id_ordered() {
        let store = SqliteVectorStore::in_memory().unwrap();

        store
            .upsert_batch(&[
                doc("video1", 1, "second", vec![0.0, 1.0]),
                doc("video1", 0, "first", vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let docs = store.get_by_source_id("video1").await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].content, "first");
        assert_eq!(docs[1].content, "second");
    }

    #[tokio::test]
    async fn test_open_existing_requires_built_index() {
        let root = tempfile::tempdir().unwrap();

        let result = SqliteVectorStore::open_existing(root.path(), "missing");
        assert!(matches!(result, Err(SvarError::IndexNotFound(id)) if id == "missing"));

        SqliteVectorStore::create(root.path(), "video1").unwrap();
        assert!(SqliteVectorStore::open_existing(root.path(), "video1").is_ok());
    }

    #[tokio::test]
    async fn test_list_sources() {
        let root = tempfile::tempdir().unwrap();

        let store = SqliteVectorStore::create(root.path(), "video1").unwrap();
        store
            .upsert_batch(&[doc("video1", 0, "content", vec![1.0])])
            .await
            .unwrap();

        // An index with no documents yet is not listed
        SqliteVectorStore::create(root.path(), "video2").unwrap();

        let sources = SqliteVectorStore::list_sources(root.path()).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].source_id, "video1");
        assert_eq!(sources[0].chunk_count, 1);
    }
}
