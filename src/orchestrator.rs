//! Pipeline orchestrator for Svar.
//!
//! Coordinates the write path (fetch source text, chunk, embed, index) and
//! the read path (retrieve, answer) for both video and document sources.

use crate::chunking::Chunker;
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::Result;
use crate::rag::{RagEngine, RagResponse};
use crate::source::{self, YoutubeTranscriptSource};
use crate::vector_store::{Document, MemoryVectorStore, SqliteVectorStore, VectorStore};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};

/// The main orchestrator for the Svar pipeline.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    transcript_source: YoutubeTranscriptSource,
    chunker: Chunker,
    embedder: Arc<dyn Embedder>,
    index_root: PathBuf,
    // Serializes concurrent builds of the same source index.
    build_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl Orchestrator {
    /// Create a new orchestrator from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));
        Self::with_embedder(settings, embedder)
    }

    /// Create an orchestrator with a custom embedder.
    pub fn with_embedder(settings: Settings, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let prompts = Prompts::load(Some(&settings.prompts.variables))?;
        let chunker = Chunker::new(settings.chunking.chunk_size, settings.chunking.overlap)?;
        let index_root = settings.index_root();

        Ok(Self {
            settings,
            prompts,
            transcript_source: YoutubeTranscriptSource::new(),
            chunker,
            embedder,
            index_root,
            build_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get the index root directory.
    pub fn index_root(&self) -> &Path {
        &self.index_root
    }

    fn lock_for(&self, source_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.build_locks.lock().unwrap();
        locks
            .entry(source_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Build the persistent index for a video, or reuse it when it already
    /// exists.
    ///
    /// Reuse is the default: an existing index answers identically unless
    /// the source text changed, so rebuilding is skipped entirely. With
    /// `force` the old documents are removed and the index rebuilt.
    #[instrument(skip(self), fields(input = %input))]
    pub async fn index_video(&self, input: &str, force: bool) -> Result<IndexResult> {
        let source_id = source::extract_video_id(input)?;

        let lock = self.lock_for(&source_id);
        let _guard = lock.lock().await;

        if !force && SqliteVectorStore::index_exists(&self.index_root, &source_id) {
            info!("Index for {} already exists, reusing", source_id);
            return Ok(IndexResult {
                source_id,
                chunks_indexed: 0,
                reused: true,
            });
        }

        let preferred = self.settings.transcript.preferred_language.as_deref();
        let transcript = self
            .transcript_source
            .fetch_transcript(&source_id, preferred)
            .await?;

        let chunks = self.chunker.split(&source_id, &transcript);
        info!("Split transcript for {} into {} chunks", source_id, chunks.len());

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let documents: Vec<Document> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| Document::new(chunk, embedding))
            .collect();

        let store = SqliteVectorStore::create(&self.index_root, &source_id)?;
        if force {
            store.delete_by_source_id(&source_id).await?;
        }
        let indexed = store.upsert_batch(&documents).await?;

        Ok(IndexResult {
            source_id,
            chunks_indexed: indexed,
            reused: false,
        })
    }

    /// Answer a question about an indexed video.
    ///
    /// Fails with `IndexNotFound` when the video has not been indexed yet.
    #[instrument(skip(self), fields(input = %input, question = %question))]
    pub async fn ask_video(&self, input: &str, question: &str) -> Result<RagResponse> {
        let source_id = source::extract_video_id(input)?;
        let store = SqliteVectorStore::open_existing(&self.index_root, &source_id)?;

        self.engine(Arc::new(store)).ask(question).await
    }

    /// Load a PDF from raw bytes into an ephemeral session.
    #[instrument(skip(self, bytes), fields(source_id = %source_id, len = bytes.len()))]
    pub async fn load_pdf_bytes(&self, source_id: &str, bytes: &[u8]) -> Result<PdfSession> {
        let pages = source::extract_text_from_bytes(bytes)?;
        self.build_pdf_session(source_id, &pages).await
    }

    /// Load a PDF file into an ephemeral session.
    pub async fn load_pdf_file(&self, path: &Path) -> Result<PdfSession> {
        let source_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());

        let pages = source::extract_text_from_file(path)?;
        self.build_pdf_session(&source_id, &pages).await
    }

    async fn build_pdf_session(
        &self,
        source_id: &str,
        pages: &[source::PageText],
    ) -> Result<PdfSession> {
        let chunks = self.chunker.split_pages(source_id, pages);
        info!("Split document {} into {} chunks", source_id, chunks.len());

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let documents: Vec<Document> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| Document::new(chunk, embedding))
            .collect();

        let store = MemoryVectorStore::new();
        let chunks_indexed = store.upsert_batch(&documents).await?;

        Ok(PdfSession {
            source_id: source_id.to_string(),
            chunks_indexed,
            engine: self.engine(Arc::new(store)),
        })
    }

    /// List all indexed video sources.
    pub fn list_sources(&self) -> Result<Vec<crate::vector_store::IndexedSource>> {
        SqliteVectorStore::list_sources(&self.index_root)
    }

    fn engine(&self, store: Arc<dyn VectorStore>) -> RagEngine {
        RagEngine::new(
            store,
            self.embedder.clone(),
            &self.settings.rag.model,
            self.settings.rag.max_context_chunks as usize,
        )
        .with_prompts(self.prompts.clone())
    }
}

/// Result of indexing a video.
#[derive(Debug)]
pub struct IndexResult {
    /// Source ID.
    pub source_id: String,
    /// Number of chunks indexed (0 when the existing index was reused).
    pub chunks_indexed: usize,
    /// Whether an existing index was reused.
    pub reused: bool,
}

/// An ephemeral document Q&A session.
///
/// Holds the in-memory index built from one uploaded document. The index is
/// discarded with the session; a new upload always rebuilds it.
pub struct PdfSession {
    /// Identifier derived from the uploaded document.
    pub source_id: String,
    /// Number of chunks indexed from the document.
    pub chunks_indexed: usize,
    engine: RagEngine,
}

impl PdfSession {
    /// Answer a question about the loaded document. Each question is
    /// answered independently.
    pub async fn ask(&self, question: &str) -> Result<RagResponse> {
        self.engine.ask(question).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SvarError;

    fn settings_with_index_root(root: &Path) -> Settings {
        let mut settings = Settings::default();
        settings.vector_store.index_root = root.to_string_lossy().to_string();
        settings
    }

    #[tokio::test]
    async fn test_ask_video_without_index_fails() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::new(settings_with_index_root(dir.path())).unwrap();

        let result = orchestrator
            .ask_video("https://youtu.be/abc123xyz", "what is this about?")
            .await;

        assert!(matches!(result, Err(SvarError::IndexNotFound(id)) if id == "abc123xyz"));
    }

    #[tokio::test]
    async fn test_invalid_url_rejected_before_any_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::new(settings_with_index_root(dir.path())).unwrap();

        let result = orchestrator.index_video("https://example.com/video", false).await;
        assert!(matches!(result, Err(SvarError::InvalidSource(_))));

        let result = orchestrator.ask_video("not a url", "question").await;
        assert!(matches!(result, Err(SvarError::InvalidSource(_))));
    }

    #[tokio::test]
    async fn test_existing_index_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::new(settings_with_index_root(dir.path())).unwrap();

        // A previously built index means no fetch, no embedding, no rebuild
        SqliteVectorStore::create(dir.path(), "abc123xyz").unwrap();

        let result = orchestrator
            .index_video("https://youtu.be/abc123xyz", false)
            .await
            .unwrap();

        assert!(result.reused);
        assert_eq!(result.chunks_indexed, 0);
        assert_eq!(result.source_id, "abc123xyz");
    }
}
