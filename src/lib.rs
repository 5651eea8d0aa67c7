//! Svar - Chat with Videos and Documents
//!
//! A local-first CLI tool for asking questions about YouTube videos and PDF
//! documents, backed by retrieval-augmented generation.
//!
//! The name "Svar" comes from the Norwegian/Scandinavian word for "answer."
//!
//! # Overview
//!
//! Svar allows you to:
//! - Chat directly with an LLM, one prompt at a time
//! - Fetch YouTube transcripts and build a searchable per-video index
//! - Load PDF documents and ask questions about their content
//! - Get answers grounded in the retrieved source text
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `source` - Text sources (YouTube transcripts, PDF documents)
//! - `chunking` - Splitting source text into overlapping chunks
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector index abstraction
//! - `rag` - Retrieval-augmented question answering
//! - `chat` - Direct single-turn chat without retrieval
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use svar::config::Settings;
//! use svar::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     // Build (or reuse) the index for a video, then ask about it
//!     let indexed = orchestrator
//!         .index_video("https://youtu.be/dQw4w9WgXcQ", false)
//!         .await?;
//!     println!("Indexed {} chunks", indexed.chunks_indexed);
//!
//!     let response = orchestrator
//!         .ask_video("https://youtu.be/dQw4w9WgXcQ", "What is the video about?")
//!         .await?;
//!     println!("{}", response.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod source;
pub mod vector_store;

pub use error::{Result, SvarError};
