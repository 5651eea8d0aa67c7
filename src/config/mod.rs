//! Configuration module for Svar.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{ChatPrompts, Prompts, RagPrompts};
pub use settings::{
    ChatSettings, ChunkingSettings, EmbeddingSettings, GeneralSettings, PromptSettings,
    RagSettings, Settings, TranscriptSettings, VectorStoreSettings,
};
