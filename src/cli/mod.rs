//! CLI module for Svar.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Svar - Chat with Videos and Documents
///
/// A local-first CLI tool for asking questions about YouTube videos and PDF
/// documents. The name "Svar" comes from the Norwegian/Scandinavian word for
/// "answer."
#[derive(Parser, Debug)]
#[command(name = "svar")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Svar and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Interactive menu with all three features
    Menu,

    /// Send a single prompt to the LLM (no retrieval)
    Chat {
        /// The prompt to send. Omit for an interactive session.
        prompt: Option<String>,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Ask about a YouTube video (builds or reuses its index)
    Video {
        /// Full YouTube link (youtu.be short link or watch URL)
        url: String,

        /// Question about the video. Omit to only build the index.
        question: Option<String>,

        /// Rebuild the index even if it already exists
        #[arg(short, long)]
        force: bool,
    },

    /// Ask about a PDF document
    Pdf {
        /// Path to the PDF file
        file: PathBuf,

        /// Question about the document. Omit for an interactive session.
        question: Option<String>,
    },

    /// List indexed video sources
    List,

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
