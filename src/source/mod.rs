//! Text sources for Svar.
//!
//! A source turns an external input (a YouTube URL, a PDF file) into raw text
//! ready for chunking. Timing and layout metadata are discarded.

mod pdf;
mod youtube;

pub use pdf::{extract_text_from_bytes, extract_text_from_file, PageText};
pub use youtube::{extract_video_id, YoutubeTranscriptSource};
