//! PDF document source.
//!
//! Stages the document bytes in a scoped temporary file, extracts text
//! page-by-page, and releases the temporary file when extraction finishes,
//! whether it succeeded or not.

use crate::error::{Result, SvarError};
use pdf_oxide::converters::ConversionOptions;
use std::io::Write;
use std::path::Path;
use tracing::{debug, instrument};

/// Extracted text for one page of a document.
#[derive(Debug, Clone)]
pub struct PageText {
    /// 1-based page number.
    pub page_number: usize,
    /// Text content of the page.
    pub text: String,
}

/// Extract text from PDF bytes, page by page.
#[instrument(skip(bytes), fields(len = bytes.len()))]
pub fn extract_text_from_bytes(bytes: &[u8]) -> Result<Vec<PageText>> {
    // The parser wants a file on disk; the temp file is removed when this
    // function returns, on the error paths included.
    let mut staged = tempfile::Builder::new()
        .prefix("svar-upload-")
        .suffix(".pdf")
        .tempfile()?;
    staged.write_all(bytes)?;
    staged.flush()?;

    extract_pages(staged.path())
}

/// Extract text from a PDF file on disk, page by page.
pub fn extract_text_from_file(path: &Path) -> Result<Vec<PageText>> {
    if !path.exists() {
        return Err(SvarError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("No such file: {}", path.display()),
        )));
    }
    extract_pages(path)
}

fn extract_pages(path: &Path) -> Result<Vec<PageText>> {
    let path_str = path
        .to_str()
        .ok_or_else(|| SvarError::InvalidInput(format!("Non-UTF8 path: {}", path.display())))?;

    let mut doc = pdf_oxide::PdfDocument::open(path_str)
        .map_err(|e| SvarError::SourceUnavailable(format!("Failed to open PDF: {}", e)))?;
    let page_count = doc
        .page_count()
        .map_err(|e| SvarError::SourceUnavailable(format!("Failed to read PDF: {}", e)))?;

    let options = ConversionOptions {
        include_images: false,
        ..ConversionOptions::default()
    };

    let mut pages = Vec::new();
    for page_index in 0..page_count {
        let text = doc
            .to_markdown(page_index, &options)
            .map_err(|e| SvarError::SourceUnavailable(format!("Failed to extract page: {}", e)))?;
        if !text.trim().is_empty() {
            pages.push(PageText {
                page_number: page_index + 1,
                text,
            });
        }
    }

    if pages.is_empty() {
        return Err(SvarError::SourceUnavailable(
            "PDF contains no extractable text".to_string(),
        ));
    }

    debug!("Extracted text from {} pages", pages.len());
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_bytes_rejected() {
        let result = extract_text_from_bytes(b"not a pdf");
        assert!(matches!(result, Err(SvarError::SourceUnavailable(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = extract_text_from_file(Path::new("/nonexistent/file.pdf"));
        assert!(matches!(result, Err(SvarError::Io(_))));
    }
}
