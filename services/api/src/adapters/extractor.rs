//! services/api/src/adapters/extractor.rs
//!
//! The document text extractor. Implements `TextExtractionService`: PDFs go
//! through `pdf-extract` page by page, plain-text files are read directly, and
//! every failure degrades to an empty string after being logged.

use std::fs;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use study_assistant_core::ports::TextExtractionService;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" | "md" | "markdown" => Some(Self::PlainText),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentTextExtractor;

impl DocumentTextExtractor {
    pub fn new() -> Self {
        Self
    }

    fn try_extract(&self, path: &Path) -> Result<String, String> {
        let kind = DocumentKind::from_path(path)
            .ok_or_else(|| "unsupported document type".to_string())?;
        let bytes = fs::read(path).map_err(|e| format!("failed to read file: {}", e))?;

        let text = match kind {
            DocumentKind::Pdf => extract_pdf_pages(&bytes)?.join("\n"),
            DocumentKind::PlainText => String::from_utf8_lossy(&bytes).into_owned(),
        };
        Ok(clean_text(&text))
    }
}

impl TextExtractionService for DocumentTextExtractor {
    fn extract_text(&self, path: &Path) -> String {
        match self.try_extract(path) {
            Ok(text) => {
                info!(
                    "Extracted {} chars from {}",
                    text.chars().count(),
                    path.display()
                );
                text
            }
            Err(reason) => {
                warn!("Text extraction failed for {}: {}", path.display(), reason);
                String::new()
            }
        }
    }
}

/// `pdf-extract` can panic on malformed fonts and content streams, so the call is
/// isolated with `catch_unwind`.
fn extract_pdf_pages(bytes: &[u8]) -> Result<Vec<String>, String> {
    match catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    })) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(format!("PDF extraction failed: {}", e)),
        Err(_) => Err("PDF extraction panicked, likely on a malformed font".to_string()),
    }
}

fn clean_text(text: &str) -> String {
    text.replace('\0', "").trim().to_string()
}
