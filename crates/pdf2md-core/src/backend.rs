use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Text of a single page, or the reason that page could not be extracted.
pub type PageText = Result<String, BackendError>;

/// Trait for PDF text extraction backends.
///
/// The outer `Result` covers the whole document (cannot open, not a PDF,
/// page tree unreadable). The inner per-page results are independent: a
/// failing page must not prevent the remaining pages from being returned.
/// Pages are returned in document order, so `pages[i]` is page `i + 1`.
pub trait PdfBackend: Send + Sync {
    /// Extract the text of every page of a PDF file.
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, BackendError>;
}
