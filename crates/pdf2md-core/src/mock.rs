//! Mock PDF backend for testing.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::{BackendError, PageText, PdfBackend};

/// A scripted page for [`MockBackend`].
#[derive(Clone, Debug)]
pub enum MockPage {
    /// Extraction succeeds with this text.
    Text(String),
    /// Extraction of this page fails with this message.
    Error(String),
}

impl MockPage {
    pub fn text(text: impl Into<String>) -> Self {
        MockPage::Text(text.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        MockPage::Error(message.into())
    }
}

#[derive(Clone, Debug)]
enum MockDocument {
    Pages(Vec<MockPage>),
    Unreadable(String),
}

/// A hand-rolled mock implementing [`PdfBackend`] for tests.
///
/// Documents are registered by file name (not full path), so tests can
/// create real files in a temp directory for discovery and script what the
/// "PDF" contains here. Files that were never registered fail to open.
pub struct MockBackend {
    documents: Mutex<HashMap<String, MockDocument>>,
    call_count: AtomicUsize,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Register a document whose pages extract as scripted.
    pub fn with_document(self, file_name: &str, pages: Vec<MockPage>) -> Self {
        self.insert(file_name, MockDocument::Pages(pages));
        self
    }

    /// Register a document that cannot be opened.
    pub fn with_unreadable(self, file_name: &str, message: &str) -> Self {
        self.insert(file_name, MockDocument::Unreadable(message.to_string()));
        self
    }

    /// Number of times [`PdfBackend::extract_pages`] was called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn insert(&self, file_name: &str, document: MockDocument) {
        if let Ok(mut docs) = self.documents.lock() {
            docs.insert(file_name.to_string(), document);
        }
    }
}

impl PdfBackend for MockBackend {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, BackendError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let document = self
            .documents
            .lock()
            .map_err(|_| BackendError::OpenError("mock state poisoned".into()))?
            .get(&name)
            .cloned();

        match document {
            Some(MockDocument::Pages(pages)) => Ok(pages
                .into_iter()
                .map(|page| match page {
                    MockPage::Text(text) => Ok(text),
                    MockPage::Error(msg) => Err(BackendError::ExtractionError(msg)),
                })
                .collect()),
            Some(MockDocument::Unreadable(msg)) => Err(BackendError::OpenError(msg)),
            None => Err(BackendError::OpenError(format!(
                "no mock document registered for {name}"
            ))),
        }
    }
}
