use std::fs::File;
use std::io::Read;
use std::path::Path;

use mupdf::{Document, Page, TextPageFlags};

use pdf2md_core::{BackendError, PageText, PdfBackend};

/// Every PDF starts with this header.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that the rest of the workspace does not
/// transitively depend on it.
///
/// Optionally drops text blocks in a band at the top (header) and bottom
/// (footer) of each page, given as a fraction of the page height. Both are
/// disabled by default so every line of the page is kept.
#[derive(Debug, Clone, Default)]
pub struct MupdfBackend {
    /// Fraction of page height from bottom to exclude as footer (0.0–1.0).
    /// `None` disables footer exclusion.
    footer_exclusion_ratio: Option<f32>,
    /// Fraction of page height from top to exclude as header (0.0–1.0).
    /// `None` disables header exclusion.
    header_exclusion_ratio: Option<f32>,
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the footer exclusion ratio. Pass `0.0` to disable.
    pub fn with_footer_exclusion(mut self, ratio: f32) -> Self {
        self.footer_exclusion_ratio = if ratio > 0.0 { Some(ratio.min(1.0)) } else { None };
        self
    }

    /// Set the header exclusion ratio. Pass `0.0` to disable.
    pub fn with_header_exclusion(mut self, ratio: f32) -> Self {
        self.header_exclusion_ratio = if ratio > 0.0 { Some(ratio.min(1.0)) } else { None };
        self
    }

    fn page_text(&self, page: &Page) -> Result<String, BackendError> {
        let text_page = page
            .to_text_page(TextPageFlags::empty())
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

        let page_bounds = page
            .bounds()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
        let page_height = page_bounds.y1 - page_bounds.y0;

        let header_threshold = self
            .header_exclusion_ratio
            .map(|r| page_bounds.y0 + page_height * r);
        let footer_threshold = self
            .footer_exclusion_ratio
            .map(|r| page_bounds.y1 - page_height * r);

        let mut page_text = String::new();
        for block in text_page.blocks() {
            let block_bounds = block.bounds();

            // Skip blocks entirely within the header region
            if let Some(threshold) = header_threshold
                && block_bounds.y1 <= threshold
            {
                continue;
            }

            // Skip blocks whose top edge is in the footer region
            if let Some(threshold) = footer_threshold
                && block_bounds.y0 >= threshold
            {
                continue;
            }

            for line in block.lines() {
                let line_text: String = line
                    .chars()
                    .map(|c| c.char().unwrap_or('\u{FFFD}'))
                    .collect();
                page_text.push_str(&line_text);
                page_text.push('\n');
            }
        }
        Ok(page_text)
    }
}

/// The header may be preceded by junk (a BOM, whitespace) within this many bytes.
const MAGIC_SEARCH_WINDOW: u64 = 1024;

/// Read the start of the file and reject anything that is not a PDF.
///
/// MuPDF will happily "repair" arbitrary bytes into an empty document; a
/// file without the header should fail to open instead.
fn check_magic(path: &Path) -> Result<(), BackendError> {
    let mut head = Vec::with_capacity(MAGIC_SEARCH_WINDOW as usize);
    File::open(path)?
        .take(MAGIC_SEARCH_WINDOW)
        .read_to_end(&mut head)?;
    if !head.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        return Err(BackendError::OpenError(format!(
            "{} is not a PDF (missing %PDF- header)",
            path.display()
        )));
    }
    Ok(())
}

impl PdfBackend for MupdfBackend {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, BackendError> {
        check_magic(path)?;

        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        let page_count = document
            .page_count()
            .map_err(|e| BackendError::OpenError(e.to_string()))?;

        let mut pages = Vec::with_capacity(page_count.max(0) as usize);
        for page_num in 0..page_count {
            let text = document
                .load_page(page_num)
                .map_err(|e| BackendError::ExtractionError(e.to_string()))
                .and_then(|page| self.page_text(&page));
            if let Err(ref e) = text {
                tracing::debug!(path = %path.display(), page = page_num + 1, error = %e, "page extraction failed");
            }
            pages.push(text);
        }

        Ok(pages)
    }
}
