use std::path::Path;

use crate::markdown::MarkdownDocument;
use crate::naming::{document_stem, output_file_name};
use crate::text::expand_ligatures;
use crate::{Config, ConvertError, DocumentReport, PageFailure, PdfBackend};

/// Convert a single PDF into `<output_dir>/<stem><suffix>.md`.
///
/// Creates `output_dir` if needed. A page that fails to extract is logged
/// and left out; the document still succeeds. Failing to open the PDF or
/// to write the output fails the document.
pub fn convert_one(
    backend: &dyn PdfBackend,
    pdf_path: &Path,
    output_dir: &Path,
    config: &Config,
) -> Result<DocumentReport, ConvertError> {
    let stem = document_stem(pdf_path).ok_or_else(|| ConvertError::NoStem {
        path: pdf_path.to_path_buf(),
    })?;
    let output = output_dir.join(output_file_name(&stem, &config.output_suffix, None));
    convert_to(backend, pdf_path, &stem, &output, config)
}

/// Convert a single PDF into an explicit output file, titled `stem`.
pub fn convert_to(
    backend: &dyn PdfBackend,
    pdf_path: &Path,
    stem: &str,
    output: &Path,
    config: &Config,
) -> Result<DocumentReport, ConvertError> {
    let result = extract_and_write(backend, pdf_path, stem, output, config);
    if let Err(ref e) = result {
        tracing::error!(path = %pdf_path.display(), error = %e, "failed to process document");
    }
    result
}

fn extract_and_write(
    backend: &dyn PdfBackend,
    pdf_path: &Path,
    stem: &str,
    output: &Path,
    config: &Config,
) -> Result<DocumentReport, ConvertError> {
    let pages = backend
        .extract_pages(pdf_path)
        .map_err(|source| ConvertError::Backend {
            path: pdf_path.to_path_buf(),
            source,
        })?;

    let pages_total = pages.len();
    let mut markdown = MarkdownDocument::new(stem);
    let mut pages_blank = 0;
    let mut page_failures = Vec::new();

    for (idx, page) in pages.into_iter().enumerate() {
        let page_number = idx + 1;
        match page {
            Ok(text) => {
                let text = if config.expand_ligatures {
                    expand_ligatures(&text)
                } else {
                    text
                };
                if !markdown.push_page(page_number, &text) {
                    pages_blank += 1;
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %pdf_path.display(),
                    page = page_number,
                    error = %e,
                    "failed to extract text from page"
                );
                page_failures.push(PageFailure {
                    page: page_number,
                    message: e.to_string(),
                });
            }
        }
    }

    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ConvertError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    std::fs::write(output, markdown.render()).map_err(|source| ConvertError::Write {
        path: output.to_path_buf(),
        source,
    })?;

    tracing::info!(
        stem,
        output = %output.display(),
        pages = pages_total,
        sections = markdown.section_count(),
        "exported document"
    );

    Ok(DocumentReport {
        source: pdf_path.to_path_buf(),
        stem: stem.to_string(),
        output: output.to_path_buf(),
        pages_total,
        pages_written: markdown.section_count(),
        pages_blank,
        page_failures,
    })
}
