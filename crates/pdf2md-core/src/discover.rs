use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Returns true if the file name matches `*.pdf`.
///
/// Matching is case-sensitive: the extension must be exactly `pdf`.
/// Dot-files are matched like any other name.
fn matches_pdf_glob(name: &str) -> bool {
    name.len() > ".pdf".len() && name.ends_with(".pdf")
}

/// List the PDF files directly inside `dir`, sorted by path.
///
/// A directory that does not exist yields an empty list, the same as an
/// empty directory. Other I/O errors are returned.
pub fn discover(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(dir = %dir.display(), "input directory does not exist");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            tracing::debug!(path = %entry.path().display(), "skipping non-UTF-8 file name");
            continue;
        };
        if !matches_pdf_glob(name) {
            continue;
        }
        // Follows symlinks, so a link to a PDF counts as a PDF.
        if !entry.path().is_file() {
            continue;
        }
        paths.push(entry.path());
    }

    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"%PDF-1.4\n").unwrap();
    }

    #[test]
    fn glob_matching() {
        assert!(matches_pdf_glob("a.pdf"));
        assert!(matches_pdf_glob("report 2024.pdf"));
        assert!(!matches_pdf_glob("a.PDF"));
        assert!(!matches_pdf_glob("a.pdf.bak"));
        assert!(matches_pdf_glob(".hidden.pdf"));
        assert!(!matches_pdf_glob(".pdf"));
        assert!(!matches_pdf_glob("notes.txt"));
    }

    #[test]
    fn missing_directory_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let found = discover(&tmp.path().join("does-not-exist")).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn finds_only_pdfs_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "b.pdf");
        touch(tmp.path(), "a.pdf");
        touch(tmp.path(), "C.pdf");
        touch(tmp.path(), "readme.md");
        touch(tmp.path(), "upper.PDF");
        touch(tmp.path(), ".draft.pdf");
        std::fs::create_dir(tmp.path().join("folder.pdf")).unwrap();
        std::fs::create_dir(tmp.path().join("nested")).unwrap();
        touch(&tmp.path().join("nested"), "inner.pdf");

        let names: Vec<String> = discover(tmp.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec![".draft.pdf", "C.pdf", "a.pdf", "b.pdf"]);
    }
}
