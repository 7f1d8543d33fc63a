//! MuPDF backend tests against small PDFs generated on the fly.
//!
//! The generator writes a byte-exact cross-reference table so MuPDF never
//! has to fall back to repair mode.

use std::path::Path;

use pdf2md_core::{BatchConverter, Config, PdfBackend};
use pdf2md_mupdf::MupdfBackend;

/// Build a PDF with one page per entry; each page shows its text in
/// Helvetica, or nothing at all if the entry is empty.
fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let page_count = pages.len();
    // 1 catalog, 2 pages tree, 3 font, then (page, contents) pairs
    let total_objects = 3 + 2 * page_count;

    let mut objects: Vec<String> = Vec::with_capacity(total_objects);
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    let kids: Vec<String> = (0..page_count)
        .map(|i| format!("{} 0 R", 4 + 2 * i))
        .collect();
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        page_count
    ));
    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

    for (i, text) in pages.iter().enumerate() {
        let contents_id = 5 + 2 * i;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {contents_id} 0 R >>"
        ));
        let stream = if text.is_empty() {
            String::new()
        } else {
            format!("BT /F1 24 Tf 72 700 Td ({text}) Tj ET")
        };
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }

    let mut out: Vec<u8> = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );
    out
}

fn write_pdf(dir: &Path, name: &str, pages: &[&str]) {
    std::fs::write(dir.join(name), build_pdf(pages)).unwrap();
}

#[test]
fn extracts_single_page_text() {
    let tmp = tempfile::tempdir().unwrap();
    write_pdf(tmp.path(), "hello.pdf", &["Hello"]);

    let pages = MupdfBackend::new()
        .extract_pages(&tmp.path().join("hello.pdf"))
        .unwrap();

    assert_eq!(pages.len(), 1);
    assert!(pages[0].as_ref().unwrap().contains("Hello"));
}

#[test]
fn pages_come_back_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    write_pdf(tmp.path(), "multi.pdf", &["First", "", "Third"]);

    let pages = MupdfBackend::new()
        .extract_pages(&tmp.path().join("multi.pdf"))
        .unwrap();

    assert_eq!(pages.len(), 3);
    assert!(pages[0].as_ref().unwrap().contains("First"));
    assert!(pages[1].as_ref().unwrap().trim().is_empty());
    assert!(pages[2].as_ref().unwrap().contains("Third"));
}

#[test]
fn bom_before_header_still_opens() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("bom.pdf");
    let mut bytes = b"\xEF\xBB\xBF".to_vec();
    bytes.extend_from_slice(&build_pdf(&["Hello"]));
    std::fs::write(&path, bytes).unwrap();

    let pages = MupdfBackend::new().extract_pages(&path).unwrap();

    assert_eq!(pages.len(), 1);
    assert!(pages[0].as_ref().unwrap().contains("Hello"));
}

#[test]
fn corrupted_header_fails_to_open() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("corrupt.pdf");
    std::fs::write(&path, b"this was never a PDF file\n").unwrap();

    assert!(MupdfBackend::new().extract_pages(&path).is_err());
}

#[test]
fn batch_over_real_pdfs() {
    let tmp = tempfile::tempdir().unwrap();
    let reports = tmp.path().join("reports");
    std::fs::create_dir(&reports).unwrap();
    write_pdf(&reports, "a.pdf", &["Hello"]);
    std::fs::write(reports.join("b.pdf"), b"garbage").unwrap();
    write_pdf(&reports, "c.pdf", &["Alpha", "", "Gamma"]);
    let out = tmp.path().join("out");

    let backend = MupdfBackend::new();
    let config = Config {
        base_dir: tmp.path().to_path_buf(),
        ..Config::default()
    };
    let summary = BatchConverter::new(&backend, config)
        .run(Path::new("reports"), &out, |_| {})
        .unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);

    let a = std::fs::read_to_string(out.join("a-with-no-image-refs.md")).unwrap();
    assert!(a.starts_with("# a\n\n"));
    assert!(a.contains("## Page 1\n\nHello"));

    let c = std::fs::read_to_string(out.join("c-with-no-image-refs.md")).unwrap();
    assert!(c.contains("## Page 1\n\nAlpha"));
    assert!(!c.contains("## Page 2"));
    assert!(c.contains("## Page 3\n\nGamma"));

    assert!(!out.join("b-with-no-image-refs.md").exists());
}
