use crate::text::is_blank;

/// Accumulates page sections for one document's Markdown output.
///
/// Layout: `# <stem>` followed by a blank line, then for every page with
/// text a `## Page <n>` section preceded by a blank-line boundary:
///
/// ```text
/// # report
///
///
/// ## Page 1
///
/// first page text
///
/// ## Page 3
///
/// third page text
/// ```
#[derive(Debug, Clone)]
pub struct MarkdownDocument {
    title: String,
    body: String,
    sections: usize,
}

impl MarkdownDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: String::new(),
            sections: 0,
        }
    }

    /// Append the text of a page. Whitespace-only pages are skipped and
    /// `false` is returned; no heading is emitted for them.
    pub fn push_page(&mut self, page_number: usize, text: &str) -> bool {
        if is_blank(text) {
            return false;
        }
        self.body.push_str(&format!("\n\n## Page {page_number}\n\n"));
        self.body.push_str(text);
        self.sections += 1;
        true
    }

    pub fn section_count(&self) -> usize {
        self.sections
    }

    pub fn render(&self) -> String {
        format!("# {}\n\n{}", self.title, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_just_the_title() {
        let doc = MarkdownDocument::new("report");
        assert_eq!(doc.render(), "# report\n\n");
        assert_eq!(doc.section_count(), 0);
    }

    #[test]
    fn pages_get_numbered_sections() {
        let mut doc = MarkdownDocument::new("report");
        assert!(doc.push_page(1, "Hello"));
        assert!(doc.push_page(2, "World\n"));
        assert_eq!(
            doc.render(),
            "# report\n\n\n\n## Page 1\n\nHello\n\n## Page 2\n\nWorld\n"
        );
    }

    #[test]
    fn blank_pages_leave_gaps_in_numbering() {
        let mut doc = MarkdownDocument::new("scan");
        assert!(doc.push_page(1, "intro"));
        assert!(!doc.push_page(2, "  \n\t"));
        assert!(doc.push_page(3, "outro"));

        let out = doc.render();
        assert!(out.contains("## Page 1"));
        assert!(!out.contains("## Page 2"));
        assert!(out.contains("## Page 3\n\noutro"));
        assert_eq!(doc.section_count(), 2);
    }

    #[test]
    fn page_text_is_kept_verbatim() {
        let mut doc = MarkdownDocument::new("x");
        doc.push_page(1, "  indented\n# not a heading\n");
        assert!(doc.render().ends_with("  indented\n# not a heading\n"));
    }
}
