use lopdf::Document as LopdfDocument;

/// Concatenated, decoded content streams of every page.
///
/// Both producers write Helvetica with WinAnsi literals, so shown text
/// appears verbatim as `(text) Tj`.
pub fn page_content(doc: &LopdfDocument) -> String {
    let mut content = String::new();
    for page_id in doc.get_pages().values() {
        if let Ok(bytes) = doc.get_page_content(*page_id) {
            content.push_str(&String::from_utf8_lossy(&bytes));
            content.push('\n');
        }
    }
    content
}

/// Whether `text` is shown as one complete string literal.
pub fn shows_text(doc: &LopdfDocument, text: &str) -> bool {
    page_content(doc).contains(&format!("({})", text))
}

pub fn count_shown(doc: &LopdfDocument, text: &str) -> usize {
    page_content(doc).matches(&format!("({})", text)).count()
}

/// Number of image XObjects across all pages.
pub fn image_count(doc: &LopdfDocument) -> usize {
    doc.objects
        .values()
        .filter_map(|obj| obj.as_stream().ok())
        .filter(|stream| {
            stream
                .dict
                .get(b"Subtype")
                .and_then(|s| s.as_name())
                .map(|name| name == b"Image")
                .unwrap_or(false)
        })
        .count()
}

/// Assert that a string literal with exactly this text is shown
#[macro_export]
macro_rules! assert_pdf_shows {
    ($pdf:expr, $text:expr) => {
        assert!(
            $crate::common::pdf_assertions::shows_text(&$pdf.doc, $text),
            "PDF should show '{}', but its content was:\n{}",
            $text,
            $crate::common::pdf_assertions::page_content(&$pdf.doc)
        );
    };
}

/// Assert that no string literal with exactly this text is shown
#[macro_export]
macro_rules! assert_pdf_not_shows {
    ($pdf:expr, $text:expr) => {
        assert!(
            !$crate::common::pdf_assertions::shows_text(&$pdf.doc, $text),
            "PDF should NOT show '{}', but it was found in:\n{}",
            $text,
            $crate::common::pdf_assertions::page_content(&$pdf.doc)
        );
    };
}

/// Assert the number of pages in a PDF
#[macro_export]
macro_rules! assert_pdf_page_count {
    ($pdf:expr, $count:expr) => {
        assert_eq!(
            $pdf.page_count(),
            $count,
            "Expected {} pages, got {}",
            $count,
            $pdf.page_count()
        );
    };
}

/// Assert minimum number of pages
#[macro_export]
macro_rules! assert_pdf_min_pages {
    ($pdf:expr, $min:expr) => {
        assert!(
            $pdf.page_count() >= $min,
            "Expected at least {} pages, got {}",
            $min,
            $pdf.page_count()
        );
    };
}
