use crate::object::{escape_text, format_real};
use std::fmt::Write;

/// Builds a content stream of positioned text and rules. Coordinates are
/// measured from the top-left corner of the page.
#[derive(Debug, Clone)]
pub struct TextStream {
    page_height: f32,
    ops: String,
}

impl TextStream {
    pub fn new(page_height: f32) -> Self {
        Self {
            page_height,
            ops: String::new(),
        }
    }

    /// One line of text whose baseline sits at `y` from the top.
    pub fn text(&mut self, font: &str, size: f32, x: f32, y: f32, text: &str) -> &mut Self {
        let _ = writeln!(
            self.ops,
            "BT /{} {} Tf {} {} Td ({}) Tj ET",
            font,
            format_real(size),
            format_real(x),
            format_real(self.page_height - y),
            escape_text(text)
        );
        self
    }

    /// Horizontal line from `x1` to `x2` at `y` from the top.
    pub fn rule(&mut self, x1: f32, x2: f32, y: f32, width: f32) -> &mut Self {
        let y = format_real(self.page_height - y);
        let _ = writeln!(
            self.ops,
            "{} w {} {} m {} {} l S",
            format_real(width),
            format_real(x1),
            y,
            format_real(x2),
            y
        );
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn finish(self) -> String {
        self.ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_from_the_top() {
        let mut stream = TextStream::new(800.0);
        stream.text("F2", 18.0, 40.0, 60.0, "INVOICE (copy)").rule(40.0, 100.0, 70.0, 0.5);
        let ops = stream.finish();
        assert_eq!(
            ops,
            "BT /F2 18 Tf 40 740 Td (INVOICE \\(copy\\)) Tj ET\n0.5 w 40 730 m 100 730 l S\n"
        );
    }
}
