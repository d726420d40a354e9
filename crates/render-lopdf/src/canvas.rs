//! Page content builder working in top-left page coordinates (points).

use folio_render_core::metrics::text_width;
use folio_render_core::utils::{encode_win_ansi, flip_y};
use folio_types::Color;
use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};

pub const REGULAR_FONT: &str = "F1";
pub const BOLD_FONT: &str = "F2";

#[derive(Debug, Default)]
struct CanvasState {
    is_text_section_open: bool,
    fill_color: Option<Color>,
    font: Option<(&'static str, f32)>,
}

/// Accumulates content-stream operations for one page, emitting colour and
/// font changes only when they differ from the current state.
#[derive(Debug)]
pub struct PageCanvas {
    ops: Vec<Operation>,
    state: CanvasState,
    page_height: f32,
}

impl PageCanvas {
    pub fn new(page_height: f32) -> Self {
        Self {
            ops: Vec::new(),
            state: CanvasState::default(),
            page_height,
        }
    }

    fn end_text(&mut self) {
        if self.state.is_text_section_open {
            self.ops.push(Operation::new("ET", vec![]));
            self.state.is_text_section_open = false;
        }
    }

    fn set_fill(&mut self, color: Color) {
        if self.state.fill_color != Some(color) {
            let (r, g, b) = color.unit_rgb();
            self.ops
                .push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
            self.state.fill_color = Some(color);
        }
    }

    /// Fills the rectangle whose top-left corner is `(x, y)`.
    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.end_text();
        self.set_fill(color);
        let bottom = flip_y(y + height, self.page_height);
        self.ops.push(Operation::new(
            "re",
            vec![x.into(), bottom.into(), width.into(), height.into()],
        ));
        self.ops.push(Operation::new("f", vec![]));
    }

    /// Horizontal rule across `x1..x2` at `y`.
    pub fn hline(&mut self, x1: f32, x2: f32, y: f32, thickness: f32, color: Color) {
        self.fill_rect(x1, y, x2 - x1, thickness, color);
    }

    /// Draws one line of text with its top edge at `y`.
    pub fn text(&mut self, x: f32, y: f32, text: &str, size: f32, bold: bool, color: Color) {
        if text.is_empty() {
            return;
        }
        if !self.state.is_text_section_open {
            self.ops.push(Operation::new("BT", vec![]));
            self.state.is_text_section_open = true;
        }
        self.set_fill(color);
        let font = if bold { BOLD_FONT } else { REGULAR_FONT };
        if self.state.font != Some((font, size)) {
            self.ops
                .push(Operation::new("Tf", vec![Object::Name(font.as_bytes().to_vec()), size.into()]));
            self.state.font = Some((font, size));
        }
        let baseline = flip_y(y + size * 0.8, self.page_height);
        self.ops.push(Operation::new(
            "Tm",
            vec![1.0.into(), 0.0.into(), 0.0.into(), 1.0.into(), x.into(), baseline.into()],
        ));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        ));
    }

    /// Draws text so that it ends at `right`.
    pub fn text_right(&mut self, right: f32, y: f32, text: &str, size: f32, bold: bool, color: Color) {
        let width = text_width(text, size, bold);
        self.text(right - width, y, text, size, bold, color);
    }

    /// Paints the named image XObject into the given top-left rectangle.
    pub fn image(&mut self, name: &str, x: f32, y: f32, width: f32, height: f32) {
        self.end_text();
        let bottom = flip_y(y + height, self.page_height);
        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new(
            "cm",
            vec![width.into(), 0.0.into(), 0.0.into(), height.into(), x.into(), bottom.into()],
        ));
        self.ops
            .push(Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]));
        self.ops.push(Operation::new("Q", vec![]));
    }

    pub fn into_content(mut self) -> Content {
        self.end_text();
        Content {
            operations: self.ops,
        }
    }
}
