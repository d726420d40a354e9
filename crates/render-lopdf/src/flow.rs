use crate::canvas::PageCanvas;
use folio_types::PageFormat;

/// A top-to-bottom cursor over a sequence of pages. Content that would cross
/// the bottom margin moves to a fresh page.
#[derive(Debug)]
pub struct PageFlow {
    finished: Vec<PageCanvas>,
    current: PageCanvas,
    y: f32,
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
}

impl PageFlow {
    pub fn new(page: PageFormat, margin: f32) -> Self {
        let page_height = page.height_pt();
        Self {
            finished: Vec::new(),
            current: PageCanvas::new(page_height),
            y: margin,
            page_width: page.width_pt(),
            page_height,
            margin,
        }
    }

    pub fn canvas(&mut self) -> &mut PageCanvas {
        &mut self.current
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn advance(&mut self, dy: f32) {
        self.y += dy;
    }

    pub fn left(&self) -> f32 {
        self.margin
    }

    pub fn right(&self) -> f32 {
        self.page_width - self.margin
    }

    pub fn content_width(&self) -> f32 {
        self.right() - self.left()
    }

    /// Starts a new page unless `height` still fits on this one. Returns
    /// `true` when a page break happened.
    pub fn ensure_space(&mut self, height: f32) -> bool {
        let at_top = self.y <= self.margin;
        if !at_top && self.y + height > self.page_height - self.margin {
            self.new_page();
            return true;
        }
        false
    }

    pub fn new_page(&mut self) {
        let full = std::mem::replace(&mut self.current, PageCanvas::new(self.page_height));
        self.finished.push(full);
        self.y = self.margin;
    }

    pub fn page_count(&self) -> usize {
        self.finished.len() + 1
    }

    pub fn into_pages(mut self) -> Vec<PageCanvas> {
        self.finished.push(self.current);
        self.finished
    }
}
