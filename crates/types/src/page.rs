use serde::{Deserialize, Serialize};

const PT_PER_MM: f32 = 72.0 / 25.4;
const CSS_PX_PER_MM: f32 = 96.0 / 25.4;

/// A physical page format. Only portrait orientation is produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageFormat {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageFormat {
    pub const A4: PageFormat = PageFormat {
        width_mm: 210.0,
        height_mm: 297.0,
    };

    pub fn width_pt(&self) -> f32 {
        self.width_mm * PT_PER_MM
    }

    pub fn height_pt(&self) -> f32 {
        self.height_mm * PT_PER_MM
    }

    /// Page width expressed in CSS pixels (96 per inch).
    pub fn width_css_px(&self) -> f32 {
        self.width_mm * CSS_PX_PER_MM
    }
}

impl Default for PageFormat {
    fn default() -> Self {
        Self::A4
    }
}
