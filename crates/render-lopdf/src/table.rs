//! Table drawing with a filled header row that repeats after page breaks.

use crate::flow::PageFlow;
use folio_render_core::metrics::truncate_to_width;
use folio_types::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellAlign {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct Column {
    pub title: &'static str,
    pub width: f32,
    pub align: CellAlign,
}

impl Column {
    pub fn left(title: &'static str, width: f32) -> Self {
        Self {
            title,
            width,
            align: CellAlign::Left,
        }
    }

    pub fn right(title: &'static str, width: f32) -> Self {
        Self {
            title,
            width,
            align: CellAlign::Right,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableStyle {
    pub header_fill: Color,
    pub header_text: Color,
    pub body_text: Color,
    pub stripe: Option<Color>,
    pub rule: Color,
    pub font_size: f32,
    pub header_height: f32,
    pub row_height: f32,
    pub padding: f32,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header_fill: Color::rgb(0x1a, 0x1a, 0x1a),
            header_text: Color::WHITE,
            body_text: Color::rgb(0x22, 0x22, 0x22),
            stripe: Some(Color::gray(0xf5)),
            rule: Color::gray(0xdd),
            font_size: 9.0,
            header_height: 20.0,
            row_height: 18.0,
            padding: 5.0,
        }
    }
}

fn draw_cells(flow: &mut PageFlow, columns: &[Column], cells: &[String], style: &TableStyle, bold: bool, color: Color, height: f32) {
    let text_y = flow.y() + (height - style.font_size) / 2.0;
    let mut x = flow.left();
    for (column, cell) in columns.iter().zip(cells) {
        let text = truncate_to_width(cell, style.font_size, bold, column.width - 2.0 * style.padding);
        match column.align {
            CellAlign::Left => flow
                .canvas()
                .text(x + style.padding, text_y, &text, style.font_size, bold, color),
            CellAlign::Right => flow.canvas().text_right(
                x + column.width - style.padding,
                text_y,
                &text,
                style.font_size,
                bold,
                color,
            ),
        }
        x += column.width;
    }
}

fn draw_header(flow: &mut PageFlow, columns: &[Column], style: &TableStyle) {
    let width: f32 = columns.iter().map(|c| c.width).sum();
    let (x, y) = (flow.left(), flow.y());
    flow.canvas()
        .fill_rect(x, y, width, style.header_height, style.header_fill);
    let titles: Vec<String> = columns.iter().map(|c| c.title.to_string()).collect();
    draw_cells(flow, columns, &titles, style, true, style.header_text, style.header_height);
    flow.advance(style.header_height);
}

/// Draws the header and every row at the flow cursor. Returns the number of
/// page breaks the table caused.
pub fn draw_table(flow: &mut PageFlow, columns: &[Column], rows: &[Vec<String>], style: &TableStyle) -> usize {
    let width: f32 = columns.iter().map(|c| c.width).sum();
    let mut breaks = 0;

    if flow.ensure_space(style.header_height + style.row_height) {
        breaks += 1;
    }
    draw_header(flow, columns, style);

    for (index, row) in rows.iter().enumerate() {
        if flow.ensure_space(style.row_height) {
            breaks += 1;
            draw_header(flow, columns, style);
        }
        let (x, y) = (flow.left(), flow.y());
        if let Some(stripe) = style.stripe.filter(|_| index % 2 == 1) {
            flow.canvas().fill_rect(x, y, width, style.row_height, stripe);
        }
        draw_cells(flow, columns, row, style, false, style.body_text, style.row_height);
        flow.canvas()
            .hline(x, x + width, y + style.row_height - 0.5, 0.5, style.rule);
        flow.advance(style.row_height);
    }
    breaks
}
