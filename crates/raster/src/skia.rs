//! `tiny-skia` capture backend.

use crate::backend::{device_size, CaptureBackend, CaptureOptions};
use crate::error::RasterError;
use crate::fonts::FontLibrary;
use folio_surface::{DecodedImage, DocumentSnapshot, Node, NodeKind, Overflow, TextAlign, TextRun};
use folio_traits::ImageSource;
use folio_types::{Color, PixelBuffer, Rect};
use log::warn;
use tiny_skia::{
    FillRule, FilterQuality, Mask, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};
use ttf_parser::{GlyphId, OutlineBuilder};

/// Draws snapshots with `tiny-skia`. Text uses outlines from the font
/// library and is skipped when no face resolves.
#[derive(Debug, Clone, Default)]
pub struct SkiaCapture {
    fonts: FontLibrary,
}

impl SkiaCapture {
    /// A backend that discovers system fonts.
    pub fn new() -> Self {
        Self {
            fonts: FontLibrary::new().with_system_fonts(),
        }
    }

    pub fn with_fonts(fonts: FontLibrary) -> Self {
        Self { fonts }
    }
}

/// Device-space clip rectangle with the mask rasterized from it.
struct Clip {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    mask: Mask,
}

struct DrawContext<'a> {
    pixmap: Pixmap,
    snapshot: &'a DocumentSnapshot,
    options: &'a CaptureOptions,
    fonts: &'a FontLibrary,
    transform: Transform,
    warned_fonts: bool,
    masks_built: usize,
}

impl CaptureBackend for SkiaCapture {
    fn capture(
        &self,
        snapshot: &DocumentSnapshot,
        options: &CaptureOptions,
    ) -> Result<PixelBuffer, RasterError> {
        let (width, height) = device_size(snapshot, options.scale)?;
        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| RasterError::Capture(format!("cannot allocate {}x{} canvas", width, height)))?;
        pixmap.fill(to_sk_color(options.background));

        let mut ctx = DrawContext {
            pixmap,
            snapshot,
            options,
            fonts: &self.fonts,
            transform: Transform::from_scale(options.scale, options.scale),
            warned_fonts: false,
            masks_built: 0,
        };
        ctx.draw_node(&snapshot.root, 0.0, 0.0, None);

        let rgba: Vec<u8> = ctx
            .pixmap
            .pixels()
            .iter()
            .flat_map(|px| {
                let c = px.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        PixelBuffer::new(width, height, rgba)
            .ok_or_else(|| RasterError::Capture("canvas size mismatch".to_string()))
    }

    fn name(&self) -> &'static str {
        "tiny-skia"
    }
}

impl DrawContext<'_> {
    fn draw_node(&mut self, node: &Node, origin_x: f32, origin_y: f32, clip: Option<&Clip>) {
        let placed = node.placed_frame();
        let frame = Rect::new(origin_x + placed.x, origin_y + placed.y, placed.width, placed.height);
        let mask = clip.map(|c| &c.mask);
        let snapshot = self.snapshot;

        if let Some(bg) = node.style.background {
            self.fill_rect(frame, bg, mask);
        }

        match &node.kind {
            NodeKind::Block => {}
            NodeKind::Text(run) => self.draw_text(run, frame, mask),
            NodeKind::Image { source, slot } => {
                let remote = matches!(ImageSource::parse(source.as_str()), Ok(ImageSource::Remote(_)));
                if remote && !self.options.allow_cross_origin {
                    warn!("[RASTER] Skipping cross-origin image '{}'", source);
                } else if let Some(image) = snapshot.image(*slot) {
                    self.draw_image(image, frame, mask);
                }
            }
            NodeKind::Rule { color, thickness } => {
                let rule = Rect::new(frame.x, frame.y, frame.width, thickness.max(0.0));
                self.fill_rect(rule, *color, mask);
            }
        }

        if let Some(border) = node.style.border {
            self.stroke_rect(frame, border.color, border.width, mask);
        }

        if node.children.is_empty() {
            return;
        }
        let own_clip = if node.style.overflow == Overflow::Hidden {
            self.clip_to(frame, clip)
        } else {
            None
        };
        let child_clip = own_clip.as_ref().or(clip);
        for child in &node.children {
            self.draw_node(child, frame.x, frame.y, child_clip);
        }
    }

    /// Builds the mask for `frame` intersected with the enclosing clip.
    fn clip_to(&mut self, frame: Rect, outer: Option<&Clip>) -> Option<Clip> {
        let s = self.options.scale;
        let (mut x0, mut y0, mut x1, mut y1) =
            (frame.x * s, frame.y * s, frame.right() * s, frame.bottom() * s);
        if let Some(outer) = outer {
            x0 = x0.max(outer.x0);
            y0 = y0.max(outer.y0);
            x1 = x1.min(outer.x1);
            y1 = y1.min(outer.y1);
        }

        let mut mask = Mask::new(self.pixmap.width(), self.pixmap.height())?;
        if let Some(rect) = tiny_skia::Rect::from_ltrb(x0, y0, x1.max(x0 + 0.01), y1.max(y0 + 0.01)) {
            let path = PathBuilder::from_rect(rect);
            mask.fill_path(&path, FillRule::Winding, false, Transform::identity());
        }
        self.masks_built += 1;
        Some(Clip { x0, y0, x1, y1, mask })
    }

    fn fill_rect(&mut self, rect: Rect, color: Color, mask: Option<&Mask>) {
        if let Some(r) = tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height) {
            self.pixmap.fill_rect(r, &fill_paint(color), self.transform, mask);
        }
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32, mask: Option<&Mask>) {
        let Some(r) = tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height) else {
            return;
        };
        let path = PathBuilder::from_rect(r);
        let stroke = Stroke {
            width: width.max(0.0),
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &fill_paint(color), &stroke, self.transform, mask);
    }

    fn draw_image(&mut self, image: &DecodedImage, frame: Rect, mask: Option<&Mask>) {
        let Some(source) = image_to_pixmap(image) else {
            return;
        };
        let sx = frame.width / image.width as f32;
        let sy = frame.height / image.height as f32;
        let local = Transform::from_row(sx, 0.0, 0.0, sy, frame.x, frame.y);
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            source.as_ref(),
            &paint,
            self.transform.pre_concat(local),
            mask,
        );
    }

    fn draw_text(&mut self, run: &TextRun, frame: Rect, mask: Option<&Mask>) {
        if run.content.trim().is_empty() || run.font_size <= 0.0 {
            return;
        }
        let Some(font) = self.fonts.resolve(run.bold) else {
            if !self.warned_fonts {
                warn!("[RASTER] No font face available, text will not be drawn");
                self.warned_fonts = true;
            }
            return;
        };
        let Some(face) = font.face() else {
            warn!("[RASTER] Font face failed to parse, skipping text");
            return;
        };

        let units_per_em = face.units_per_em().max(1) as f32;
        let scale = run.font_size / units_per_em;
        let advance = |gid: GlyphId| -> f32 {
            let adv = face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale;
            if adv > 0.0 { adv } else { run.font_size * 0.5 }
        };

        let glyphs: Vec<(Option<GlyphId>, f32)> = run
            .content
            .chars()
            .map(|ch| match face.glyph_index(ch) {
                Some(gid) if gid.0 != 0 => (Some(gid), advance(gid)),
                _ => (None, run.font_size * 0.5),
            })
            .collect();
        let line_width: f32 = glyphs.iter().map(|(_, adv)| adv).sum();

        let mut pen_x = match run.align {
            TextAlign::Left => frame.x,
            TextAlign::Center => frame.x + (frame.width - line_width) / 2.0,
            TextAlign::Right => frame.right() - line_width,
        };
        let ascent = face.ascender() as f32 * scale;
        let baseline = frame.y + ascent;
        let paint = fill_paint(run.color);

        for (gid, adv) in glyphs {
            if let Some(gid) = gid {
                let mut builder = GlyphPathBuilder::new(pen_x, baseline, scale);
                if face.outline_glyph(gid, &mut builder).is_some() {
                    if let Some(path) = builder.finish() {
                        self.pixmap
                            .fill_path(&path, &paint, FillRule::Winding, self.transform, mask);
                    }
                }
            }
            pen_x += adv;
        }
    }
}

/// Builds glyph paths in surface space. Outlines are y-up, the surface is
/// y-down, so the vertical axis is flipped around the baseline.
struct GlyphPathBuilder {
    builder: PathBuilder,
    origin_x: f32,
    baseline: f32,
    scale: f32,
}

impl GlyphPathBuilder {
    fn new(origin_x: f32, baseline: f32, scale: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            origin_x,
            baseline,
            scale,
        }
    }

    fn x(&self, x: f32) -> f32 {
        self.origin_x + x * self.scale
    }

    fn y(&self, y: f32) -> f32 {
        self.baseline - y * self.scale
    }

    fn finish(self) -> Option<Path> {
        self.builder.finish()
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.x(x), self.y(y));
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.x(x), self.y(y));
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1, x, y) = (self.x(x1), self.y(y1), self.x(x), self.y(y));
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = (self.x(x1), self.y(y1));
        let (x2, y2) = (self.x(x2), self.y(y2));
        let (x, y) = (self.x(x), self.y(y));
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

fn fill_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_sk_color(color));
    paint.anti_alias = true;
    paint
}

fn to_sk_color(color: Color) -> tiny_skia::Color {
    let alpha = (color.a.clamp(0.0, 1.0) * 255.0).round() as u8;
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, alpha)
}

fn image_to_pixmap(image: &DecodedImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width, image.height)?;
    for (src, dst) in image.rgba.chunks_exact(4).zip(pixmap.data_mut().chunks_exact_mut(4)) {
        let a = src[3];
        dst[0] = premul_u8(src[0], a);
        dst[1] = premul_u8(src[1], a);
        dst[2] = premul_u8(src[2], a);
        dst[3] = a;
    }
    Some(pixmap)
}

fn premul_u8(channel: u8, alpha: u8) -> u8 {
    let prod = (channel as u16) * (alpha as u16) + 127;
    ((prod + (prod >> 8)) >> 8) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_surface::{NodeSpec, RenderableDocument};

    fn capture(spec: NodeSpec, options: &CaptureOptions) -> PixelBuffer {
        let doc = RenderableDocument::from_spec(spec);
        SkiaCapture::with_fonts(FontLibrary::new())
            .capture(&doc.snapshot(), options)
            .unwrap()
    }

    #[test]
    fn scales_to_device_pixels() {
        let buf = capture(
            NodeSpec::block(Rect::new(0.0, 0.0, 100.0, 50.0)),
            &CaptureOptions::default(),
        );
        assert_eq!((buf.width(), buf.height()), (200, 100));
        assert_eq!(buf.pixel(0, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn paints_backgrounds_and_rules() {
        let spec = NodeSpec::block(Rect::new(0.0, 0.0, 40.0, 40.0))
            .with_child(NodeSpec::block(Rect::new(0.0, 0.0, 20.0, 20.0)).with_background(Color::rgb(26, 26, 26)))
            .with_child(NodeSpec::rule(Rect::new(0.0, 30.0, 40.0, 1.0), Color::rgb(255, 0, 0), 4.0));
        let buf = capture(spec, &CaptureOptions::simplified());
        assert_eq!(buf.pixel(5, 5), Some([26, 26, 26, 255]));
        assert_eq!(buf.pixel(30, 5), Some([255, 255, 255, 255]));
        assert_eq!(buf.pixel(10, 31), Some([255, 0, 0, 255]));
    }

    #[test]
    fn hidden_overflow_clips_children() {
        let mut clipper = NodeSpec::block(Rect::new(0.0, 0.0, 10.0, 10.0));
        clipper.style.overflow = Overflow::Hidden;
        let spec = NodeSpec::block(Rect::new(0.0, 0.0, 40.0, 40.0)).with_child(
            clipper.with_child(
                NodeSpec::block(Rect::new(0.0, 0.0, 30.0, 30.0)).with_background(Color::BLACK),
            ),
        );
        let buf = capture(spec, &CaptureOptions::simplified());
        assert_eq!(buf.pixel(5, 5), Some([0, 0, 0, 255]));
        assert_eq!(buf.pixel(20, 20), Some([255, 255, 255, 255]));
    }

    #[test]
    fn clip_mask_is_built_once_per_hidden_container() {
        let mut clipper = NodeSpec::block(Rect::new(0.0, 0.0, 20.0, 20.0));
        clipper.style.overflow = Overflow::Hidden;
        let mut inner = NodeSpec::block(Rect::new(0.0, 0.0, 10.0, 10.0));
        inner.style.overflow = Overflow::Hidden;
        for i in 0..12 {
            clipper = clipper.with_child(
                NodeSpec::block(Rect::new(0.0, i as f32, 30.0, 1.0)).with_background(Color::BLACK),
            );
        }
        let spec = NodeSpec::block(Rect::new(0.0, 0.0, 40.0, 40.0))
            .with_child(clipper.with_child(inner.with_child(NodeSpec::block(Rect::new(0.0, 0.0, 5.0, 5.0)))));
        let doc = RenderableDocument::from_spec(spec);
        let snapshot = doc.snapshot();
        let options = CaptureOptions::simplified();
        let fonts = FontLibrary::new();

        let mut ctx = DrawContext {
            pixmap: Pixmap::new(40, 40).unwrap(),
            snapshot: &snapshot,
            options: &options,
            fonts: &fonts,
            transform: Transform::identity(),
            warned_fonts: false,
            masks_built: 0,
        };
        ctx.draw_node(&snapshot.root, 0.0, 0.0, None);

        assert_eq!(ctx.masks_built, 2);
        let black = tiny_skia::PremultipliedColorU8::from_rgba(0, 0, 0, 255).unwrap();
        assert_eq!(ctx.pixmap.pixel(15, 5), Some(black));
        assert_ne!(ctx.pixmap.pixel(25, 5), Some(black));
    }

    #[test]
    fn empty_surface_is_a_capture_error() {
        let doc = RenderableDocument::from_spec(NodeSpec::block(Rect::new(0.0, 0.0, 0.0, 10.0)));
        let err = SkiaCapture::with_fonts(FontLibrary::new())
            .capture(&doc.snapshot(), &CaptureOptions::default())
            .unwrap_err();
        assert!(matches!(err, RasterError::EmptySurface { .. }));
    }

    #[test]
    fn text_without_fonts_is_skipped() {
        let spec = NodeSpec::block(Rect::new(0.0, 0.0, 100.0, 20.0)).with_child(NodeSpec::text(
            Rect::new(0.0, 0.0, 100.0, 20.0),
            TextRun::new("INVOICE", 16.0),
        ));
        let buf = capture(spec, &CaptureOptions::simplified());
        assert!(buf.rgba().iter().all(|&b| b == 255));
    }
}
