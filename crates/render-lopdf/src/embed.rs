//! Image-embed assembly: one captured bitmap on one A4 page.

use crate::canvas::PageCanvas;
use crate::writer::StreamingPdfWriter;
use folio_render_core::{PdfBytes, RenderError};
use folio_types::{PageFormat, PixelBuffer};
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use lopdf::{dictionary, Dictionary, Stream};
use log::debug;
use std::io::Cursor;

const IMAGE_NAME: &str = "Im1";

/// How the bitmap is placed on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFit {
    /// Page width is the constraint; height follows the aspect ratio and may
    /// run past the bottom of the page.
    FitWidth,
    /// The bitmap covers the whole page, ignoring its aspect ratio.
    Stretch,
}

#[derive(Debug, Clone, Copy)]
pub struct ImageEmbedOptions {
    pub page: PageFormat,
    pub fit: ImageFit,
    /// JPEG quality, 1..=100.
    pub quality: u8,
}

impl Default for ImageEmbedOptions {
    fn default() -> Self {
        Self {
            page: PageFormat::A4,
            fit: ImageFit::FitWidth,
            quality: 95,
        }
    }
}

/// Placement of the image on the page in top-left points.
pub fn placement(pixels: &PixelBuffer, options: &ImageEmbedOptions) -> (f32, f32, f32, f32) {
    let page_w = options.page.width_pt();
    let page_h = options.page.height_pt();
    match options.fit {
        ImageFit::FitWidth => {
            let ratio = page_w / pixels.width() as f32;
            (0.0, 0.0, page_w, pixels.height() as f32 * ratio)
        }
        ImageFit::Stretch => (0.0, 0.0, page_w, page_h),
    }
}

/// Flattens RGBA onto white and encodes it as a baseline JPEG.
fn encode_jpeg(pixels: &PixelBuffer, quality: u8) -> Result<Vec<u8>, RenderError> {
    let rgb: Vec<u8> = pixels
        .rgba()
        .chunks_exact(4)
        .flat_map(|px| {
            let a = px[3] as u16;
            let blend = |c: u8| ((c as u16 * a + 255 * (255 - a) + 127) / 255) as u8;
            [blend(px[0]), blend(px[1]), blend(px[2])]
        })
        .collect();
    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .encode(&rgb, pixels.width(), pixels.height(), ExtendedColorType::Rgb8)
        .map_err(|e| RenderError::Image(e.to_string()))?;
    Ok(out.into_inner())
}

/// Embeds `pixels` as a JPEG image XObject on a single page.
pub fn assemble_image(pixels: &PixelBuffer, options: &ImageEmbedOptions) -> Result<PdfBytes, RenderError> {
    let jpeg = encode_jpeg(pixels, options.quality)?;
    let page_w = options.page.width_pt();
    let page_h = options.page.height_pt();

    let mut writer = StreamingPdfWriter::new(Cursor::new(Vec::new()), "1.7", Dictionary::new())?;
    let mut image_stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => pixels.width() as i64,
            "Height" => pixels.height() as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
            "Filter" => "DCTDecode",
        },
        jpeg,
    );
    image_stream.allows_compression = false;
    writer.add_xobject(IMAGE_NAME, image_stream);

    let (x, y, w, h) = placement(pixels, options);
    let mut canvas = PageCanvas::new(page_h);
    canvas.image(IMAGE_NAME, x, y, w, h);
    let content_id = writer.buffer_content_stream(canvas.into_content())?;
    writer.add_page(content_id, page_w, page_h);

    let bytes = writer.finish()?.into_inner();
    debug!(
        "[ASSEMBLE] Embedded {}x{} bitmap as {:.1}x{:.1}pt ({:?}), {} bytes",
        pixels.width(),
        pixels.height(),
        w,
        h,
        options.fit,
        bytes.len()
    );
    Ok(PdfBytes::new(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixels(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::filled(width, height, [240, 240, 240, 255]).unwrap()
    }

    #[test]
    fn fit_width_preserves_aspect_and_allows_overflow() {
        let opts = ImageEmbedOptions::default();
        let (_, _, w, h) = placement(&pixels(1000, 3000), &opts);
        assert!((w - opts.page.width_pt()).abs() < 1e-3);
        assert!((h - w * 3.0).abs() < 1e-2);
        assert!(h > opts.page.height_pt());
    }

    #[test]
    fn stretch_covers_the_page() {
        let opts = ImageEmbedOptions {
            fit: ImageFit::Stretch,
            ..Default::default()
        };
        let (_, _, w, h) = placement(&pixels(10, 10), &opts);
        assert_eq!((w, h), (opts.page.width_pt(), opts.page.height_pt()));
    }

    #[test]
    fn produces_a_parseable_single_page() {
        let pdf = assemble_image(&pixels(40, 60), &ImageEmbedOptions::default()).unwrap();
        assert_eq!(pdf.version(), Some("1.7"));
        assert!(pdf.has_eof_marker());
        let doc = lopdf::Document::load_mem(pdf.as_bytes()).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn same_pixels_give_identical_bytes() {
        let buffer = pixels(32, 32);
        let a = assemble_image(&buffer, &ImageEmbedOptions::default()).unwrap();
        let b = assemble_image(&buffer, &ImageEmbedOptions::default()).unwrap();
        assert_eq!(a, b);
    }
}
