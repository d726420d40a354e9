use crate::error::RasterError;
use folio_surface::{DocumentSnapshot, NodeId};
use folio_types::{Color, PixelBuffer};
use std::time::Duration;

/// Largest side, in device pixels, a capture may produce.
pub const MAX_CAPTURE_DIMENSION: u32 = 16_384;

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOptions {
    /// Device pixels per CSS pixel.
    pub scale: f32,
    pub background: Color,
    /// Draw images whose source is a remote origin.
    pub allow_cross_origin: bool,
    /// Deadline for each image still loading when capture starts.
    pub image_timeout: Duration,
    /// Restyle the captured copy before drawing it.
    pub repair: bool,
    /// Node to restyle when `repair` is set.
    pub target: Option<NodeId>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: Color::WHITE,
            allow_cross_origin: true,
            image_timeout: Duration::from_millis(15_000),
            repair: true,
            target: None,
        }
    }
}

impl CaptureOptions {
    /// Conservative settings: unit scale and no restyling of the copy.
    pub fn simplified() -> Self {
        Self {
            scale: 1.0,
            repair: false,
            ..Self::default()
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_target(mut self, target: NodeId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_image_timeout(mut self, timeout: Duration) -> Self {
        self.image_timeout = timeout;
        self
    }
}

/// Turns a document snapshot into pixels.
pub trait CaptureBackend: Send + Sync {
    fn capture(
        &self,
        snapshot: &DocumentSnapshot,
        options: &CaptureOptions,
    ) -> Result<PixelBuffer, RasterError>;

    fn name(&self) -> &'static str;
}

/// Device pixel dimensions of a capture, or an error when the surface has
/// no area or exceeds [`MAX_CAPTURE_DIMENSION`].
pub fn device_size(snapshot: &DocumentSnapshot, scale: f32) -> Result<(u32, u32), RasterError> {
    let size = snapshot.size;
    if size.is_degenerate() || !(scale > 0.0) {
        return Err(RasterError::EmptySurface {
            width: size.width,
            height: size.height,
        });
    }
    let width = (size.width * scale).ceil();
    let height = (size.height * scale).ceil();
    let max = MAX_CAPTURE_DIMENSION as f32;
    if width > max || height > max {
        return Err(RasterError::Capture(format!(
            "{}x{} device pixels exceeds the {}px limit",
            width, height, MAX_CAPTURE_DIMENSION
        )));
    }
    Ok((width as u32, height as u32))
}
