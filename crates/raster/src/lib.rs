//! Rasterization of renderable surfaces into pixel buffers.
//!
//! - [`Rasterizer`] drives a capture: settle delay, image loading, reflow,
//!   exclusive access and restyling of the captured copy.
//! - [`CaptureBackend`] is the drawing seam; [`SkiaCapture`] implements it
//!   with `tiny-skia`.

mod backend;
mod error;
pub mod fonts;
mod rasterizer;
pub mod repair;
mod skia;

pub use backend::{device_size, CaptureBackend, CaptureOptions, MAX_CAPTURE_DIMENSION};
pub use error::RasterError;
pub use fonts::FontLibrary;
pub use rasterizer::{Rasterizer, DEFAULT_SETTLE_DELAY};
pub use repair::{repair_snapshot, RepairTarget};
pub use skia::SkiaCapture;
