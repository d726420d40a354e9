//! Core rendering types shared by the PDF producers.
//!
//! - `PdfBytes`, the finished file with its base64 transport form
//! - `RenderError` for assembly failures
//! - Unit, encoding and font metric helpers

mod bytes;
mod error;
pub mod metrics;
pub mod utils;

pub use bytes::PdfBytes;
pub use error::RenderError;
pub use metrics::{text_width, truncate_to_width, wrap_text};
