//! The renderable surface: a laid-out document tree with image loading,
//! readiness checks and capture exclusivity.

pub mod document;
pub mod error;
pub mod html;
pub mod images;
pub mod node;
pub mod readiness;

pub use document::{CaptureGuard, DocumentSnapshot, ImageLoadSummary, RenderableDocument};
pub use error::SurfaceError;
pub use images::{DecodedImage, ImageSlot};
pub use node::{
    Border, BoxStyle, Node, NodeContent, NodeId, NodeKind, NodeSpec, Overflow, Position, TextAlign,
    TextRun,
};
pub use readiness::{check as check_readiness, is_ready, wait_until_ready, NotReady};
