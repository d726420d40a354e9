//! PDF assembly built on lopdf.
//!
//! Two independent assemblers share one streaming writer:
//! - [`assemble_image`] places a captured bitmap on an A4 page
//! - [`assemble_invoice`] draws the invoice as text and tables

mod canvas;
mod embed;
mod flow;
mod invoice;
mod table;
mod writer;

pub use canvas::PageCanvas;
pub use embed::{assemble_image, placement, ImageEmbedOptions, ImageFit};
pub use flow::PageFlow;
pub use invoice::assemble_invoice;
pub use table::{draw_table, CellAlign, Column, TableStyle};
pub use writer::StreamingPdfWriter;
