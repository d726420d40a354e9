//! Minimal PDF files written by hand, for server contexts that have no PDF
//! or rasterization library available.
//!
//! [`RawPdfBuilder`] writes numbered objects, the cross-reference table and
//! the trailer, checking every reference before any bytes are produced.
//! [`build_minimal_pdf`] uses it to lay out an invoice and returns base64.

mod builder;
mod content;
mod error;
mod minimal;
mod object;

pub use builder::{RawPdf, RawPdfBuilder};
pub use content::TextStream;
pub use error::RawPdfError;
pub use minimal::{build_minimal_pdf, fallback_invoice_pdf, minimal_invoice_pdf};
pub use object::{ObjRef, PdfDict, PdfValue};
