//! Invoice PDF generation for an online store.
//!
//! Three producers share one order record:
//!
//! - raster embed: capture the on-screen invoice surface and place the bitmap
//!   on A4 pages, retrying with a simplified capture when the primary fails
//! - native draw: lay out text and tables directly with lopdf
//! - raw bytes: hand-assemble a minimal PDF with no rendering library at all
//!
//! The finished document can then be downloaded, stored, or attached to an
//! email via [`transport`].

pub mod error;
pub mod invoice;
pub mod pipeline;
pub mod transport;

pub use error::{PipelineError, USER_FACING_FAILURE};
pub use invoice::invoice_document;
pub use pipeline::{
    AttemptOutcome, AttemptRecord, InvoicePipeline, PipelineBuilder, ProducedPdf, Producer,
    ProducerContext, ProductionConfig, ProductionReport, RetryOrchestrator, Strategy,
    CAPTURE_TARGET,
};
pub use transport::{EmailAttachment, HTML_MIME, PDF_MIME};

pub use folio_raster as raster;
pub use folio_raw_pdf as raw_pdf;
pub use folio_render_core as render_core;
pub use folio_render_lopdf as render_lopdf;
pub use folio_resource as resource;
pub use folio_surface as surface;
pub use folio_traits as traits;
pub use folio_types as types;

pub use folio_render_core::PdfBytes;
pub use folio_types::{BankDetails, InvoiceData, OrderRef, SellerProfile};
