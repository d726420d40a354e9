//! Getting finished documents to where they are needed: base64 text, a
//! user download, an HTML escape hatch, blob storage and email attachments.

use crate::error::PipelineError;
use folio_raw_pdf::build_minimal_pdf;
use folio_render_core::PdfBytes;
use folio_surface::RenderableDocument;
use folio_traits::{BlobStore, DownloadSink};
use folio_types::{InvoiceData, OrderRef, SellerProfile};
use log::info;
use serde::Serialize;

pub const PDF_MIME: &str = "application/pdf";
pub const HTML_MIME: &str = "text/html";

pub fn to_base64(pdf: &PdfBytes) -> String {
    pdf.to_base64()
}

/// Hands `pdf` to the user as `filename`.
pub fn download(sink: &dyn DownloadSink, pdf: &PdfBytes, filename: &str) -> Result<String, PipelineError> {
    let location = sink.deliver(filename, PDF_MIME, pdf.as_bytes())?;
    info!("[TRANSPORT] Delivered {} ({} bytes) to {}", filename, pdf.len(), location);
    Ok(location)
}

/// Saves the document's markup and a minimal style sheet as a standalone
/// HTML file, for when no PDF can or should be produced. Any extension on
/// `filename` is replaced with `.html`.
pub fn download_as_html_fallback(
    sink: &dyn DownloadSink,
    document: &RenderableDocument,
    filename: &str,
) -> Result<String, PipelineError> {
    let stem = filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(filename);
    let html_name = format!("{}.html", stem);
    let html = document.to_html(stem);
    let location = sink.deliver(&html_name, HTML_MIME, html.as_bytes())?;
    info!("[TRANSPORT] Delivered HTML fallback {} to {}", html_name, location);
    Ok(location)
}

/// Upserts the invoice under `invoice_<orderRef>.pdf` and returns the key.
pub fn store_invoice(store: &dyn BlobStore, order_ref: &OrderRef, pdf: &PdfBytes) -> Result<String, PipelineError> {
    let key = order_ref.storage_key();
    store.upsert(&key, PDF_MIME, pdf.as_bytes())?;
    info!("[TRANSPORT] Stored {} bytes as '{}' in {}", pdf.len(), key, store.name());
    Ok(key)
}

/// A PDF attachment in the shape email-sending services expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub content_base64: String,
}

impl EmailAttachment {
    pub fn pdf(order_ref: &OrderRef, content_base64: String) -> Self {
        Self {
            filename: order_ref.storage_key(),
            content_type: PDF_MIME.to_string(),
            content_base64,
        }
    }

    /// Builds the attachment with the minimal PDF builder, which needs no
    /// rendering library.
    pub fn for_invoice(invoice: &InvoiceData, seller: &SellerProfile) -> Result<Self, PipelineError> {
        let encoded = build_minimal_pdf(invoice, seller)?;
        Ok(Self::pdf(&invoice.order_ref, encoded))
    }
}
