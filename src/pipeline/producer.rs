use super::report::ProductionReport;
use folio_render_core::PdfBytes;

/// Where a document is being requested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerContext {
    /// Admin / order-detail screen with a live surface to capture.
    Interactive,
    /// Order confirmation right after checkout.
    Checkout,
    /// Server side with no rendering library, e.g. while sending email.
    Headless,
}

/// The interchangeable ways of producing an invoice PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Producer {
    /// Capture the invoice surface and embed the bitmap, with retries.
    RasterEmbed,
    /// Draw text and tables directly into the PDF.
    NativeDraw,
    /// Hand-build a minimal PDF without any PDF library.
    RawBytes,
}

impl Producer {
    pub fn for_context(context: ProducerContext) -> Self {
        match context {
            ProducerContext::Interactive => Producer::RasterEmbed,
            ProducerContext::Checkout => Producer::NativeDraw,
            ProducerContext::Headless => Producer::RawBytes,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Producer::RasterEmbed => "raster-embed",
            Producer::NativeDraw => "native-draw",
            Producer::RawBytes => "raw-bytes",
        }
    }
}

/// A PDF together with how it was made.
#[derive(Debug, Clone)]
pub struct ProducedPdf {
    pub producer: Producer,
    pub pdf: PdfBytes,
    /// Attempt ledger; only the raster path retries.
    pub report: Option<ProductionReport>,
}
