use super::config::ProductionConfig;
use super::orchestrator::RetryOrchestrator;
use super::producer::{ProducedPdf, Producer, ProducerContext};
use super::report::ProductionReport;
use crate::error::PipelineError;
use crate::invoice::invoice_document;
use crate::transport::{self, EmailAttachment};
use folio_raw_pdf::build_minimal_pdf;
use folio_render_core::{PdfBytes, RenderError};
use folio_render_lopdf::assemble_invoice;
use folio_surface::readiness::wait_until_ready_with;
use folio_surface::RenderableDocument;
use folio_traits::DownloadSink;
use folio_types::{InvoiceData, SellerProfile};
use log::info;

/// A configured pipeline. Built by [`PipelineBuilder`](super::PipelineBuilder).
#[derive(Debug, Clone)]
pub struct InvoicePipeline {
    orchestrator: RetryOrchestrator,
    seller: SellerProfile,
}

impl InvoicePipeline {
    pub(crate) fn new(orchestrator: RetryOrchestrator, seller: SellerProfile) -> Self {
        Self { orchestrator, seller }
    }

    pub fn config(&self) -> &ProductionConfig {
        self.orchestrator.config()
    }

    pub fn seller(&self) -> &SellerProfile {
        &self.seller
    }

    pub fn orchestrator(&self) -> &RetryOrchestrator {
        &self.orchestrator
    }

    /// Waits for `document` to become ready (proceeding anyway on timeout),
    /// then runs the retry ladder with the configured attempt count.
    pub async fn produce_document(
        &self,
        document: &RenderableDocument,
        label: &str,
    ) -> (Result<PdfBytes, PipelineError>, ProductionReport) {
        let config = self.config();
        wait_until_ready_with(
            Some(document),
            label,
            config.readiness_timeout(),
            config.readiness_poll(),
        )
        .await;
        self.orchestrator
            .produce_with_report(document, config.max_retries, label)
            .await
    }

    /// Produces the invoice with the producer that fits `context`.
    pub async fn produce_invoice(
        &self,
        context: ProducerContext,
        invoice: &InvoiceData,
    ) -> Result<ProducedPdf, PipelineError> {
        let producer = Producer::for_context(context);
        info!(
            "[INVOICE] Order {}: producing with {}",
            invoice.order_ref,
            producer.name()
        );
        match producer {
            Producer::RasterEmbed => {
                let document = invoice_document(invoice, &self.seller);
                document.set_attached(true)?;
                let (result, report) = self
                    .produce_document(&document, invoice.order_ref.as_str())
                    .await;
                Ok(ProducedPdf {
                    producer,
                    pdf: result?,
                    report: Some(report),
                })
            }
            Producer::NativeDraw => Ok(ProducedPdf {
                producer,
                pdf: assemble_invoice(invoice, &self.seller)?,
                report: None,
            }),
            Producer::RawBytes => {
                let encoded = build_minimal_pdf(invoice, &self.seller)?;
                let pdf = PdfBytes::from_base64(&encoded)
                    .map_err(|e| RenderError::InvalidInput(e.to_string()))?;
                Ok(ProducedPdf {
                    producer,
                    pdf,
                    report: None,
                })
            }
        }
    }

    /// Checkout confirmation: draws the invoice and immediately hands it to
    /// the user as `<orderRef>.pdf`.
    pub fn checkout_download(&self, invoice: &InvoiceData, sink: &dyn DownloadSink) -> Result<String, PipelineError> {
        let pdf = assemble_invoice(invoice, &self.seller)?;
        transport::download(sink, &pdf, &invoice.order_ref.pdf_filename())
    }

    pub fn email_attachment(&self, invoice: &InvoiceData) -> Result<EmailAttachment, PipelineError> {
        EmailAttachment::for_invoice(invoice, &self.seller)
    }
}
