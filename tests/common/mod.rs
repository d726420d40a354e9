#![allow(dead_code)]

pub mod fixtures;
pub mod pdf_assertions;

use folio::{InvoicePipeline, PdfBytes, PipelineBuilder, ProductionConfig};
use lopdf::Document as LopdfDocument;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn from_pdf(pdf: &PdfBytes) -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_bytes(pdf.as_bytes().to_vec())
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Save PDF to a file for manual debugging
    pub fn save_for_debug(&self, name: &str) -> std::io::Result<()> {
        std::fs::write(format!("test_output_{}.pdf", name), &self.bytes)
    }
}

/// Production settings with no settle delay, for tests that run in real time.
pub fn fast_config() -> ProductionConfig {
    ProductionConfig {
        settle_delay_ms: 0,
        base_backoff_ms: 10,
        readiness_timeout_ms: 200,
        readiness_poll_ms: 20,
        ..Default::default()
    }
}

/// A pipeline with the default seller, tiny-skia capture and no fonts.
pub fn test_pipeline() -> InvoicePipeline {
    PipelineBuilder::new()
        .with_config(fast_config())
        .build()
        .expect("default pipeline builds")
}
