use folio_raster::RasterError;
use folio_raw_pdf::RawPdfError;
use folio_render_core::RenderError;
use folio_surface::SurfaceError;
use folio_traits::{ResourceError, StoreError};
use thiserror::Error;

/// Text shown to end users for any failure. Details stay in the logs.
pub const USER_FACING_FAILURE: &str = "We could not generate the document. Please try again.";

/// A comprehensive error type for the invoice production pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("Capture failed: {0}")]
    Raster(#[from] RasterError),

    #[error("Assembly failed: {0}")]
    Render(#[from] RenderError),

    #[error("Minimal PDF failed: {0}")]
    RawPdf(#[from] RawPdfError),

    #[error("Storage failed: {0}")]
    Store(#[from] StoreError),

    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Every attempt of every strategy failed.
    #[error("All {attempts} attempt(s) failed; last error: {last_error}")]
    Terminal { attempts: u32, last_error: String },
}

impl PipelineError {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineError::Terminal { .. })
    }

    /// Message safe to show to the person who asked for the document.
    pub fn user_message(&self) -> &'static str {
        USER_FACING_FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_hides_details() {
        let err = PipelineError::Terminal {
            attempts: 3,
            last_error: "backend exploded at 0x1234".to_string(),
        };
        assert!(err.is_terminal());
        assert!(err.to_string().contains("backend exploded"));
        assert!(!err.user_message().contains("backend"));
        assert!(err.user_message().contains("could not generate the document"));
    }
}
