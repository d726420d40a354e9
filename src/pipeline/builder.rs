use super::api::InvoicePipeline;
use super::config::{load_seller, ProductionConfig, SellerProfile};
use super::orchestrator::RetryOrchestrator;
use crate::error::PipelineError;
use folio_raster::{CaptureBackend, FontLibrary, Rasterizer, SkiaCapture};
use folio_traits::ResourceProvider;
use std::path::Path;
use std::sync::Arc;

/// A builder for creating an `InvoicePipeline`.
pub struct PipelineBuilder {
    config: ProductionConfig,
    seller: SellerProfile,
    resources: Option<Arc<dyn ResourceProvider>>,
    backend: Option<Arc<dyn CaptureBackend>>,
    fonts: FontLibrary,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            config: ProductionConfig::default(),
            seller: SellerProfile::default(),
            resources: None,
            backend: None,
            fonts: FontLibrary::new(),
        }
    }
}

impl PipelineBuilder {
    /// Creates a new `PipelineBuilder` with default settings and no fonts loaded.
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_config(mut self, config: ProductionConfig) -> Self {
        self.config = config;
        self
    }

    /// Loads the production config from a JSON file.
    pub fn with_config_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, PipelineError> {
        self.config = ProductionConfig::from_file(path)?;
        Ok(self)
    }

    pub fn with_seller(mut self, seller: SellerProfile) -> Self {
        self.seller = seller;
        self
    }

    pub fn with_seller_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, PipelineError> {
        self.seller = load_seller(path)?;
        Ok(self)
    }

    /// Where image sources of captured documents are loaded from.
    pub fn with_resources(mut self, provider: Arc<dyn ResourceProvider>) -> Self {
        self.resources = Some(provider);
        self
    }

    /// Replaces the tiny-skia capture backend.
    pub fn with_capture_backend(mut self, backend: Arc<dyn CaptureBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Scans the host system for installed fonts used by the capture backend.
    pub fn with_system_fonts(mut self, system_fonts: bool) -> Self {
        if system_fonts {
            self.fonts = self.fonts.with_system_fonts();
        }
        self
    }

    /// Adds every font file found in `path`.
    pub fn with_font_dir<P: AsRef<Path>>(self, path: P) -> Self {
        self.fonts.add_font_dir(path);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Consumes the builder and creates the `InvoicePipeline`.
    pub fn build(self) -> Result<InvoicePipeline, PipelineError> {
        self.config.validate()?;
        let backend: Arc<dyn CaptureBackend> = match self.backend {
            Some(backend) => backend,
            None => Arc::new(SkiaCapture::with_fonts(self.fonts)),
        };
        let mut rasterizer = Rasterizer::new(backend).with_settle_delay(self.config.settle_delay());
        if let Some(provider) = self.resources {
            rasterizer = rasterizer.with_resources(provider);
        }
        log::info!(
            "Pipeline ready: {} capture backend, up to {} attempt(s).",
            rasterizer.backend_name(),
            self.config.max_retries.max(1)
        );
        Ok(InvoicePipeline::new(
            RetryOrchestrator::new(rasterizer, self.config),
            self.seller,
        ))
    }
}
