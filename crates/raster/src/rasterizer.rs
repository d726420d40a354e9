use crate::backend::{CaptureBackend, CaptureOptions};
use crate::error::RasterError;
use crate::repair::repair_snapshot;
use crate::skia::SkiaCapture;
use folio_surface::RenderableDocument;
use folio_traits::ResourceProvider;
use folio_types::{PageFormat, PixelBuffer};
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;

/// Default pause before capture, letting fonts and layout settle.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// Captures a live document: waits for it to settle, loads any images still
/// pending, reflows, then captures a restyled copy under exclusive access.
#[derive(Clone)]
pub struct Rasterizer {
    backend: Arc<dyn CaptureBackend>,
    resources: Option<Arc<dyn ResourceProvider>>,
    settle_delay: Duration,
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("backend", &self.backend.name())
            .field("resources", &self.resources.as_ref().map(|r| r.name()))
            .field("settle_delay", &self.settle_delay)
            .finish()
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new(Arc::new(SkiaCapture::new()))
    }
}

impl Rasterizer {
    pub fn new(backend: Arc<dyn CaptureBackend>) -> Self {
        Self {
            backend,
            resources: None,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    pub fn with_resources(mut self, provider: Arc<dyn ResourceProvider>) -> Self {
        self.resources = Some(provider);
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub async fn rasterize(
        &self,
        document: &RenderableDocument,
        options: &CaptureOptions,
    ) -> Result<PixelBuffer, RasterError> {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        if let Some(provider) = &self.resources {
            if document.pending_images() > 0 {
                document
                    .load_images(Arc::clone(provider), options.image_timeout)
                    .await;
            }
        }

        let measured = document.reflow();
        let guard = document.begin_capture()?;
        let mut snapshot = guard.snapshot();
        if options.repair {
            repair_snapshot(&mut snapshot, options.target, PageFormat::A4.width_css_px());
        }

        let result = self.backend.capture(&snapshot, options);
        drop(guard);

        match &result {
            Ok(buffer) => info!(
                "[RASTER] Captured {}x{}px surface into {}x{} pixels at {}x with {}",
                measured.width,
                measured.height,
                buffer.width(),
                buffer.height(),
                options.scale,
                self.backend.name()
            ),
            Err(e) => error!(
                "[RASTER] Capture of {}x{}px surface failed with {}: {}",
                measured.width,
                measured.height,
                self.backend.name(),
                e
            ),
        }
        debug!("[RASTER] Capture guard released");
        result
    }
}
