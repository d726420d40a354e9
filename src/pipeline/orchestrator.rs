use super::config::ProductionConfig;
use super::report::{AttemptOutcome, ProductionReport, Strategy};
use crate::error::PipelineError;
use folio_raster::Rasterizer;
use folio_render_core::PdfBytes;
use folio_render_lopdf::{assemble_image, ImageFit};
use folio_surface::RenderableDocument;
use log::{error, info, warn};

/// Name of the node the primary strategy restyles when it is present.
pub const CAPTURE_TARGET: &str = "invoice";

/// Runs rasterize-then-embed attempts strictly one after another, moving
/// from the primary strategy to the simplified one on failure.
#[derive(Debug, Clone)]
pub struct RetryOrchestrator {
    rasterizer: Rasterizer,
    config: ProductionConfig,
}

impl RetryOrchestrator {
    pub fn new(rasterizer: Rasterizer, config: ProductionConfig) -> Self {
        Self { rasterizer, config }
    }

    pub fn config(&self) -> &ProductionConfig {
        &self.config
    }

    /// Produces a PDF of `document` in at most `max_retries` attempts (zero
    /// counts as one).
    pub async fn produce(
        &self,
        document: &RenderableDocument,
        max_retries: u32,
    ) -> Result<PdfBytes, PipelineError> {
        self.produce_with_report(document, max_retries, "document").await.0
    }

    /// As [`produce`](Self::produce), also returning the attempt ledger.
    /// `label` identifies the document in logs, usually the order reference.
    pub async fn produce_with_report(
        &self,
        document: &RenderableDocument,
        max_retries: u32,
        label: &str,
    ) -> (Result<PdfBytes, PipelineError>, ProductionReport) {
        let attempts = max_retries.max(1);
        let mut report = ProductionReport::new(label);

        for attempt in 1..=attempts {
            let strategy = Strategy::for_attempt(attempt);
            let backoff = self.config.backoff_before(attempt);
            if !backoff.is_zero() {
                info!(
                    "[ORCHESTRATOR] {}: waiting {}ms before attempt {}",
                    label,
                    backoff.as_millis(),
                    attempt
                );
                tokio::time::sleep(backoff).await;
            }

            info!(
                "[ORCHESTRATOR] {}: attempt {}/{} using the {} strategy",
                label,
                attempt,
                attempts,
                strategy.name()
            );
            match self.attempt(document, strategy).await {
                Ok(pdf) => {
                    info!(
                        "[ORCHESTRATOR] {}: attempt {} succeeded, {} bytes",
                        label,
                        attempt,
                        pdf.len()
                    );
                    report.record(attempt, strategy, backoff, AttemptOutcome::Succeeded(pdf.len()));
                    return (Ok(pdf), report);
                }
                Err(e) => {
                    let size = document.measured_size();
                    warn!(
                        "[ORCHESTRATOR] {}: attempt {}/{} ({}) failed on a {}x{}px surface: {}",
                        label,
                        attempt,
                        attempts,
                        strategy.name(),
                        size.width,
                        size.height,
                        e
                    );
                    report.record(attempt, strategy, backoff, AttemptOutcome::Failed(e.to_string()));
                }
            }
        }

        let last_error = report.last_error().unwrap_or_default().to_string();
        error!(
            "[ORCHESTRATOR] {}: all {} attempt(s) failed, giving up",
            label, attempts
        );
        (Err(PipelineError::Terminal { attempts, last_error }), report)
    }

    async fn attempt(
        &self,
        document: &RenderableDocument,
        strategy: Strategy,
    ) -> Result<PdfBytes, PipelineError> {
        let (options, fit) = match strategy {
            Strategy::Primary => {
                let mut options = self.config.primary_capture();
                if let Some(target) = document.node_named(CAPTURE_TARGET) {
                    options = options.with_target(target);
                }
                (options, ImageFit::FitWidth)
            }
            Strategy::Simplified => (self.config.simplified_capture(), ImageFit::Stretch),
        };
        let pixels = self.rasterizer.rasterize(document, &options).await?;
        Ok(assemble_image(&pixels, &self.config.embed_options(fit))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_raster::{CaptureBackend, CaptureOptions, RasterError};
    use folio_surface::{DocumentSnapshot, NodeSpec};
    use folio_types::{PixelBuffer, Rect};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Fails every capture whose scale is above `max_scale`.
    #[derive(Default)]
    struct ScaleLimited {
        max_scale: f32,
        calls: AtomicU32,
    }

    impl CaptureBackend for ScaleLimited {
        fn capture(&self, snapshot: &DocumentSnapshot, options: &CaptureOptions) -> Result<PixelBuffer, RasterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if options.scale > self.max_scale {
                return Err(RasterError::Capture("canvas too large".into()));
            }
            let w = (snapshot.size.width * options.scale) as u32;
            let h = (snapshot.size.height * options.scale) as u32;
            PixelBuffer::filled(w, h, [255, 255, 255, 255])
                .ok_or_else(|| RasterError::Capture("empty".into()))
        }

        fn name(&self) -> &'static str {
            "scale-limited"
        }
    }

    fn orchestrator(max_scale: f32) -> (RetryOrchestrator, Arc<ScaleLimited>) {
        let backend = Arc::new(ScaleLimited {
            max_scale,
            ..Default::default()
        });
        let rasterizer = Rasterizer::new(backend.clone()).with_settle_delay(Duration::ZERO);
        (RetryOrchestrator::new(rasterizer, ProductionConfig::default()), backend)
    }

    fn document() -> RenderableDocument {
        let doc = RenderableDocument::from_spec(
            NodeSpec::block(Rect::new(0.0, 0.0, 40.0, 60.0)).named(CAPTURE_TARGET),
        );
        doc.set_attached(true).unwrap();
        doc
    }

    #[tokio::test(start_paused = true)]
    async fn primary_success_needs_one_attempt() {
        let (orchestrator, backend) = orchestrator(10.0);
        let (result, report) = orchestrator.produce_with_report(&document(), 3, "ORD-1").await;
        assert!(result.is_ok());
        assert_eq!(report.attempts.len(), 1);
        assert_eq!(report.attempts[0].strategy, Strategy::Primary);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn primary_failure_falls_back_after_backoff() {
        let (orchestrator, _) = orchestrator(1.0);
        let start = tokio::time::Instant::now();
        let (result, report) = orchestrator.produce_with_report(&document(), 3, "ORD-1").await;
        let pdf = result.unwrap();
        assert!(!pdf.is_empty());
        assert!(pdf.has_eof_marker());
        assert_eq!(report.failures(Strategy::Primary), 1);
        assert_eq!(report.attempts[1].strategy, Strategy::Simplified);
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausting_every_attempt_is_terminal() {
        let (orchestrator, backend) = orchestrator(0.5);
        let (result, report) = orchestrator.produce_with_report(&document(), 3, "ORD-1").await;
        match result {
            Err(PipelineError::Terminal { attempts, last_error }) => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("canvas too large"));
            }
            other => panic!("expected terminal failure, got {other:?}"),
        }
        let strategies: Vec<Strategy> = report.attempts.iter().map(|a| a.strategy).collect();
        assert_eq!(
            strategies,
            vec![Strategy::Primary, Strategy::Simplified, Strategy::Simplified]
        );
        assert_eq!(report.total_backoff(), Duration::from_millis(3000));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_means_one_attempt() {
        let (orchestrator, backend) = orchestrator(0.5);
        let result = orchestrator.produce(&document(), 0).await;
        assert!(matches!(result, Err(PipelineError::Terminal { attempts: 1, .. })));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }
}
