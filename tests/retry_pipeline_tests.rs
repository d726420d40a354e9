mod common;

use common::fixtures::*;
use common::{fast_config, test_pipeline, GeneratedPdf, TestResult};
use folio::raster::{CaptureBackend, CaptureOptions, RasterError};
use folio::surface::{DocumentSnapshot, NodeSpec, RenderableDocument};
use folio::types::{PixelBuffer, Rect};
use folio::{
    PipelineBuilder, PipelineError, Producer, ProducerContext, ProductionConfig, Strategy,
    CAPTURE_TARGET, USER_FACING_FAILURE,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Succeeds only at or below `max_scale`, counting every call.
struct Flaky {
    max_scale: f32,
    calls: AtomicU32,
}

impl Flaky {
    fn new(max_scale: f32) -> Arc<Self> {
        Arc::new(Self {
            max_scale,
            calls: AtomicU32::new(0),
        })
    }
}

impl CaptureBackend for Flaky {
    fn capture(&self, snapshot: &DocumentSnapshot, options: &CaptureOptions) -> Result<PixelBuffer, RasterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if options.scale > self.max_scale {
            return Err(RasterError::Capture(format!("scale {} exceeds canvas limit", options.scale)));
        }
        let w = (snapshot.size.width * options.scale).ceil() as u32;
        let h = (snapshot.size.height * options.scale).ceil() as u32;
        PixelBuffer::filled(w, h, [250, 250, 250, 255]).ok_or_else(|| RasterError::Capture("empty surface".into()))
    }

    fn name(&self) -> &'static str {
        "flaky"
    }
}

fn pipeline_with(backend: Arc<Flaky>, config: ProductionConfig) -> folio::InvoicePipeline {
    PipelineBuilder::new()
        .with_config(config)
        .with_capture_backend(backend)
        .build()
        .expect("pipeline builds")
}

#[tokio::test]
async fn test_interactive_context_embeds_a_capture() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();
    let produced = test_pipeline()
        .produce_invoice(ProducerContext::Interactive, &paid_shipping_invoice())
        .await?;

    assert_eq!(produced.producer, Producer::RasterEmbed);
    let report = produced.report.as_ref().expect("raster path reports attempts");
    assert!(report.succeeded());
    assert_eq!(report.attempts.len(), 1);
    assert_eq!(report.attempts[0].strategy, Strategy::Primary);

    let pdf = GeneratedPdf::from_pdf(&produced.pdf)?;
    assert_pdf_min_pages!(pdf, 1);
    assert!(common::pdf_assertions::image_count(&pdf.doc) >= 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_one_primary_failure_then_simplified_success() -> TestResult {
    let backend = Flaky::new(1.0);
    let config = ProductionConfig {
        settle_delay_ms: 0,
        ..Default::default()
    };
    let pipeline = pipeline_with(backend.clone(), config);

    let start = tokio::time::Instant::now();
    let produced = pipeline
        .produce_invoice(ProducerContext::Interactive, &free_shipping_invoice())
        .await?;
    let report = produced.report.expect("raster path reports attempts");

    assert_eq!(report.failures(Strategy::Primary), 1);
    assert_eq!(report.failures(Strategy::Simplified), 0);
    assert_eq!(report.attempts.len(), 2);
    assert_eq!(report.attempts[1].backoff, Duration::from_millis(1000));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    assert!(start.elapsed() >= Duration::from_millis(1000));
    assert!(produced.pdf.has_eof_marker());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_surface_a_single_user_message() {
    let backend = Flaky::new(0.1);
    let config = ProductionConfig {
        settle_delay_ms: 0,
        max_retries: 4,
        ..Default::default()
    };
    let pipeline = pipeline_with(backend.clone(), config);

    let err = pipeline
        .produce_invoice(ProducerContext::Interactive, &paid_shipping_invoice())
        .await
        .expect_err("every capture fails");

    assert!(err.is_terminal());
    assert_eq!(err.user_message(), USER_FACING_FAILURE);
    match err {
        PipelineError::Terminal { attempts, last_error } => {
            assert_eq!(attempts, 4);
            assert!(last_error.contains("exceeds canvas limit"));
        }
        other => panic!("expected terminal failure, got {other:?}"),
    }
    assert_eq!(backend.calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn test_pending_image_delays_capture_by_at_most_the_timeout() -> TestResult {
    let pipeline = pipeline_with(Flaky::new(10.0), fast_config());
    let document = RenderableDocument::from_spec(
        NodeSpec::block(Rect::new(0.0, 0.0, 300.0, 200.0))
            .named(CAPTURE_TARGET)
            .with_children([NodeSpec::image(Rect::new(10.0, 10.0, 80.0, 80.0), "never-loads.png")]),
    );
    document.set_attached(true)?;
    assert_eq!(document.pending_images(), 1);

    let timeout = pipeline.config().readiness_timeout();
    let start = tokio::time::Instant::now();
    let (result, report) = pipeline.produce_document(&document, "pending-image").await;

    assert!(result.is_ok());
    assert!(report.succeeded());
    let waited = start.elapsed();
    assert!(waited >= timeout);
    assert!(waited <= timeout + Duration::from_millis(50), "waited {waited:?}");
    Ok(())
}

#[tokio::test]
async fn test_other_contexts_never_touch_the_capture_backend() -> TestResult {
    let backend = Flaky::new(10.0);
    let pipeline = pipeline_with(backend.clone(), fast_config());
    let invoice = paid_shipping_invoice();

    let native = pipeline.produce_invoice(ProducerContext::Checkout, &invoice).await?;
    let raw = pipeline.produce_invoice(ProducerContext::Headless, &invoice).await?;

    assert_eq!(native.producer, Producer::NativeDraw);
    assert_eq!(raw.producer, Producer::RawBytes);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    Ok(())
}
