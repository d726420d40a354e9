//! Invoice PDF production.
//!
//! - [`PipelineBuilder`]: fluent builder for a configured [`InvoicePipeline`]
//! - [`RetryOrchestrator`]: the rasterize-and-embed fallback ladder
//! - [`Producer`]: the strategy chosen for each [`ProducerContext`]
//!
//! # Example
//!
//! ```ignore
//! use folio::{PipelineBuilder, ProducerContext};
//!
//! let pipeline = PipelineBuilder::new().with_system_fonts(true).build()?;
//! let produced = pipeline.produce_invoice(ProducerContext::Checkout, &invoice).await?;
//! ```

pub mod api;
mod builder;
pub mod config;
pub mod orchestrator;
pub mod producer;
pub mod report;

pub use api::InvoicePipeline;
pub use builder::PipelineBuilder;
pub use config::{load_seller, ProductionConfig};
pub use orchestrator::{RetryOrchestrator, CAPTURE_TARGET};
pub use producer::{ProducedPdf, Producer, ProducerContext};
pub use report::{AttemptOutcome, AttemptRecord, ProductionReport, Strategy};
