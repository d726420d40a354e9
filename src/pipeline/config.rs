use crate::error::PipelineError;
use folio_raster::CaptureOptions;
use folio_render_lopdf::{ImageEmbedOptions, ImageFit};
use folio_types::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub use folio_types::{BankDetails, SellerProfile};

/// Tunables for document production. Every field has a default, so a
/// partial JSON file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductionConfig {
    pub max_retries: u32,
    pub base_backoff_ms: u64,
    pub readiness_timeout_ms: u64,
    pub readiness_poll_ms: u64,
    pub settle_delay_ms: u64,
    pub image_timeout_ms: u64,
    pub primary_scale: f32,
    pub simplified_scale: f32,
    pub background: Color,
    pub jpeg_quality: u8,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff_ms: 1000,
            readiness_timeout_ms: 5000,
            readiness_poll_ms: 250,
            settle_delay_ms: 1000,
            image_timeout_ms: 15_000,
            primary_scale: 2.0,
            simplified_scale: 1.0,
            background: Color::WHITE,
            jpeg_quality: 95,
        }
    }
}

impl ProductionConfig {
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        for (name, scale) in [("primaryScale", self.primary_scale), ("simplifiedScale", self.simplified_scale)] {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(PipelineError::Config(format!("{name} must be positive, got {scale}")));
            }
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(PipelineError::Config(format!(
                "jpegQuality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        if self.readiness_poll_ms == 0 {
            return Err(PipelineError::Config("readinessPollMs must be non-zero".to_string()));
        }
        Ok(())
    }

    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_millis(self.readiness_timeout_ms)
    }

    pub fn readiness_poll(&self) -> Duration {
        Duration::from_millis(self.readiness_poll_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Delay before the 1-based `attempt`: none before the first, then the
    /// base delay doubling per attempt.
    pub fn backoff_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let factor = 1u64.checked_shl(attempt - 2).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_backoff_ms.saturating_mul(factor))
    }

    pub fn primary_capture(&self) -> CaptureOptions {
        CaptureOptions::default()
            .with_scale(self.primary_scale)
            .with_background(self.background)
            .with_image_timeout(Duration::from_millis(self.image_timeout_ms))
    }

    pub fn simplified_capture(&self) -> CaptureOptions {
        CaptureOptions::simplified()
            .with_scale(self.simplified_scale)
            .with_background(self.background)
            .with_image_timeout(Duration::from_millis(self.image_timeout_ms))
    }

    pub fn embed_options(&self, fit: ImageFit) -> ImageEmbedOptions {
        ImageEmbedOptions {
            fit,
            quality: self.jpeg_quality,
            ..ImageEmbedOptions::default()
        }
    }
}

/// Reads a seller profile; absent fields keep their defaults.
pub fn load_seller<P: AsRef<Path>>(path: P) -> Result<SellerProfile, PipelineError> {
    Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ProductionConfig::from_json(r##"{ "maxRetries": 5, "background": "#fafafa" }"##).unwrap();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.base_backoff_ms, 1000);
        assert_eq!(config.background, Color::rgb(0xfa, 0xfa, 0xfa));
        assert_eq!(config.jpeg_quality, 95);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ProductionConfig::from_json(r#"{ "primaryScale": 0 }"#).is_err());
        assert!(ProductionConfig::from_json(r#"{ "jpegQuality": 0 }"#).is_err());
        assert!(ProductionConfig::from_json(r#"{ "readinessPollMs": 0 }"#).is_err());
    }

    #[test]
    fn backoff_doubles_after_the_first_attempt() {
        let config = ProductionConfig::default();
        assert_eq!(config.backoff_before(1), Duration::ZERO);
        assert_eq!(config.backoff_before(2), Duration::from_millis(1000));
        assert_eq!(config.backoff_before(3), Duration::from_millis(2000));
        assert_eq!(config.backoff_before(4), Duration::from_millis(4000));
        assert!(config.backoff_before(200) > Duration::from_secs(1_000_000));
    }

    #[test]
    fn capture_options_follow_the_config() {
        let config = ProductionConfig::default();
        let primary = config.primary_capture();
        assert_eq!(primary.scale, 2.0);
        assert!(primary.repair);
        let simplified = config.simplified_capture();
        assert_eq!(simplified.scale, 1.0);
        assert!(!simplified.repair);
        assert_eq!(config.embed_options(ImageFit::Stretch).fit, ImageFit::Stretch);
    }
}
