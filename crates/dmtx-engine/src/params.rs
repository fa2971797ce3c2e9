use std::num::NonZeroUsize;
use std::time::Duration;

use dmtx_codec::{EncodeScheme, SizeRequest};
use dmtx_core::PayloadKind;
use serde::{Deserialize, Serialize};

use crate::render::{rendered_side, MAX_RENDER_PIXELS};
use crate::EngineError;

/// Modules along the longest side of any ECC 200 symbol.
const MAX_SYMBOL_MODULES: usize = 144;

/// Pixel rectangle restricting the search, in full-resolution coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionOfInterest {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl RegionOfInterest {
    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && y >= self.y && x - self.x < self.width && y - self.y < self.height
    }
}

/// Detector tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectParams {
    /// Smallest symbol edge, in pixels, worth examining.
    pub min_edge_px: f32,
    /// Largest symbol edge, in pixels; `None` for no limit.
    pub max_edge_px: Option<f32>,
    /// Smallest module pitch, in pixels, a candidate size may have.
    pub min_module_px: f32,
    /// Integer downsampling applied before the search (1 = full resolution).
    ///
    /// Modules are always sampled from the full-resolution image.
    pub shrink: usize,
    /// Fixed binarization threshold; `None` computes Otsu's threshold.
    pub threshold: Option<u8>,
    /// Images whose luminance spread is below this are treated as blank.
    pub min_contrast: u8,
    /// Required agreement of finder and timing modules, in `(0, 1]`.
    pub min_pattern_score: f32,
    /// Also try the mirrored reading of every candidate.
    pub allow_mirrored: bool,
    /// Run a second pass for light-on-dark symbols.
    pub detect_inverted: bool,
    /// Restrict the search to this rectangle.
    pub roi: Option<RegionOfInterest>,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            min_edge_px: 10.0,
            max_edge_px: None,
            min_module_px: 1.5,
            shrink: 1,
            threshold: None,
            min_contrast: 20,
            min_pattern_score: 0.8,
            allow_mirrored: true,
            detect_inverted: false,
            roi: None,
        }
    }
}

/// Tag generation settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParams {
    /// Side of one module in pixels.
    pub module_px: usize,
    /// Quiet zone around the symbol in pixels.
    pub margin_px: usize,
    pub scheme: EncodeScheme,
    pub size: SizeRequest,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            module_px: 5,
            margin_px: 10,
            scheme: EncodeScheme::Ascii,
            size: SizeRequest::AutoSquare,
        }
    }
}

/// Full configuration of a [`DataMatrixEngine`](crate::DataMatrixEngine).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Payload representation the engine returns and accepts.
    pub payload_kind: PayloadKind,
    pub detect: DetectParams,
    pub render: RenderParams,
}

impl EngineConfig {
    /// Default configuration for numeric identifiers.
    pub fn numeric() -> Self {
        Self {
            payload_kind: PayloadKind::Numeric,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let d = &self.detect;
        if d.shrink == 0 {
            return Err(EngineError::InvalidConfig("shrink must be at least 1".into()));
        }
        if !(d.min_pattern_score > 0.0 && d.min_pattern_score <= 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "min_pattern_score must be in (0, 1], got {}",
                d.min_pattern_score
            )));
        }
        if !d.min_edge_px.is_finite() || d.min_edge_px < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "min_edge_px must be a non-negative number, got {}",
                d.min_edge_px
            )));
        }
        if let Some(max) = d.max_edge_px {
            if !(max >= d.min_edge_px) {
                return Err(EngineError::InvalidConfig(format!(
                    "max_edge_px ({max}) is below min_edge_px ({})",
                    d.min_edge_px
                )));
            }
        }
        if !d.min_module_px.is_finite() || d.min_module_px <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "min_module_px must be positive".into(),
            ));
        }
        if matches!(d.roi, Some(r) if r.width == 0 || r.height == 0) {
            return Err(EngineError::InvalidConfig("roi must not be empty".into()));
        }
        if self.render.module_px == 0 {
            return Err(EngineError::InvalidConfig(
                "module_px must be at least 1".into(),
            ));
        }
        let r = &self.render;
        let side = rendered_side(MAX_SYMBOL_MODULES, r.module_px, r.margin_px);
        if !side.and_then(|s| s.checked_mul(s)).is_some_and(|n| n <= MAX_RENDER_PIXELS) {
            return Err(EngineError::InvalidConfig(format!(
                "module_px {} with margin_px {} renders images above {MAX_RENDER_PIXELS} pixels",
                r.module_px, r.margin_px
            )));
        }
        Ok(())
    }
}

/// Resource bounds for one decode call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeRequest {
    max_tags: NonZeroUsize,
    timeout: Option<Duration>,
}

impl DecodeRequest {
    pub const DEFAULT_MAX_TAGS: usize = 4;

    /// `timeout_ms == 0` means no time bound. Fails if `max_tags == 0`.
    pub fn new(max_tags: usize, timeout_ms: u64) -> Result<Self, EngineError> {
        let max_tags = NonZeroUsize::new(max_tags)
            .ok_or_else(|| EngineError::InvalidRequest("max_tags must be at least 1".into()))?;
        let timeout = (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms));
        Ok(Self { max_tags, timeout })
    }

    pub fn with_max_tags(mut self, max_tags: NonZeroUsize) -> Self {
        self.max_tags = max_tags;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[inline]
    pub fn max_tags(&self) -> usize {
        self.max_tags.get()
    }

    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for DecodeRequest {
    fn default() -> Self {
        Self {
            max_tags: NonZeroUsize::new(Self::DEFAULT_MAX_TAGS).unwrap_or(NonZeroUsize::MIN),
            timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_max_tags_is_rejected() {
        assert!(matches!(
            DecodeRequest::new(0, 100),
            Err(EngineError::InvalidRequest(_))
        ));
    }

    #[test]
    fn zero_timeout_means_unbounded() {
        let r = DecodeRequest::new(2, 0).unwrap();
        assert_eq!(r.max_tags(), 2);
        assert_eq!(r.timeout(), None);
        let r = DecodeRequest::new(1, 250).unwrap();
        assert_eq!(r.timeout(), Some(Duration::from_millis(250)));
        assert_eq!(DecodeRequest::default().max_tags(), 4);
    }

    #[test]
    fn config_validation_catches_bad_values() {
        let mut cfg = EngineConfig::default();
        assert!(cfg.validate().is_ok());
        cfg.detect.shrink = 0;
        assert!(cfg.validate().is_err());
        cfg.detect.shrink = 2;
        cfg.detect.min_pattern_score = 1.5;
        assert!(cfg.validate().is_err());
        cfg.detect.min_pattern_score = 0.8;
        cfg.render.module_px = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn oversized_render_settings_are_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.render.module_px = usize::MAX / 4;
        assert!(matches!(cfg.validate(), Err(EngineError::InvalidConfig(_))));
        cfg.render.module_px = 5;
        cfg.render.margin_px = usize::MAX;
        assert!(cfg.validate().is_err());
        // 144 * 110 + 2 * 100 = 16040 px per side still fits.
        cfg.render.module_px = 110;
        cfg.render.margin_px = 100;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_loads_partial_json() {
        let cfg: EngineConfig = serde_json::from_str(
            r#"{"payload_kind":"numeric","detect":{"detect_inverted":true},"render":{"scheme":"auto_best"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.payload_kind, PayloadKind::Numeric);
        assert!(cfg.detect.detect_inverted);
        assert_eq!(cfg.detect.min_pattern_score, 0.8);
        assert_eq!(cfg.render.scheme, EncodeScheme::AutoBest);
        assert_eq!(cfg.render.module_px, 5);
    }

    #[test]
    fn roi_contains_is_half_open() {
        let roi = RegionOfInterest {
            x: 10,
            y: 5,
            width: 4,
            height: 2,
        };
        assert!(roi.contains(10, 5));
        assert!(roi.contains(13, 6));
        assert!(!roi.contains(14, 6));
        assert!(!roi.contains(9, 5));
    }
}
