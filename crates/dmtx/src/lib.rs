//! High-level facade crate for the `dmtx-*` workspace.
//!
//! This crate provides:
//! - stable re-exports of the core, codec and engine crates,
//! - one-call [`decode`] and [`generate_tag`] helpers on a default engine,
//! - (feature `image`) conversion between [`ImageBuffer`] and the `image`
//!   crate, plus loading and saving bitmaps from disk.
//!
//! ## Quickstart
//!
//! ```no_run
//! # fn main() -> Result<(), dmtx::Error> {
//! let image = dmtx::bitmap::load("label.png")?;
//! for tag in dmtx::decode(&image, 4, 200)? {
//!     println!("{} at {:?}", tag.payload(), tag.corners());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Engines with non-default settings (numeric payloads, inverted symbols,
//! downsampling, a region of interest) are built from an [`EngineConfig`]:
//!
//! ```
//! use dmtx::{DataMatrixEngine, DecodeEngine, DecodeRequest, EngineConfig, Payload};
//!
//! let engine = DataMatrixEngine::new(EngineConfig::numeric()).unwrap();
//! let image = engine.generate_tag(&Payload::Numeric(1234)).unwrap();
//! let tags = engine.decode(&image, &DecodeRequest::default()).unwrap();
//! assert_eq!(tags[0].payload(), &Payload::Numeric(1234));
//! ```
//!
//! ## API map
//! - `dmtx::core`: image buffer, tag results, points and bounding boxes.
//! - `dmtx::codec`: ECC 200 symbol sizes, Reed–Solomon and encodation.
//! - `dmtx::engine`: the detector and the [`DecodeEngine`] contract.
//! - `dmtx::bitmap` (feature `image`): `image` crate interop and file I/O.

pub use dmtx_codec as codec;
pub use dmtx_core as core;
pub use dmtx_engine as engine;

pub use dmtx_codec::{EncodeScheme, SizeRequest};
pub use dmtx_core::{
    bounding_box, BoundingBox, ImageBuffer, Payload, PayloadKind, Point, TagResult,
};
pub use dmtx_engine::{
    DataMatrixEngine, DecodeEngine, DecodeReport, DecodeRequest, DetectParams, EngineConfig,
    EngineError, PayloadError, RegionOfInterest, RenderParams,
};

mod error;

pub use error::Error;

#[cfg(feature = "image")]
pub mod bitmap;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Decode up to `max_tags` text tags with a default engine.
///
/// `timeout_ms == 0` means no time limit. Finding nothing is `Ok(vec![])`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(image), fields(width = image.width(), height = image.height()))
)]
pub fn decode(
    image: &ImageBuffer,
    max_tags: usize,
    timeout_ms: u64,
) -> Result<Vec<TagResult>, Error> {
    let request = DecodeRequest::new(max_tags, timeout_ms)?;
    Ok(DataMatrixEngine::default().decode(image, &request)?)
}

/// Render `payload` with default render settings.
///
/// The engine's payload kind follows the payload, so numeric and text
/// payloads are both accepted.
pub fn generate_tag(payload: &Payload) -> Result<ImageBuffer, Error> {
    let config = EngineConfig {
        payload_kind: payload.kind(),
        ..EngineConfig::default()
    };
    Ok(DataMatrixEngine::new(config)?.generate_tag(payload)?)
}

/// Install a `tracing` subscriber and route `log` records into it.
///
/// Safe to call more than once; later calls are ignored.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    init_tracing_with_level(json, log::LevelFilter::Info);
}

/// [`init_tracing`] with `level` for the toolkit crates unless `RUST_LOG`
/// says otherwise.
#[cfg(feature = "tracing")]
pub fn init_tracing_with_level(json: bool, level: log::LevelFilter) {
    dmtx_core::init_tracing_with_level(json, level);
    let _ = tracing_log::LogTracer::init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facade_round_trips_both_payload_kinds() {
        let image = generate_tag(&Payload::from("facade")).unwrap();
        let tags = decode(&image, 1, 0).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].payload(), &Payload::from("facade"));

        let numeric = generate_tag(&Payload::Numeric(77)).unwrap();
        let engine = DataMatrixEngine::new(EngineConfig::numeric()).unwrap();
        let tags = engine.decode(&numeric, &DecodeRequest::default()).unwrap();
        assert_eq!(tags[0].payload(), &Payload::Numeric(77));
    }

    #[test]
    fn zero_max_tags_is_rejected() {
        let image = ImageBuffer::filled(8, 8, 0xFFFFFF).unwrap();
        let err = decode(&image, 0, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::Engine(EngineError::InvalidRequest(_))
        ));
    }

    #[test]
    fn empty_payload_surfaces_as_engine_error() {
        let err = generate_tag(&Payload::from("")).unwrap_err();
        assert!(matches!(
            err,
            Error::Engine(EngineError::UnencodablePayload(PayloadError::Empty))
        ));
    }
}
