//! Data Matrix (ECC 200) detection and tag generation.
//!
//! [`DataMatrixEngine`] implements the [`DecodeEngine`] contract: a blocking
//! `decode` that returns at most `max_tags` tags within a cooperative time
//! budget, and `generate_tag`, which renders a payload as a symbol image.
//!
//! Detection pipeline:
//! 1. luminance conversion and optional integer downsampling,
//! 2. global Otsu threshold (blank images stop here),
//! 3. 8-connected components of dark pixels in raster order,
//! 4. convex hull → quadrilateral → oriented "L" frames,
//! 5. per candidate size: border scoring, module sampling, Reed–Solomon
//!    correction and codeword decoding.
//!
//! ```
//! use dmtx_core::Payload;
//! use dmtx_engine::{DataMatrixEngine, DecodeEngine, DecodeRequest};
//!
//! let engine = DataMatrixEngine::default();
//! let image = engine.generate_tag(&Payload::from("hello")).unwrap();
//! let tags = engine.decode(&image, &DecodeRequest::default()).unwrap();
//! assert_eq!(tags[0].payload(), &Payload::from("hello"));
//! ```

mod budget;
mod components;
mod engine;
mod error;
mod finder;
mod params;
mod preprocess;
mod render;
mod sample;
mod threshold;

pub use budget::SearchBudget;
pub use engine::{DataMatrixEngine, DecodeEngine, DecodeReport};
pub use error::{EngineError, PayloadError};
pub use params::{DecodeRequest, DetectParams, EngineConfig, RegionOfInterest, RenderParams};
pub use render::{render_matrix, rendered_side, DARK_RGB, LIGHT_RGB, MAX_RENDER_PIXELS};
