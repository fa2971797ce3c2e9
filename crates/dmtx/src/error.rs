use crate::{codec, core, engine};

/// Errors produced by the facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Image(#[from] core::ImageError),

    #[error(transparent)]
    Engine(#[from] engine::EngineError),

    #[error(transparent)]
    Encode(#[from] codec::EncodeError),

    /// The bitmap could not be read or decoded.
    #[cfg(feature = "image")]
    #[error("cannot read bitmap from {origin}: {source}")]
    UnreadableSource {
        origin: String,
        #[source]
        source: ::image::ImageError,
    },

    /// The bitmap could not be encoded or written.
    #[cfg(feature = "image")]
    #[error("cannot write bitmap to {target}: {source}")]
    UnwritableTarget {
        target: String,
        #[source]
        source: ::image::ImageError,
    },
}
