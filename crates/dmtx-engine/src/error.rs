use dmtx_codec::EncodeError;
use dmtx_core::{ImageError, PayloadKind};

/// Why a payload cannot be turned into a tag.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("payload is empty")]
    Empty,
    #[error("engine produces {expected} payloads, got a {found} payload")]
    KindMismatch {
        expected: PayloadKind,
        found: PayloadKind,
    },
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Errors returned by a decode engine.
///
/// Finding no tag is not an error; `decode` returns an empty list.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid decode request: {0}")]
    InvalidRequest(String),
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
    #[error("decode engine failure: {0}")]
    DecodeEngineFailure(String),
    #[error("unencodable payload: {0}")]
    UnencodablePayload(#[from] PayloadError),
    #[error(transparent)]
    Image(#[from] ImageError),
}

impl From<EncodeError> for EngineError {
    fn from(e: EncodeError) -> Self {
        EngineError::UnencodablePayload(PayloadError::Encode(e))
    }
}
