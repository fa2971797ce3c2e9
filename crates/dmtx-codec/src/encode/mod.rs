//! Message to symbol encoding.

mod ascii;
mod base256;
mod edifact;
mod triplet;

use serde::{Deserialize, Serialize};

use crate::matrix::{build_matrix, BitMatrix};
use crate::reed_solomon::add_error_correction;
use crate::{EncodeError, SizeRequest, SymbolSize};

pub(crate) use base256::unrandomize as base256_unrandomize;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Encodation scheme used for the data codewords.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodeScheme {
    #[default]
    Ascii,
    C40,
    Text,
    X12,
    Edifact,
    Base256,
    /// Try every scheme and keep the shortest; ties keep the earlier scheme.
    AutoBest,
}

impl EncodeScheme {
    pub const ALL: [EncodeScheme; 7] = [
        EncodeScheme::Ascii,
        EncodeScheme::C40,
        EncodeScheme::Text,
        EncodeScheme::X12,
        EncodeScheme::Edifact,
        EncodeScheme::Base256,
        EncodeScheme::AutoBest,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EncodeScheme::Ascii => "ascii",
            EncodeScheme::C40 => "c40",
            EncodeScheme::Text => "text",
            EncodeScheme::X12 => "x12",
            EncodeScheme::Edifact => "edifact",
            EncodeScheme::Base256 => "base256",
            EncodeScheme::AutoBest => "auto_best",
        }
    }
}

/// Scheme and size selection for [`encode_symbol`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    pub scheme: EncodeScheme,
    pub size: SizeRequest,
}

/// A fully encoded symbol.
#[derive(Clone, Debug)]
pub struct EncodedSymbol {
    pub size: &'static SymbolSize,
    /// Data codewords (padded) followed by the interleaved error codewords.
    pub codewords: Vec<u8>,
    pub matrix: BitMatrix,
}

/// Data codewords for `message` in `scheme`, without padding.
pub fn encode_message(message: &[u8], scheme: EncodeScheme) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + 4);
    match scheme {
        EncodeScheme::Ascii => ascii::encode(message, &mut out),
        EncodeScheme::C40 => triplet::encode(triplet::TripletSet::C40, message, &mut out),
        EncodeScheme::Text => triplet::encode(triplet::TripletSet::Text, message, &mut out),
        EncodeScheme::X12 => triplet::encode(triplet::TripletSet::X12, message, &mut out),
        EncodeScheme::Edifact => edifact::encode(message, &mut out),
        EncodeScheme::Base256 => base256::encode(message, &mut out),
        EncodeScheme::AutoBest => {
            return EncodeScheme::ALL[..6]
                .iter()
                .map(|&s| encode_message(message, s))
                .reduce(|best, cand| if cand.len() < best.len() { cand } else { best })
                .unwrap_or_default();
        }
    }
    out
}

/// Append the pad sequence so that `words` fills `capacity` data codewords.
pub fn pad_codewords(words: &mut Vec<u8>, capacity: usize) {
    ascii::pad(words, capacity);
}

/// Encode `message` into a complete symbol.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(message), fields(len = message.len()))
)]
pub fn encode_symbol(message: &[u8], options: &EncodeOptions) -> Result<EncodedSymbol, EncodeError> {
    if message.is_empty() {
        return Err(EncodeError::EmptyMessage);
    }
    let mut data = encode_message(message, options.scheme);
    let size = options.size.select(data.len())?;
    log::trace!(
        "encoded {} bytes as {} data codewords ({}), symbol {}x{}",
        message.len(),
        data.len(),
        options.scheme.name(),
        size.rows,
        size.cols
    );
    pad_codewords(&mut data, size.data_words);
    let codewords = add_error_correction(size, &data);
    let matrix = build_matrix(size, &codewords);
    Ok(EncodedSymbol {
        size,
        codewords,
        matrix,
    })
}
