//! ECC 200 Data Matrix symbology.
//!
//! This crate is pure: it maps messages to module matrices and back, and
//! never looks at pixels. It provides:
//! - the ECC 200 [`SymbolSize`] table and size selection,
//! - Reed–Solomon error correction over GF(256),
//! - codeword placement and finder/timing patterns ([`BitMatrix`]),
//! - the ASCII, C40, Text, X12, EDIFACT and Base 256 encodation schemes.
//!
//! ```
//! use dmtx_codec::{decode_symbol, encode_symbol, EncodeOptions};
//!
//! let sym = encode_symbol(b"HELLO 42", &EncodeOptions::default()).unwrap();
//! let read = decode_symbol(sym.size, &sym.matrix).unwrap();
//! assert_eq!(read.message, b"HELLO 42");
//! ```

mod decode;
mod encode;
mod error;
mod matrix;
mod placement;
mod reed_solomon;
mod symbol;

pub use decode::{decode_data, decode_symbol, DecodedSymbol};
pub use encode::{
    encode_message, encode_symbol, pad_codewords, EncodeOptions, EncodeScheme, EncodedSymbol,
};
pub use error::{DecodeError, EncodeError};
pub use matrix::{build_matrix, pattern_module, pattern_score, read_codewords, BitMatrix};
pub use placement::{Placement, Slot};
pub use reed_solomon::{add_error_correction, correct_errors};
pub use symbol::{SizeRequest, SymbolShape, SymbolSize, SYMBOL_SIZES};
