//! Data codeword stream to message bytes, and full symbol reads.

use crate::encode::base256_unrandomize;
use crate::matrix::{read_codewords, BitMatrix};
use crate::reed_solomon::correct_errors;
use crate::{DecodeError, SymbolSize};

#[cfg(feature = "tracing")]
use tracing::instrument;

const MACRO05_HEADER: &[u8] = b"[)>\x1E05\x1D";
const MACRO06_HEADER: &[u8] = b"[)>\x1E06\x1D";
const MACRO_TRAILER: &[u8] = b"\x1E\x04";
const GS: u8 = 0x1D;

/// Result of reading one symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedSymbol {
    pub message: Vec<u8>,
    /// Codewords repaired by Reed–Solomon.
    pub corrected: usize,
}

/// Read, correct and decode a sampled symbol matrix.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "trace", skip(matrix), fields(rows = size.rows, cols = size.cols))
)]
pub fn decode_symbol(size: &SymbolSize, matrix: &BitMatrix) -> Result<DecodedSymbol, DecodeError> {
    let mut codewords = read_codewords(size, matrix)?;
    let corrected = correct_errors(size, &mut codewords)?;
    let message = decode_data(&codewords[..size.data_words])?;
    Ok(DecodedSymbol { message, corrected })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TripletSet {
    C40,
    Text,
    X12,
}

/// Decode data codewords (error words already stripped) into message bytes.
pub fn decode_data(words: &[u8]) -> Result<Vec<u8>, DecodeError> {
    MessageDecoder::new(words).run()
}

struct MessageDecoder<'a> {
    words: &'a [u8],
    pos: usize,
    out: Vec<u8>,
    upper_shift: bool,
    trailer: Option<&'static [u8]>,
}

impl<'a> MessageDecoder<'a> {
    fn new(words: &'a [u8]) -> Self {
        Self {
            words,
            pos: 0,
            out: Vec::with_capacity(words.len() * 2),
            upper_shift: false,
            trailer: None,
        }
    }

    fn malformed(&self, reason: &'static str) -> DecodeError {
        DecodeError::Malformed {
            position: self.pos,
            reason,
        }
    }

    fn push(&mut self, b: u8) {
        if self.upper_shift {
            self.upper_shift = false;
            self.out.push(b.wrapping_add(128));
        } else {
            self.out.push(b);
        }
    }

    fn remaining(&self) -> usize {
        self.words.len() - self.pos
    }

    fn run(mut self) -> Result<Vec<u8>, DecodeError> {
        while self.pos < self.words.len() {
            let cw = self.words[self.pos];
            self.pos += 1;
            match cw {
                1..=128 => self.push(cw - 1),
                129 => break,
                130..=229 => {
                    let v = cw - 130;
                    self.push(b'0' + v / 10);
                    self.push(b'0' + v % 10);
                }
                230 => self.triplets(TripletSet::C40)?,
                231 => self.base256()?,
                232 => self.out.push(GS),
                233 => {
                    // Structured append: symbol sequence and file id.
                    if self.remaining() < 3 {
                        return Err(self.malformed("truncated structured append header"));
                    }
                    self.pos += 3;
                }
                234 => {}
                235 => self.upper_shift = true,
                236 | 237 => {
                    if self.pos != 1 {
                        return Err(self.malformed("macro codeword not in first position"));
                    }
                    let header = if cw == 236 {
                        MACRO05_HEADER
                    } else {
                        MACRO06_HEADER
                    };
                    self.out.extend_from_slice(header);
                    self.trailer = Some(MACRO_TRAILER);
                }
                238 => self.triplets(TripletSet::X12)?,
                239 => self.triplets(TripletSet::Text)?,
                240 => self.edifact(),
                241 => self.eci()?,
                254 => {}
                _ => return Err(self.malformed("invalid ASCII codeword")),
            }
        }
        if let Some(trailer) = self.trailer {
            self.out.extend_from_slice(trailer);
        }
        Ok(self.out)
    }

    fn eci(&mut self) -> Result<(), DecodeError> {
        let Some(&first) = self.words.get(self.pos) else {
            return Err(self.malformed("truncated ECI designator"));
        };
        let len = match first {
            1..=127 => 1,
            128..=191 => 2,
            _ => 3,
        };
        if self.remaining() < len {
            return Err(self.malformed("truncated ECI designator"));
        }
        self.pos += len;
        Ok(())
    }

    fn triplets(&mut self, set: TripletSet) -> Result<(), DecodeError> {
        let mut shift = 0u8;
        loop {
            if self.pos >= self.words.len() {
                return Ok(());
            }
            if self.words[self.pos] == 254 {
                self.pos += 1;
                return Ok(());
            }
            // A single trailing codeword is ASCII.
            if self.remaining() < 2 {
                return Ok(());
            }
            let packed = ((self.words[self.pos] as u16) << 8) | self.words[self.pos + 1] as u16;
            if packed == 0 || packed > 64000 {
                return Err(self.malformed("triplet value out of range"));
            }
            self.pos += 2;
            let v = packed - 1;
            for value in [v / 1600, (v / 40) % 40, v % 40] {
                let value = value as u8;
                match set {
                    TripletSet::X12 => self.x12_value(value)?,
                    _ => shift = self.ctx_value(set, shift, value)?,
                }
            }
        }
    }

    /// Apply one C40/Text value; returns the next shift state.
    fn ctx_value(&mut self, set: TripletSet, shift: u8, v: u8) -> Result<u8, DecodeError> {
        match shift {
            0 => match v {
                0..=2 => return Ok(v + 1),
                3 => self.push(b' '),
                4..=13 => self.push(b'0' + v - 4),
                _ if set == TripletSet::C40 => self.push(b'A' + v - 14),
                _ => self.push(b'a' + v - 14),
            },
            1 => {
                if v > 31 {
                    return Err(self.malformed("invalid shift 1 value"));
                }
                self.push(v);
            }
            2 => match v {
                0..=14 => self.push(33 + v),
                15..=21 => self.push(58 + v - 15),
                22..=26 => self.push(91 + v - 22),
                27 => self.out.push(GS),
                30 => self.upper_shift = true,
                _ => return Err(self.malformed("invalid shift 2 value")),
            },
            _ => {
                if v > 31 {
                    return Err(self.malformed("invalid shift 3 value"));
                }
                let c = match set {
                    TripletSet::Text => match v {
                        0 => b'`',
                        1..=26 => b'A' + v - 1,
                        _ => b'{' + v - 27,
                    },
                    _ => 96 + v,
                };
                self.push(c);
            }
        }
        Ok(0)
    }

    fn x12_value(&mut self, v: u8) -> Result<(), DecodeError> {
        let c = match v {
            0 => b'\r',
            1 => b'*',
            2 => b'>',
            3 => b' ',
            4..=13 => b'0' + v - 4,
            _ => b'A' + v - 14,
        };
        self.push(c);
        Ok(())
    }

    fn edifact(&mut self) {
        loop {
            if self.pos >= self.words.len() {
                return;
            }
            let byte = |i: usize| self.words.get(i).copied().unwrap_or(0) as u32;
            let packed = (byte(self.pos) << 16) | (byte(self.pos + 1) << 8) | byte(self.pos + 2);
            for i in 0..4 {
                let v = ((packed >> (18 - 6 * i)) & 0x3F) as u8;
                // Codewords fully consumed once the value ends in them.
                if i < 3 {
                    self.pos += 1;
                }
                if v == 31 {
                    self.pos = self.pos.min(self.words.len());
                    return;
                }
                self.push(v ^ (((v & 0x20) ^ 0x20) << 1));
            }
            // Implicit return to ASCII near the end of the data.
            if self.remaining() < 3 {
                return;
            }
        }
    }

    fn base256(&mut self) -> Result<(), DecodeError> {
        let next = |dec: &mut Self| -> Result<u8, DecodeError> {
            let Some(&raw) = dec.words.get(dec.pos) else {
                return Err(dec.malformed("truncated base 256 field"));
            };
            dec.pos += 1;
            Ok(base256_unrandomize(raw, dec.pos))
        };
        let d0 = next(self)? as usize;
        let len = match d0 {
            0 => self.remaining(),
            1..=249 => d0,
            _ => (d0 - 249) * 250 + next(self)? as usize,
        };
        if len > self.remaining() {
            return Err(self.malformed("base 256 length exceeds data"));
        }
        for _ in 0..len {
            let b = next(self)?;
            self.out.push(b);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{encode_message, pad_codewords, EncodeScheme};

    fn round_trip(msg: &[u8], scheme: EncodeScheme) -> Vec<u8> {
        let mut words = encode_message(msg, scheme);
        let capacity = words.len() + 3;
        pad_codewords(&mut words, capacity);
        decode_data(&words).unwrap()
    }

    #[test]
    fn ascii_digits_and_padding() {
        assert_eq!(decode_data(&[142, 164, 186]).unwrap(), b"123456");
        assert_eq!(decode_data(&[66, 129, 175, 70]).unwrap(), b"A");
    }

    #[test]
    fn every_scheme_reads_back_mixed_content() {
        let msg = b"Order 66: ship ~12 ITEMS {fast}!";
        for scheme in EncodeScheme::ALL {
            assert_eq!(round_trip(msg, scheme), msg.to_vec(), "{scheme:?}");
        }
    }

    #[test]
    fn extended_bytes_survive_text_and_c40() {
        let msg = [b'a', 0xE9, b'Z', 0xFF, 0x01];
        for scheme in [EncodeScheme::C40, EncodeScheme::Text, EncodeScheme::Ascii] {
            assert_eq!(round_trip(&msg, scheme), msg.to_vec(), "{scheme:?}");
        }
    }

    #[test]
    fn x12_and_edifact_segments() {
        assert_eq!(
            round_trip(b"ABC*123>\rXYZ", EncodeScheme::X12),
            b"ABC*123>\rXYZ".to_vec()
        );
        for msg in [&b"A"[..], b"AB", b"ABC", b"ABCD", b"ABCDE", b"EDI-1^2 then lower"] {
            assert_eq!(round_trip(msg, EncodeScheme::Edifact), msg.to_vec());
        }
    }

    #[test]
    fn base256_long_binary() {
        let msg: Vec<u8> = (0..400u32).map(|i| (i * 7) as u8).collect();
        assert_eq!(round_trip(&msg, EncodeScheme::Base256), msg);
    }

    #[test]
    fn fnc1_and_macro_expand() {
        assert_eq!(decode_data(&[232, 66]).unwrap(), b"\x1DA");
        assert_eq!(
            decode_data(&[236, 66]).unwrap(),
            b"[)>\x1E05\x1DA\x1E\x04".to_vec()
        );
    }

    #[test]
    fn eci_and_structured_append_are_consumed() {
        assert_eq!(decode_data(&[241, 27, 66]).unwrap(), b"A");
        assert_eq!(decode_data(&[233, 0x21, 1, 1, 66]).unwrap(), b"A");
    }

    #[test]
    fn invalid_codewords_are_malformed() {
        assert!(matches!(
            decode_data(&[0]),
            Err(DecodeError::Malformed { position: 1, .. })
        ));
        assert!(decode_data(&[66, 250]).is_err());
        assert!(decode_data(&[231, 200]).is_err());
    }
}
