//! C40, Text and X12: three values in 0..40 packed into two codewords.

use super::ascii;

pub(crate) const LATCH_C40: u8 = 230;
pub(crate) const LATCH_TEXT: u8 = 239;
pub(crate) const LATCH_X12: u8 = 238;
pub(crate) const UNLATCH: u8 = 254;

const SHIFT1: u8 = 0;
const SHIFT2: u8 = 1;
const SHIFT3: u8 = 2;
const SHIFT2_UPPER: u8 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TripletSet {
    C40,
    Text,
    X12,
}

impl TripletSet {
    fn latch(self) -> u8 {
        match self {
            TripletSet::C40 => LATCH_C40,
            TripletSet::Text => LATCH_TEXT,
            TripletSet::X12 => LATCH_X12,
        }
    }

    /// Values for one character, `None` if the set cannot express it.
    fn values(self, c: u8, out: &mut Vec<u8>) -> Option<()> {
        match self {
            TripletSet::X12 => {
                out.push(x12_value(c)?);
            }
            TripletSet::C40 | TripletSet::Text => {
                let c = if c >= 128 {
                    out.extend([SHIFT2, SHIFT2_UPPER]);
                    c - 128
                } else {
                    c
                };
                if let Some(v) = basic_value(self, c) {
                    out.push(v);
                } else {
                    out.extend(shifted_values(self, c));
                }
            }
        }
        Some(())
    }
}

fn basic_value(set: TripletSet, c: u8) -> Option<u8> {
    match c {
        b' ' => Some(3),
        b'0'..=b'9' => Some(c - b'0' + 4),
        b'A'..=b'Z' if set == TripletSet::C40 => Some(c - b'A' + 14),
        b'a'..=b'z' if set == TripletSet::Text => Some(c - b'a' + 14),
        _ => None,
    }
}

/// Shift-set pair for a 7-bit character outside the basic set.
fn shifted_values(set: TripletSet, c: u8) -> [u8; 2] {
    match c {
        0..=31 => [SHIFT1, c],
        33..=47 => [SHIFT2, c - 33],
        58..=64 => [SHIFT2, c - 58 + 15],
        91..=95 => [SHIFT2, c - 91 + 22],
        _ => match set {
            TripletSet::Text => match c {
                b'`' => [SHIFT3, 0],
                b'A'..=b'Z' => [SHIFT3, c - b'A' + 1],
                _ => [SHIFT3, c.saturating_sub(123) + 27],
            },
            _ => [SHIFT3, c - 96],
        },
    }
}

fn x12_value(c: u8) -> Option<u8> {
    match c {
        b'\r' => Some(0),
        b'*' => Some(1),
        b'>' => Some(2),
        b' ' => Some(3),
        b'0'..=b'9' => Some(c - b'0' + 4),
        b'A'..=b'Z' => Some(c - b'A' + 14),
        _ => None,
    }
}

/// Latch into `set`, pack the longest prefix that fills whole triplets,
/// unlatch and finish the rest in ASCII.
///
/// In C40 and Text a final pair of values is completed with a Shift 1 so a
/// message ending mid-triplet still stays in the set. X12 has no shift, so
/// its leftover characters go to ASCII. If no triplet can be formed the whole
/// message is ASCII encoded.
pub(crate) fn encode(set: TripletSet, message: &[u8], out: &mut Vec<u8>) {
    let mut values = Vec::with_capacity(message.len() * 2);
    let mut cut = (0usize, 0usize); // (values, chars)
    for (i, &c) in message.iter().enumerate() {
        if set.values(c, &mut values).is_none() {
            break;
        }
        if values.len() % 3 == 0 {
            cut = (values.len(), i + 1);
        }
        if i + 1 == message.len() && values.len() % 3 == 2 && set != TripletSet::X12 {
            values.push(SHIFT1);
            cut = (values.len(), i + 1);
        }
    }

    let (n_values, n_chars) = cut;
    if n_values == 0 {
        ascii::encode(message, out);
        return;
    }

    out.push(set.latch());
    for t in values[..n_values].chunks_exact(3) {
        let packed = 1600 * t[0] as u16 + 40 * t[1] as u16 + t[2] as u16 + 1;
        out.push((packed >> 8) as u8);
        out.push((packed & 0xFF) as u8);
    }
    out.push(UNLATCH);
    ascii::encode(&message[n_chars..], out);
}
