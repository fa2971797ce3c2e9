//! EDIFACT: 6-bit values for ASCII 32..=94, four values per three codewords.

use super::ascii;

pub(crate) const LATCH: u8 = 240;
pub(crate) const UNLATCH_VALUE: u8 = 31;

#[inline]
fn is_edifact(c: u8) -> bool {
    (32..=94).contains(&c)
}

/// Pack the leading EDIFACT-encodable run, always closed by the unlatch
/// value, then ASCII for the remainder.
///
/// The run is trimmed so the unlatch lands in a complete three-codeword
/// group. A reader that finds fewer than three codewords after a full group
/// switches back to ASCII, which would otherwise swallow a short final group.
pub(crate) fn encode(message: &[u8], out: &mut Vec<u8>) {
    let run = message.iter().take_while(|&&c| is_edifact(c)).count();
    let run = match run % 4 {
        0 => run.saturating_sub(1),
        1 => run.saturating_sub(2),
        _ => run,
    };
    if run == 0 {
        ascii::encode(message, out);
        return;
    }

    out.push(LATCH);
    let mut acc: u32 = 0;
    let mut bits = 0u32;
    let values = message[..run]
        .iter()
        .map(|&c| c & 0x3F)
        .chain(std::iter::once(UNLATCH_VALUE));
    for v in values {
        acc = (acc << 6) | v as u32;
        bits += 6;
        while bits >= 8 {
            bits -= 8;
            out.push((acc >> bits) as u8);
        }
        acc &= (1 << bits) - 1;
    }
    if bits > 0 {
        out.push((acc << (8 - bits)) as u8);
    }
    ascii::encode(&message[run..], out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_values_msb_first() {
        let mut out = Vec::new();
        // 'A' = 0x01, 'B' = 0x02, 'C' = 0x03, unlatch 0x1F
        encode(b"ABC", &mut out);
        // 000001 000010 000011 011111
        assert_eq!(out, vec![LATCH, 0b0000_0100, 0b0010_0000, 0b1101_1111]);
    }

    #[test]
    fn partial_group_is_zero_padded() {
        let mut out = Vec::new();
        // 'A' = 0x01, '.' = 0x2E: 000001 101110 011111 -> 00000110 11100111 11(000000)
        encode(b"A.", &mut out);
        assert_eq!(out, vec![LATCH, 0b0000_0110, 0b1110_0111, 0b1100_0000]);
    }

    #[test]
    fn run_is_trimmed_to_whole_groups() {
        let mut out = Vec::new();
        encode(b"ABCD", &mut out);
        // "ABC" + unlatch fill one group, 'D' follows in ASCII.
        assert_eq!(out.len(), 1 + 3 + 1);
        assert_eq!(out[4], b'D' + 1);

        out.clear();
        encode(b"A", &mut out);
        assert_eq!(out, vec![b'A' + 1]);
    }

    #[test]
    fn lower_case_tail_is_ascii() {
        let mut out = Vec::new();
        encode(b"A1a", &mut out);
        assert_eq!(out[0], LATCH);
        assert_eq!(*out.last().unwrap(), b'a' + 1);
    }
}
