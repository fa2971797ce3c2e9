//! ASCII encodation: one codeword per character, two per digit pair.

pub(crate) const PAD: u8 = 129;
pub(crate) const UPPER_SHIFT: u8 = 235;
const DIGIT_PAIR_BASE: u8 = 130;

/// Encode `message` entirely in ASCII mode.
pub(crate) fn encode(message: &[u8], out: &mut Vec<u8>) {
    let mut i = 0;
    while i < message.len() {
        let c = message[i];
        match message.get(i + 1) {
            Some(&next) if c.is_ascii_digit() && next.is_ascii_digit() => {
                out.push(DIGIT_PAIR_BASE + (c - b'0') * 10 + (next - b'0'));
                i += 2;
            }
            _ => {
                push_char(c, out);
                i += 1;
            }
        }
    }
}

/// Encode one byte, using upper shift for the extended half.
pub(crate) fn push_char(c: u8, out: &mut Vec<u8>) {
    if c >= 128 {
        out.push(UPPER_SHIFT);
        out.push(c - 128 + 1);
    } else {
        out.push(c + 1);
    }
}

/// Fill `words` up to `capacity` with the randomised pad sequence.
pub(crate) fn pad(words: &mut Vec<u8>, capacity: usize) {
    if words.len() < capacity {
        words.push(PAD);
    }
    while words.len() < capacity {
        let position = words.len() + 1;
        let pseudo = ((149 * position) % 253) + 1;
        let mut v = PAD as usize + pseudo;
        if v > 254 {
            v -= 254;
        }
        words.push(v as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_pack_in_pairs() {
        let mut out = Vec::new();
        encode(b"123456", &mut out);
        assert_eq!(out, vec![142, 164, 186]);
    }

    #[test]
    fn odd_digit_and_letters() {
        let mut out = Vec::new();
        encode(b"A1b", &mut out);
        assert_eq!(out, vec![66, 50, 99]);
    }

    #[test]
    fn extended_bytes_use_upper_shift() {
        let mut out = Vec::new();
        encode(&[0xE9], &mut out);
        assert_eq!(out, vec![UPPER_SHIFT, 0xE9 - 127]);
    }

    #[test]
    fn padding_is_randomised_after_first_pad() {
        let mut words = vec![142, 164];
        pad(&mut words, 5);
        // position 4: 129 + (596 % 253) + 1 = 220; position 5: 129 + (745 % 253) + 1 = 369 - 254.
        assert_eq!(words, vec![142, 164, 129, 220, 115]);
    }
}
