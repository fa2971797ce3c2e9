//! Base 256: raw bytes behind a length field, all randomised by position.

pub(crate) const LATCH: u8 = 231;

/// 255-state randomisation of the codeword at 1-based `position`.
#[inline]
pub(crate) fn randomize(value: u8, position: usize) -> u8 {
    let pseudo = ((149 * position) % 255) + 1;
    ((value as usize + pseudo) % 256) as u8
}

#[inline]
pub(crate) fn unrandomize(value: u8, position: usize) -> u8 {
    let pseudo = ((149 * position) % 255) + 1;
    ((value as usize + 256 - pseudo) % 256) as u8
}

/// Encode the whole message as one Base 256 field.
pub(crate) fn encode(message: &[u8], out: &mut Vec<u8>) {
    out.push(LATCH);
    let n = message.len();
    let mut field = Vec::with_capacity(n + 2);
    if n <= 249 {
        field.push(n as u8);
    } else {
        field.push((n / 250 + 249) as u8);
        field.push((n % 250) as u8);
    }
    field.extend_from_slice(message);
    for b in field {
        let position = out.len() + 1;
        out.push(randomize(b, position));
    }
}
