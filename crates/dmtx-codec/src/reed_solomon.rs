//! Reed–Solomon error correction over GF(256) for ECC 200.
//!
//! Field polynomial `x^8 + x^5 + x^3 + x^2 + 1` (0x12D), generator roots
//! `α^1 ..= α^n`. Codewords of a symbol are interleaved: data codeword `i`
//! belongs to block `i % blocks`, and error codeword `k` of block `b` sits at
//! `data_words + b + k * blocks`.

use crate::{DecodeError, SymbolSize};

const FIELD_POLY: u16 = 0x12D;

struct GfTables {
    exp: [u8; 512],
    log: [u8; 256],
}

const fn build_tables() -> GfTables {
    let mut exp = [0u8; 512];
    let mut log = [0u8; 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= FIELD_POLY;
        }
        i += 1;
    }
    while i < 512 {
        exp[i] = exp[i - 255];
        i += 1;
    }
    GfTables { exp, log }
}

static GF: GfTables = build_tables();

#[inline]
fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    GF.exp[GF.log[a as usize] as usize + GF.log[b as usize] as usize]
}

/// `a / b`, `b` must be non-zero.
#[inline]
fn div(a: u8, b: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    GF.exp[GF.log[a as usize] as usize + 255 - GF.log[b as usize] as usize]
}

#[inline]
fn alpha_pow(e: usize) -> u8 {
    GF.exp[e % 255]
}

/// Generator polynomial of degree `n`, highest coefficient first.
fn generator(n: usize) -> Vec<u8> {
    let mut g = vec![1u8];
    for i in 1..=n {
        let root = alpha_pow(i);
        let mut next = vec![0u8; g.len() + 1];
        for (j, &c) in g.iter().enumerate() {
            next[j] ^= c;
            next[j + 1] ^= mul(c, root);
        }
        g = next;
    }
    g
}

/// Remainder of `data(x) * x^n` divided by the generator.
fn block_ecc(data: &[u8], gen: &[u8]) -> Vec<u8> {
    let n = gen.len() - 1;
    let mut rem = vec![0u8; n];
    for &d in data {
        let factor = d ^ rem[0];
        rem.rotate_left(1);
        rem[n - 1] = 0;
        for k in 0..n {
            rem[k] ^= mul(gen[k + 1], factor);
        }
    }
    rem
}

fn block_indices(size: &SymbolSize, block: usize) -> impl Iterator<Item = usize> {
    let blocks = size.blocks;
    let data_words = size.data_words;
    let ecc_per_block = size.block_ecc_words();
    (block..data_words)
        .step_by(blocks)
        .chain((0..ecc_per_block).map(move |k| data_words + block + k * blocks))
}

/// Append interleaved error codewords to `data` (exactly `size.data_words` long).
pub fn add_error_correction(size: &SymbolSize, data: &[u8]) -> Vec<u8> {
    debug_assert_eq!(data.len(), size.data_words);
    let mut out = vec![0u8; size.total_words()];
    out[..data.len()].copy_from_slice(data);

    let gen = generator(size.block_ecc_words());
    for block in 0..size.blocks {
        let block_data: Vec<u8> = (block..size.data_words)
            .step_by(size.blocks)
            .map(|i| data[i])
            .collect();
        let ecc = block_ecc(&block_data, &gen);
        for (k, e) in ecc.into_iter().enumerate() {
            out[size.data_words + block + k * size.blocks] = e;
        }
    }
    out
}

/// Correct `codewords` (data followed by error words) in place.
///
/// Returns the number of corrected codewords, or `TooManyErrors` when any
/// block holds more errors than its error words can repair.
pub fn correct_errors(size: &SymbolSize, codewords: &mut [u8]) -> Result<usize, DecodeError> {
    debug_assert_eq!(codewords.len(), size.total_words());
    let n_ecc = size.block_ecc_words();
    let mut corrected = 0;
    let mut block_words = Vec::with_capacity(size.block_data_words(0) + n_ecc);

    for block in 0..size.blocks {
        block_words.clear();
        block_words.extend(block_indices(size, block).map(|i| codewords[i]));

        let fixed = correct_block(&mut block_words, n_ecc)
            .ok_or(DecodeError::TooManyErrors { block })?;
        if fixed > 0 {
            for (word, i) in block_words.iter().zip(block_indices(size, block)) {
                codewords[i] = *word;
            }
            corrected += fixed;
        }
    }
    Ok(corrected)
}

fn syndromes(block: &[u8], n_ecc: usize) -> Vec<u8> {
    (1..=n_ecc)
        .map(|j| {
            let x = alpha_pow(j);
            block.iter().fold(0u8, |acc, &c| mul(acc, x) ^ c)
        })
        .collect()
}

/// Evaluate a lowest-degree-first polynomial at `x`.
fn eval_low_first(poly: &[u8], x: u8) -> u8 {
    poly.iter().rev().fold(0u8, |acc, &c| mul(acc, x) ^ c)
}

fn berlekamp_massey(synd: &[u8]) -> (Vec<u8>, usize) {
    let mut lambda = vec![1u8];
    let mut prev = vec![1u8];
    let mut l = 0usize;
    let mut m = 1usize;
    let mut b = 1u8;

    for k in 0..synd.len() {
        let mut d = synd[k];
        for i in 1..=l {
            d ^= mul(lambda.get(i).copied().unwrap_or(0), synd[k - i]);
        }
        if d == 0 {
            m += 1;
            continue;
        }

        let coef = div(d, b);
        let snapshot = (2 * l <= k).then(|| lambda.clone());
        if lambda.len() < prev.len() + m {
            lambda.resize(prev.len() + m, 0);
        }
        for (i, &p) in prev.iter().enumerate() {
            lambda[i + m] ^= mul(coef, p);
        }

        match snapshot {
            Some(old) => {
                l = k + 1 - l;
                prev = old;
                b = d;
                m = 1;
            }
            None => m += 1,
        }
    }

    while lambda.len() > 1 && lambda.last() == Some(&0) {
        lambda.pop();
    }
    (lambda, l)
}

/// Correct a single de-interleaved block. `None` if uncorrectable.
fn correct_block(block: &mut [u8], n_ecc: usize) -> Option<usize> {
    let synd = syndromes(block, n_ecc);
    if synd.iter().all(|&s| s == 0) {
        return Some(0);
    }

    let (lambda, l) = berlekamp_massey(&synd);
    if l == 0 || 2 * l > n_ecc || lambda.len() != l + 1 {
        return None;
    }

    // Chien search: codeword at index p carries x^(len-1-p).
    let len = block.len();
    let mut positions = Vec::with_capacity(l);
    for p in 0..len {
        let degree = len - 1 - p;
        let x_inv = alpha_pow(255 - degree % 255);
        if eval_low_first(&lambda, x_inv) == 0 {
            positions.push(p);
        }
    }
    if positions.len() != l {
        return None;
    }

    // Omega(x) = S(x) * Lambda(x) mod x^n_ecc
    let mut omega = vec![0u8; n_ecc];
    for (i, &s) in synd.iter().enumerate() {
        for (j, &c) in lambda.iter().enumerate() {
            if i + j < n_ecc {
                omega[i + j] ^= mul(s, c);
            }
        }
    }

    // Formal derivative keeps the odd-degree terms.
    let lambda_prime: Vec<u8> = lambda
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, &c)| if i % 2 == 1 { c } else { 0 })
        .collect();

    for &p in &positions {
        let degree = len - 1 - p;
        let x_inv = alpha_pow(255 - degree % 255);
        let denom = eval_low_first(&lambda_prime, x_inv);
        if denom == 0 {
            return None;
        }
        block[p] ^= div(eval_low_first(&omega, x_inv), denom);
    }

    if syndromes(block, n_ecc).iter().any(|&s| s != 0) {
        return None;
    }
    Some(l)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_tables_are_consistent() {
        assert_eq!(GF.exp[0], 1);
        assert_eq!(GF.exp[8], 0x2D);
        for a in 1..=255u16 {
            let a = a as u8;
            assert_eq!(mul(a, div(1, a)), 1);
        }
    }

    #[test]
    fn matches_iso_worked_example() {
        // "123456" in a 10x10 symbol.
        let size = SymbolSize::find(10, 10).unwrap();
        let words = add_error_correction(size, &[142, 164, 186]);
        assert_eq!(words, vec![142, 164, 186, 114, 25, 5, 88, 102]);
    }

    fn sample_codewords(size: &SymbolSize) -> Vec<u8> {
        let data: Vec<u8> = (0..size.data_words)
            .map(|i| ((i * 37 + 11) % 254) as u8 + 1)
            .collect();
        add_error_correction(size, &data)
    }

    #[test]
    fn clean_symbol_needs_no_correction() {
        let size = SymbolSize::find(24, 24).unwrap();
        let mut words = sample_codewords(size);
        assert_eq!(correct_errors(size, &mut words), Ok(0));
    }

    #[test]
    fn corrects_up_to_half_the_error_words() {
        let size = SymbolSize::find(20, 20).unwrap();
        let clean = sample_codewords(size);
        let mut words = clean.clone();
        let t = size.max_correctable_per_block();
        for k in 0..t {
            words[k * 3] ^= 0x5A + k as u8;
        }
        assert_eq!(correct_errors(size, &mut words), Ok(t));
        assert_eq!(words, clean);
    }

    #[test]
    fn corrects_errors_spread_over_interleaved_blocks() {
        let size = SymbolSize::find(144, 144).unwrap();
        let clean = sample_codewords(size);
        let mut words = clean.clone();
        // Ten consecutive codewords hit ten different blocks once each.
        for w in words.iter_mut().skip(500).take(10) {
            *w ^= 0xFF;
        }
        // And an error word of the last, shorter block.
        words[size.data_words + 9] ^= 0x01;
        assert_eq!(correct_errors(size, &mut words), Ok(11));
        assert_eq!(words, clean);
    }

    #[test]
    fn rejects_too_many_errors() {
        let size = SymbolSize::find(10, 10).unwrap();
        let mut words = sample_codewords(size);
        for w in words.iter_mut().take(3) {
            *w ^= 0x33;
        }
        assert!(matches!(
            correct_errors(size, &mut words),
            Err(DecodeError::TooManyErrors { block: 0 })
        ));
    }
}
