//! Full symbol module matrices: data regions framed by finder and timing patterns.

use crate::placement::{Placement, Slot};
use crate::{DecodeError, SymbolSize};

/// Dense boolean module grid, `true` = dark, row 0 at the top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitMatrix {
    rows: usize,
    cols: usize,
    bits: Vec<bool>,
}

impl BitMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            bits: vec![false; rows * cols],
        }
    }

    pub fn from_fn<F: FnMut(usize, usize) -> bool>(rows: usize, cols: usize, mut f: F) -> Self {
        let mut bits = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                bits.push(f(r, c));
            }
        }
        Self { rows, cols, bits }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.bits[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, dark: bool) {
        self.bits[row * self.cols + col] = dark;
    }

    /// Horizontally mirrored copy.
    pub fn mirrored(&self) -> BitMatrix {
        BitMatrix::from_fn(self.rows, self.cols, |r, c| self.get(r, self.cols - 1 - c))
    }
}

/// Expected colour of a finder/timing module, `None` for data modules.
///
/// Each data region has a solid left column and bottom row, and an
/// alternating top row and right column.
pub fn pattern_module(size: &SymbolSize, row: usize, col: usize) -> Option<bool> {
    let br = row % (size.region_rows + 2);
    let bc = col % (size.region_cols + 2);
    if bc == 0 || br == size.region_rows + 1 {
        Some(true)
    } else if br == 0 {
        Some(col % 2 == 0)
    } else if bc == size.region_cols + 1 {
        Some(row % 2 == 1)
    } else {
        None
    }
}

/// Mapping-matrix coordinates of a data module.
#[inline]
fn mapping_coords(size: &SymbolSize, row: usize, col: usize) -> (usize, usize) {
    (
        row - 1 - 2 * (row / (size.region_rows + 2)),
        col - 1 - 2 * (col / (size.region_cols + 2)),
    )
}

/// Render `codewords` (data and error words) into a symbol matrix.
pub fn build_matrix(size: &SymbolSize, codewords: &[u8]) -> BitMatrix {
    let placement = Placement::for_size(size);
    BitMatrix::from_fn(size.rows, size.cols, |r, c| {
        if let Some(dark) = pattern_module(size, r, c) {
            return dark;
        }
        let (mr, mc) = mapping_coords(size, r, c);
        match placement.slot(mr, mc) {
            Slot::Data { codeword, mask } => codewords
                .get(codeword)
                .map(|w| w & mask != 0)
                .unwrap_or(false),
            Slot::Fixed(dark) => dark,
        }
    })
}

/// Read every codeword out of a sampled symbol matrix.
pub fn read_codewords(size: &SymbolSize, matrix: &BitMatrix) -> Result<Vec<u8>, DecodeError> {
    if matrix.rows() != size.rows || matrix.cols() != size.cols {
        return Err(DecodeError::MatrixSize {
            rows: matrix.rows(),
            cols: matrix.cols(),
            expected_rows: size.rows,
            expected_cols: size.cols,
        });
    }
    let placement = Placement::for_size(size);
    let mut words = vec![0u8; size.total_words()];
    for r in 0..size.rows {
        for c in 0..size.cols {
            if pattern_module(size, r, c).is_some() || !matrix.get(r, c) {
                continue;
            }
            let (mr, mc) = mapping_coords(size, r, c);
            if let Slot::Data { codeword, mask } = placement.slot(mr, mc) {
                words[codeword] |= mask;
            }
        }
    }
    Ok(words)
}

/// Fraction of finder/timing modules of `matrix` that have the expected colour.
pub fn pattern_score(size: &SymbolSize, matrix: &BitMatrix) -> f32 {
    let mut total = 0u32;
    let mut ok = 0u32;
    for r in 0..size.rows.min(matrix.rows()) {
        for c in 0..size.cols.min(matrix.cols()) {
            if let Some(expected) = pattern_module(size, r, c) {
                total += 1;
                if matrix.get(r, c) == expected {
                    ok += 1;
                }
            }
        }
    }
    ok as f32 / total.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SYMBOL_SIZES;

    #[test]
    fn outer_border_is_l_plus_clock_track() {
        let size = SymbolSize::find(10, 10).unwrap();
        // Left column and bottom row solid.
        for i in 0..10 {
            assert_eq!(pattern_module(size, i, 0), Some(true));
            assert_eq!(pattern_module(size, 9, i), Some(true));
        }
        // Top row and right column alternate, top-right corner light.
        assert_eq!(pattern_module(size, 0, 1), Some(false));
        assert_eq!(pattern_module(size, 0, 2), Some(true));
        assert_eq!(pattern_module(size, 0, 9), Some(false));
        assert_eq!(pattern_module(size, 1, 9), Some(true));
        assert_eq!(pattern_module(size, 2, 9), Some(false));
        assert_eq!(pattern_module(size, 4, 4), None);
    }

    #[test]
    fn inner_region_borders_are_patterns() {
        let size = SymbolSize::find(32, 32).unwrap();
        // Second region starts at column 16 with a solid column.
        assert_eq!(pattern_module(size, 5, 16), Some(true));
        // Region 0 right column at 15 alternates.
        assert_eq!(pattern_module(size, 5, 15), Some(true));
        assert_eq!(pattern_module(size, 6, 15), Some(false));
        // Bottom row of upper region at 15.
        assert_eq!(pattern_module(size, 15, 7), Some(true));
    }

    #[test]
    fn codewords_survive_matrix_round_trip() {
        for size in &SYMBOL_SIZES {
            let words: Vec<u8> = (0..size.total_words())
                .map(|i| (i * 73 + 5) as u8)
                .collect();
            let m = build_matrix(size, &words);
            assert_eq!(pattern_score(size, &m), 1.0);
            assert_eq!(read_codewords(size, &m).unwrap(), words, "{size:?}");
        }
    }

    #[test]
    fn wrong_matrix_size_is_reported() {
        let size = SymbolSize::find(12, 12).unwrap();
        let m = BitMatrix::new(10, 10);
        assert!(matches!(
            read_codewords(size, &m),
            Err(DecodeError::MatrixSize { rows: 10, .. })
        ));
    }

    #[test]
    fn mirrored_flips_columns() {
        let mut m = BitMatrix::new(2, 3);
        m.set(0, 0, true);
        let f = m.mirrored();
        assert!(f.get(0, 2));
        assert!(!f.get(0, 0));
    }
}
