//! Codeword-to-module placement inside the mapping matrix.
//!
//! The mapping matrix is the symbol with its finder and timing borders
//! removed. Codewords are laid out as the diagonal 8-module "utah" shape with
//! four special corner shapes, sweeping up-right and down-left in turn.

use crate::SymbolSize;

/// What a mapping-matrix module carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// Bit of a codeword; `mask` is `0x80` for the first bit of the codeword.
    Data { codeword: usize, mask: u8 },
    /// Module outside every codeword, fixed dark or light.
    Fixed(bool),
}

/// Slot of every mapping-matrix module, row-major.
#[derive(Clone, Debug)]
pub struct Placement {
    pub rows: usize,
    pub cols: usize,
    pub slots: Vec<Slot>,
}

impl Placement {
    pub fn for_size(size: &SymbolSize) -> Self {
        Layout::new(size.mapping_rows(), size.mapping_cols()).run()
    }

    #[inline]
    pub fn slot(&self, row: usize, col: usize) -> Slot {
        self.slots[row * self.cols + col]
    }
}

struct Layout {
    nrow: i32,
    ncol: i32,
    cells: Vec<Option<Slot>>,
}

impl Layout {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            nrow: rows as i32,
            ncol: cols as i32,
            cells: vec![None; rows * cols],
        }
    }

    fn is_free(&self, row: i32, col: i32) -> bool {
        row >= 0
            && col >= 0
            && row < self.nrow
            && col < self.ncol
            && self.cells[(row * self.ncol + col) as usize].is_none()
    }

    /// Place bit `bit` (1 = most significant) of `chr`, wrapping off-edge positions.
    fn module(&mut self, mut row: i32, mut col: i32, chr: usize, bit: u8) {
        if row < 0 {
            row += self.nrow;
            col += 4 - ((self.nrow + 4) % 8);
        }
        if col < 0 {
            col += self.ncol;
            row += 4 - ((self.ncol + 4) % 8);
        }
        let idx = (row * self.ncol + col) as usize;
        self.cells[idx] = Some(Slot::Data {
            codeword: chr,
            mask: 0x80 >> (bit - 1),
        });
    }

    fn utah(&mut self, row: i32, col: i32, chr: usize) {
        self.module(row - 2, col - 2, chr, 1);
        self.module(row - 2, col - 1, chr, 2);
        self.module(row - 1, col - 2, chr, 3);
        self.module(row - 1, col - 1, chr, 4);
        self.module(row - 1, col, chr, 5);
        self.module(row, col - 2, chr, 6);
        self.module(row, col - 1, chr, 7);
        self.module(row, col, chr, 8);
    }

    fn corner(&mut self, chr: usize, positions: [(i32, i32); 8]) {
        for (bit, (row, col)) in (1u8..=8).zip(positions) {
            self.module(row, col, chr, bit);
        }
    }

    fn run(mut self) -> Placement {
        let (nrow, ncol) = (self.nrow, self.ncol);
        let mut chr = 0usize;
        let mut row = 4i32;
        let mut col = 0i32;

        loop {
            if row == nrow && col == 0 {
                self.corner(
                    chr,
                    [
                        (nrow - 1, 0),
                        (nrow - 1, 1),
                        (nrow - 1, 2),
                        (0, ncol - 2),
                        (0, ncol - 1),
                        (1, ncol - 1),
                        (2, ncol - 1),
                        (3, ncol - 1),
                    ],
                );
                chr += 1;
            }
            if row == nrow - 2 && col == 0 && ncol % 4 != 0 {
                self.corner(
                    chr,
                    [
                        (nrow - 3, 0),
                        (nrow - 2, 0),
                        (nrow - 1, 0),
                        (0, ncol - 4),
                        (0, ncol - 3),
                        (0, ncol - 2),
                        (0, ncol - 1),
                        (1, ncol - 1),
                    ],
                );
                chr += 1;
            }
            if row == nrow - 2 && col == 0 && ncol % 8 == 4 {
                self.corner(
                    chr,
                    [
                        (nrow - 3, 0),
                        (nrow - 2, 0),
                        (nrow - 1, 0),
                        (0, ncol - 2),
                        (0, ncol - 1),
                        (1, ncol - 1),
                        (2, ncol - 1),
                        (3, ncol - 1),
                    ],
                );
                chr += 1;
            }
            if row == nrow + 4 && col == 2 && ncol % 8 == 0 {
                self.corner(
                    chr,
                    [
                        (nrow - 1, 0),
                        (nrow - 1, ncol - 1),
                        (0, ncol - 3),
                        (0, ncol - 2),
                        (0, ncol - 1),
                        (1, ncol - 3),
                        (1, ncol - 2),
                        (1, ncol - 1),
                    ],
                );
                chr += 1;
            }

            // up and to the right
            loop {
                if self.is_free(row, col) {
                    self.utah(row, col, chr);
                    chr += 1;
                }
                row -= 2;
                col += 2;
                if !(row >= 0 && col < ncol) {
                    break;
                }
            }
            row += 1;
            col += 3;

            // down and to the left
            loop {
                if self.is_free(row, col) {
                    self.utah(row, col, chr);
                    chr += 1;
                }
                row += 2;
                col -= 2;
                if !(row < nrow && col >= 0) {
                    break;
                }
            }
            row += 3;
            col += 1;

            if !(row < nrow || col < ncol) {
                break;
            }
        }

        // Unfilled bottom-right corner gets the fixed checker pattern.
        let last = (nrow * ncol - 1) as usize;
        if self.cells[last].is_none() {
            self.cells[last] = Some(Slot::Fixed(true));
            self.cells[((nrow - 2) * ncol + ncol - 2) as usize] = Some(Slot::Fixed(true));
        }

        Placement {
            rows: nrow as usize,
            cols: ncol as usize,
            slots: self
                .cells
                .into_iter()
                .map(|c| c.unwrap_or(Slot::Fixed(false)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SYMBOL_SIZES;

    #[test]
    fn every_codeword_bit_is_placed_exactly_once() {
        for size in &SYMBOL_SIZES {
            let placement = Placement::for_size(size);
            let mut seen = vec![0u8; size.total_words()];
            for slot in &placement.slots {
                if let Slot::Data { codeword, mask } = *slot {
                    assert!(codeword < size.total_words(), "{size:?}");
                    assert_eq!(seen[codeword] & mask, 0, "{size:?} cw {codeword}");
                    seen[codeword] |= mask;
                }
            }
            assert!(seen.iter().all(|&b| b == 0xFF), "{size:?}");
        }
    }

    #[test]
    fn leftover_corner_uses_fixed_pattern() {
        // 12x12 has a 10x10 mapping matrix: 100 modules, 96 codeword bits.
        let size = SymbolSize::find(12, 12).unwrap();
        let p = Placement::for_size(size);
        assert_eq!(p.slot(9, 9), Slot::Fixed(true));
        assert_eq!(p.slot(8, 8), Slot::Fixed(true));
        assert_eq!(p.slot(9, 8), Slot::Fixed(false));
        assert_eq!(p.slot(8, 9), Slot::Fixed(false));
    }

    #[test]
    fn first_codeword_starts_at_iso_origin() {
        // The first utah is anchored at (4, 0); its left half wraps to the right edge.
        let size = SymbolSize::find(10, 10).unwrap();
        let p = Placement::for_size(size);
        assert_eq!(
            p.slot(4, 0),
            Slot::Data {
                codeword: 0,
                mask: 0x01
            }
        );
        assert_eq!(
            p.slot(3, 0),
            Slot::Data {
                codeword: 0,
                mask: 0x08
            }
        );
        assert_eq!(
            p.slot(2, 6),
            Slot::Data {
                codeword: 0,
                mask: 0x80
            }
        );
    }
}
