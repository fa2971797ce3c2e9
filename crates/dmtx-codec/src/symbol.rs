//! ECC 200 symbol size table.

use serde::{Deserialize, Serialize};

use crate::EncodeError;

/// Geometry and codeword capacity of one ECC 200 symbol size.
///
/// `region_rows`/`region_cols` are the interior of a single data region,
/// i.e. without its finder and timing border.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SymbolSize {
    pub rows: usize,
    pub cols: usize,
    pub region_rows: usize,
    pub region_cols: usize,
    pub regions_h: usize,
    pub regions_v: usize,
    pub data_words: usize,
    pub ecc_words: usize,
    pub blocks: usize,
}

const fn square(
    size: usize,
    region: usize,
    regions: usize,
    data_words: usize,
    ecc_words: usize,
    blocks: usize,
) -> SymbolSize {
    SymbolSize {
        rows: size,
        cols: size,
        region_rows: region,
        region_cols: region,
        regions_h: regions,
        regions_v: regions,
        data_words,
        ecc_words,
        blocks,
    }
}

const fn rect(
    rows: usize,
    cols: usize,
    region_rows: usize,
    region_cols: usize,
    regions_h: usize,
    data_words: usize,
    ecc_words: usize,
) -> SymbolSize {
    SymbolSize {
        rows,
        cols,
        region_rows,
        region_cols,
        regions_h,
        regions_v: 1,
        data_words,
        ecc_words,
        blocks: 1,
    }
}

/// All ECC 200 sizes, squares first, each group ordered by capacity.
pub const SYMBOL_SIZES: [SymbolSize; 30] = [
    square(10, 8, 1, 3, 5, 1),
    square(12, 10, 1, 5, 7, 1),
    square(14, 12, 1, 8, 10, 1),
    square(16, 14, 1, 12, 12, 1),
    square(18, 16, 1, 18, 14, 1),
    square(20, 18, 1, 22, 18, 1),
    square(22, 20, 1, 30, 20, 1),
    square(24, 22, 1, 36, 24, 1),
    square(26, 24, 1, 44, 28, 1),
    square(32, 14, 2, 62, 36, 1),
    square(36, 16, 2, 86, 42, 1),
    square(40, 18, 2, 114, 48, 1),
    square(44, 20, 2, 144, 56, 1),
    square(48, 22, 2, 174, 68, 1),
    square(52, 24, 2, 204, 84, 2),
    square(64, 14, 4, 280, 112, 2),
    square(72, 16, 4, 368, 144, 4),
    square(80, 18, 4, 456, 192, 4),
    square(88, 20, 4, 576, 224, 4),
    square(96, 22, 4, 696, 272, 4),
    square(104, 24, 4, 816, 336, 6),
    square(120, 18, 6, 1050, 408, 6),
    square(132, 20, 6, 1304, 496, 8),
    square(144, 22, 6, 1558, 620, 10),
    rect(8, 18, 6, 16, 1, 5, 7),
    rect(8, 32, 6, 14, 2, 10, 11),
    rect(12, 26, 10, 24, 1, 16, 14),
    rect(12, 36, 10, 16, 2, 22, 18),
    rect(16, 36, 14, 16, 2, 32, 24),
    rect(16, 48, 14, 22, 2, 49, 28),
];

/// Square or rectangular symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolShape {
    Square,
    Rectangle,
}

impl SymbolSize {
    /// Look up a size by its module dimensions.
    pub fn find(rows: usize, cols: usize) -> Option<&'static SymbolSize> {
        SYMBOL_SIZES.iter().find(|s| s.rows == rows && s.cols == cols)
    }

    pub fn shape(&self) -> SymbolShape {
        if self.rows == self.cols {
            SymbolShape::Square
        } else {
            SymbolShape::Rectangle
        }
    }

    /// Sizes of one shape, smallest first.
    pub fn of_shape(shape: SymbolShape) -> impl Iterator<Item = &'static SymbolSize> {
        SYMBOL_SIZES.iter().filter(move |s| s.shape() == shape)
    }

    /// Rows of the mapping matrix (all data regions stitched together).
    #[inline]
    pub fn mapping_rows(&self) -> usize {
        self.regions_v * self.region_rows
    }

    #[inline]
    pub fn mapping_cols(&self) -> usize {
        self.regions_h * self.region_cols
    }

    #[inline]
    pub fn total_words(&self) -> usize {
        self.data_words + self.ecc_words
    }

    /// Error codewords in each interleaved block.
    #[inline]
    pub fn block_ecc_words(&self) -> usize {
        self.ecc_words / self.blocks
    }

    /// Data codewords in `block`. Only 144x144 has uneven blocks.
    pub fn block_data_words(&self, block: usize) -> usize {
        let base = self.data_words / self.blocks;
        if block < self.data_words % self.blocks {
            base + 1
        } else {
            base
        }
    }

    /// Errors each block can correct.
    #[inline]
    pub fn max_correctable_per_block(&self) -> usize {
        self.block_ecc_words() / 2
    }
}

/// How the encoder chooses a symbol size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeRequest {
    /// Smallest square symbol that fits.
    #[default]
    AutoSquare,
    /// Smallest rectangular symbol that fits.
    AutoRectangle,
    /// A specific size.
    Fixed { rows: usize, cols: usize },
}

impl SizeRequest {
    /// Pick a symbol for `data_words` encoded data codewords.
    pub fn select(&self, data_words: usize) -> Result<&'static SymbolSize, EncodeError> {
        let fits = |shape| {
            let mut capacity = 0;
            for size in SymbolSize::of_shape(shape) {
                if size.data_words >= data_words {
                    return Ok(size);
                }
                capacity = size.data_words;
            }
            Err(EncodeError::MessageTooLong {
                codewords: data_words,
                capacity,
            })
        };
        match *self {
            SizeRequest::AutoSquare => fits(SymbolShape::Square),
            SizeRequest::AutoRectangle => fits(SymbolShape::Rectangle),
            SizeRequest::Fixed { rows, cols } => {
                let size =
                    SymbolSize::find(rows, cols).ok_or(EncodeError::UnknownSize { rows, cols })?;
                if size.data_words < data_words {
                    return Err(EncodeError::MessageTooLong {
                        codewords: data_words,
                        capacity: size.data_words,
                    });
                }
                Ok(size)
            }
        }
    }
}
