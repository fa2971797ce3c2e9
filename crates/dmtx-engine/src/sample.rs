//! Module sampling through the module-space → image homography.

use dmtx_codec::{pattern_module, BitMatrix, SymbolSize};
use dmtx_core::{get_gray, homography_from_4pt, sample_bilinear_u8, GrayImageView, Homography};
use nalgebra::Point2;

use crate::finder::Frame;
use crate::threshold::{otsu_threshold_from_samples, Polarity};

/// Modules at least this wide are read as a 3x3 pixel mean instead of a
/// single bilinear sample.
const MEAN_SAMPLE_MIN_PITCH: f32 = 4.0;

/// Homography from module space (`x` = column, `y` = row, top-left origin,
/// one unit per module) onto `frame`.
pub(crate) fn module_homography(frame: &Frame, size: &SymbolSize) -> Option<Homography> {
    let (cols, rows) = (size.cols as f32, size.rows as f32);
    let src = [
        Point2::new(0.0, 0.0),
        Point2::new(cols, 0.0),
        Point2::new(cols, rows),
        Point2::new(0.0, rows),
    ];
    let dst = [frame.top, frame.far(), frame.right, frame.origin];
    homography_from_4pt(&src, &dst)
}

/// Reads module intensities from the full-resolution luminance image.
pub(crate) struct ModuleSampler<'a> {
    gray: GrayImageView<'a>,
    polarity: Polarity,
}

/// A symbol size mapped onto the image.
pub(crate) struct Grid<'s> {
    pub size: &'s SymbolSize,
    h: Homography,
    mean: bool,
}

impl<'s> Grid<'s> {
    pub fn new(frame: &Frame, size: &'s SymbolSize) -> Option<Self> {
        let h = module_homography(frame, size)?;
        Some(Self {
            size,
            h,
            mean: frame.pitch(size) >= MEAN_SAMPLE_MIN_PITCH,
        })
    }

    #[inline]
    fn center(&self, row: usize, col: usize) -> Point2<f32> {
        self.h
            .apply(Point2::new(col as f32 + 0.5, row as f32 + 0.5))
    }
}

impl<'a> ModuleSampler<'a> {
    pub fn new(gray: GrayImageView<'a>, polarity: Polarity) -> Self {
        Self { gray, polarity }
    }

    /// Intensity at `p` in pixel-corner coordinates.
    fn intensity(&self, p: Point2<f32>, mean: bool) -> u8 {
        if !p.x.is_finite() || !p.y.is_finite() {
            return 0;
        }
        if mean {
            let cx = p.x.floor() as i32;
            let cy = p.y.floor() as i32;
            let mut sum = 0u32;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    sum += get_gray(&self.gray, cx + dx, cy + dy) as u32;
                }
            }
            (sum / 9) as u8
        } else {
            sample_bilinear_u8(&self.gray, p.x - 0.5, p.y - 0.5)
        }
    }

    /// Agreement of the outer finder and timing border with the expected
    /// pattern, classified against a fixed `threshold`.
    pub fn border_score(&self, grid: &Grid<'_>, threshold: u8) -> f32 {
        let (rows, cols) = (grid.size.rows, grid.size.cols);
        let mut total = 0u32;
        let mut ok = 0u32;
        let border = (0..cols)
            .flat_map(|c| [(0, c), (rows - 1, c)])
            .chain((1..rows - 1).flat_map(|r| [(r, 0), (r, cols - 1)]));
        for (r, c) in border {
            if let Some(expected) = pattern_module(grid.size, r, c) {
                let v = self.intensity(grid.center(r, c), grid.mean);
                total += 1;
                if self.polarity.is_dark(v, threshold) == expected {
                    ok += 1;
                }
            }
        }
        if total == 0 {
            0.0
        } else {
            ok as f32 / total as f32
        }
    }

    /// Sample every module, classifying with Otsu's threshold over the samples.
    pub fn sample_matrix(&self, grid: &Grid<'_>) -> BitMatrix {
        let (rows, cols) = (grid.size.rows, grid.size.cols);
        let mut values = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                values.push(self.intensity(grid.center(r, c), grid.mean));
            }
        }
        let t = otsu_threshold_from_samples(&values);
        BitMatrix::from_fn(rows, cols, |r, c| {
            self.polarity.is_dark(values[r * cols + c], t)
        })
    }
}
