//! Global thresholding of the search image.

use dmtx_core::GrayImageView;

use crate::budget::SearchBudget;

/// Which side of the threshold counts as a dark module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Polarity {
    /// Dark modules printed on a light background.
    DarkOnLight,
    /// Light modules on a dark background.
    LightOnDark,
}

impl Polarity {
    #[inline]
    pub fn is_dark(self, v: u8, threshold: u8) -> bool {
        match self {
            Polarity::DarkOnLight => v <= threshold,
            Polarity::LightOnDark => v > threshold,
        }
    }
}

/// Pixel rectangle `[x0, x1) × [y0, y1)` in search-image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Window {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl Window {
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: width,
            y1: height,
        }
    }
}

/// Binary image of dark pixels.
#[derive(Clone, Debug)]
pub(crate) struct DarkMask {
    pub width: usize,
    pub height: usize,
    pub dark: Vec<bool>,
}

/// Luminance histogram of `window`, polling the budget once per row.
pub(crate) fn histogram(
    src: &GrayImageView<'_>,
    window: Window,
    budget: &SearchBudget,
) -> Option<[u32; 256]> {
    let mut hist = [0u32; 256];
    for y in window.y0..window.y1 {
        if budget.expired() {
            return None;
        }
        let row = &src.data[y * src.width..(y + 1) * src.width];
        for &v in &row[window.x0..window.x1] {
            hist[v as usize] += 1;
        }
    }
    Some(hist)
}

/// Difference between the brightest and darkest populated bins.
pub(crate) fn contrast(hist: &[u32; 256]) -> u8 {
    let lo = hist.iter().position(|&h| h > 0);
    let hi = hist.iter().rposition(|&h| h > 0);
    match (lo, hi) {
        (Some(lo), Some(hi)) => (hi - lo) as u8,
        _ => 0,
    }
}

/// Otsu threshold of a histogram; values `<= t` form the dark class.
pub(crate) fn otsu_threshold(hist: &[u32; 256]) -> u8 {
    let total: u64 = hist.iter().map(|&h| h as u64).sum();
    if total == 0 {
        return 127;
    }
    let min_v = hist.iter().position(|&h| h > 0).unwrap_or(0) as u8;
    let max_v = hist.iter().rposition(|&h| h > 0).unwrap_or(255) as u8;
    if min_v == max_v {
        return min_v;
    }
    let nonzero_bins = hist.iter().filter(|&&h| h > 0).count();
    if nonzero_bins <= 2 {
        return ((min_v as u16 + max_v as u16) / 2) as u8;
    }

    let total = total as f64;
    let sum_total: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &h)| i as f64 * h as f64)
        .sum();

    let mut sum_b = 0f64;
    let mut w_b = 0f64;
    let mut best_var = -1f64;
    let mut best_t = 127u8;

    for (t, &h) in hist.iter().enumerate() {
        w_b += h as f64;
        if w_b < 1.0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f < 1.0 {
            break;
        }

        sum_b += t as f64 * h as f64;
        let m_b = sum_b / w_b;
        let m_f = (sum_total - sum_b) / w_f;

        let var_between = w_b * w_f * (m_b - m_f) * (m_b - m_f);
        if var_between > best_var {
            best_var = var_between;
            best_t = t as u8;
        }
    }

    best_t
}

/// Otsu threshold of a set of sample intensities.
pub(crate) fn otsu_threshold_from_samples(samples: &[u8]) -> u8 {
    let mut hist = [0u32; 256];
    for &v in samples {
        hist[v as usize] += 1;
    }
    otsu_threshold(&hist)
}

/// Mark pixels inside `window` on the dark side of `threshold`.
///
/// Polls the budget once per row; returns `None` once it expires.
pub(crate) fn binarize(
    src: &GrayImageView<'_>,
    threshold: u8,
    polarity: Polarity,
    window: Window,
    budget: &SearchBudget,
) -> Option<DarkMask> {
    let mut dark = vec![false; src.width * src.height];
    for y in window.y0..window.y1 {
        if budget.expired() {
            return None;
        }
        let row = &src.data[y * src.width..(y + 1) * src.width];
        let out = &mut dark[y * src.width..(y + 1) * src.width];
        for x in window.x0..window.x1 {
            out[x] = polarity.is_dark(row[x], threshold);
        }
    }
    Some(DarkMask {
        width: src.width,
        height: src.height,
        dark,
    })
}
