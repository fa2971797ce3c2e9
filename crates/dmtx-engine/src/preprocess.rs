//! Luminance conversion and integer downsampling, both budget-aware.

use dmtx_core::{luminance, GrayImage, GrayImageView, ImageBuffer};

use crate::budget::SearchBudget;

/// Luminance planes of one decode call.
#[derive(Debug)]
pub(crate) struct Preprocessed {
    /// Full resolution; modules are sampled from here.
    pub gray: GrayImage,
    /// Downsampled search image, present when `shrink > 1`.
    pub small: Option<GrayImage>,
    /// Effective downsampling factor.
    pub shrink: usize,
}

impl Preprocessed {
    pub fn search_view(&self) -> GrayImageView<'_> {
        self.small.as_ref().unwrap_or(&self.gray).view()
    }
}

/// Returns `None` if the budget expires.
pub(crate) fn preprocess(
    image: &ImageBuffer,
    shrink: usize,
    budget: &SearchBudget,
) -> Option<Preprocessed> {
    let gray = luminance_image(image, budget)?;
    let shrink = shrink.clamp(1, gray.width.min(gray.height));
    let small = if shrink > 1 {
        Some(downsample(&gray.view(), shrink, budget)?)
    } else {
        None
    };
    Some(Preprocessed {
        gray,
        small,
        shrink,
    })
}

fn luminance_image(image: &ImageBuffer, budget: &SearchBudget) -> Option<GrayImage> {
    let w = image.width();
    let mut data = Vec::with_capacity(image.pixels().len());
    for row in image.pixels().chunks_exact(w) {
        if budget.expired() {
            return None;
        }
        data.extend(row.iter().map(|&p| luminance(p)));
    }
    Some(GrayImage {
        width: w,
        height: image.height(),
        data,
    })
}

/// Box-filter downsampling by an integer factor; trailing partial blocks are dropped.
fn downsample(src: &GrayImageView<'_>, factor: usize, budget: &SearchBudget) -> Option<GrayImage> {
    let w = src.width / factor;
    let h = src.height / factor;
    let area = (factor * factor) as u32;
    let mut data = vec![0u8; w * h];
    let mut acc = vec![0u32; w];
    for y in 0..h {
        if budget.expired() {
            return None;
        }
        acc.iter_mut().for_each(|a| *a = 0);
        for sy in y * factor..(y + 1) * factor {
            let row = &src.data[sy * src.width..sy * src.width + w * factor];
            for (x, block) in row.chunks_exact(factor).enumerate() {
                acc[x] += block.iter().map(|&v| v as u32).sum::<u32>();
            }
        }
        for (dst, &sum) in data[y * w..(y + 1) * w].iter_mut().zip(&acc) {
            *dst = ((sum + area / 2) / area) as u8;
        }
    }
    Some(GrayImage {
        width: w,
        height: h,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmtx_core::pack_rgb;

    #[test]
    fn converts_to_luminance() {
        let img = ImageBuffer::new(2, 1, vec![0xFFFFFF, pack_rgb(255, 0, 0)]).unwrap();
        let pre = preprocess(&img, 1, &SearchBudget::unbounded()).unwrap();
        assert_eq!(pre.gray.data, vec![255, 76]);
        assert!(pre.small.is_none());
        assert_eq!(pre.search_view().width, 2);
    }

    #[test]
    fn downsampling_averages_blocks() {
        let img = ImageBuffer::from_fn(5, 4, |x, _| if x < 2 { 0 } else { 0xFFFFFF }).unwrap();
        let pre = preprocess(&img, 2, &SearchBudget::unbounded()).unwrap();
        let small = pre.small.as_ref().unwrap();
        assert_eq!((small.width, small.height), (2, 2));
        assert_eq!(small.data, vec![0, 255, 0, 255]);
    }

    #[test]
    fn shrink_is_clamped_to_image() {
        let img = ImageBuffer::filled(3, 2, 0).unwrap();
        let pre = preprocess(&img, 8, &SearchBudget::unbounded()).unwrap();
        assert_eq!(pre.shrink, 2);
        assert_eq!(pre.search_view().width, 1);
    }

    #[test]
    fn expired_budget_stops_conversion() {
        let img = ImageBuffer::filled(4, 4, 0).unwrap();
        let budget = SearchBudget::new(Some(std::time::Duration::ZERO));
        assert!(preprocess(&img, 1, &budget).is_none());
    }
}
