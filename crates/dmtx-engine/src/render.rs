use dmtx_codec::BitMatrix;
use dmtx_core::{ImageBuffer, ImageError};

pub const DARK_RGB: u32 = 0x000000;
pub const LIGHT_RGB: u32 = 0xFFFFFF;

/// Largest image `render_matrix` will allocate, in pixels.
pub const MAX_RENDER_PIXELS: usize = 1 << 28;

/// Side of a rendered symbol with `modules` modules along it, or `None`
/// when it does not fit in `usize`.
pub fn rendered_side(modules: usize, module_px: usize, margin_px: usize) -> Option<usize> {
    modules
        .checked_mul(module_px.max(1))?
        .checked_add(margin_px.checked_mul(2)?)
}

/// Paint `matrix` with `module_px` pixels per module inside a `margin_px`
/// light quiet zone. Row 0 of the matrix is the top of the image.
///
/// Fails with [`ImageError::InvalidDimensions`] when the image would exceed
/// [`MAX_RENDER_PIXELS`].
pub fn render_matrix(
    matrix: &BitMatrix,
    module_px: usize,
    margin_px: usize,
) -> Result<ImageBuffer, ImageError> {
    let module_px = module_px.max(1);
    let width = rendered_side(matrix.cols(), module_px, margin_px);
    let height = rendered_side(matrix.rows(), module_px, margin_px);
    let (width, height) = match (width, height) {
        (Some(w), Some(h)) if w.checked_mul(h).is_some_and(|n| n <= MAX_RENDER_PIXELS) => (w, h),
        (w, h) => {
            return Err(ImageError::InvalidDimensions {
                width: w.unwrap_or(usize::MAX),
                height: h.unwrap_or(usize::MAX),
                pixels: 0,
            })
        }
    };
    let (x_end, y_end) = (width - margin_px, height - margin_px);
    ImageBuffer::from_fn(width, height, |x, y| {
        let inside = (margin_px..x_end).contains(&x) && (margin_px..y_end).contains(&y);
        if inside && matrix.get((y - margin_px) / module_px, (x - margin_px) / module_px) {
            DARK_RGB
        } else {
            LIGHT_RGB
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paints_modules_inside_the_margin() {
        let mut m = BitMatrix::new(2, 3);
        m.set(0, 0, true);
        m.set(1, 2, true);
        let img = render_matrix(&m, 2, 1).unwrap();
        assert_eq!((img.width(), img.height()), (8, 6));
        assert_eq!(img.pixel(0, 0), Some(LIGHT_RGB));
        assert_eq!(img.pixel(1, 1), Some(DARK_RGB));
        assert_eq!(img.pixel(2, 2), Some(DARK_RGB));
        assert_eq!(img.pixel(3, 1), Some(LIGHT_RGB));
        assert_eq!(img.pixel(6, 4), Some(DARK_RGB));
        assert_eq!(img.pixel(7, 4), Some(LIGHT_RGB));
    }

    #[test]
    fn oversized_render_is_an_error() {
        let m = BitMatrix::new(10, 10);
        assert!(matches!(
            render_matrix(&m, usize::MAX / 4, 10),
            Err(ImageError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            render_matrix(&m, 1, usize::MAX / 2),
            Err(ImageError::InvalidDimensions { .. })
        ));
        // Fits in usize but not under the pixel cap.
        assert!(render_matrix(&m, 1 << 14, 0).is_err());
        assert_eq!(rendered_side(144, 3, 5), Some(442));
        assert_eq!(rendered_side(2, usize::MAX, 0), None);
    }
}
