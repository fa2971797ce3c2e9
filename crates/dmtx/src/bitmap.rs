//! Interop with the `image` crate and bitmap files.
//!
//! Alpha channels are dropped on the way in; images leave as 8-bit RGB.

use std::path::Path;

use ::image::error::{LimitError, LimitErrorKind};
use ::image::{DynamicImage, ImageReader, RgbImage};

use crate::core::{pack_rgb, unpack_rgb, ImageBuffer, ImageError};
use crate::Error;

/// Convert an 8-bit RGB image.
pub fn from_rgb(img: &RgbImage) -> Result<ImageBuffer, Error> {
    let pixels = img
        .pixels()
        .map(|p| pack_rgb(p.0[0], p.0[1], p.0[2]))
        .collect();
    Ok(ImageBuffer::new(
        img.width() as usize,
        img.height() as usize,
        pixels,
    )?)
}

/// Convert any decoded image, flattening it to RGB first.
///
/// An image without pixels is an [`Error::UnreadableSource`].
pub fn from_bitmap(img: &DynamicImage) -> Result<ImageBuffer, Error> {
    convert(img, || format!("bitmap ({}x{})", img.width(), img.height()))
}

fn convert(img: &DynamicImage, origin: impl FnOnce() -> String) -> Result<ImageBuffer, Error> {
    if img.width() == 0 || img.height() == 0 {
        return Err(Error::UnreadableSource {
            origin: origin(),
            source: ::image::ImageError::Limits(LimitError::from_kind(
                LimitErrorKind::DimensionError,
            )),
        });
    }
    match img {
        DynamicImage::ImageRgb8(rgb) => from_rgb(rgb),
        other => from_rgb(&other.to_rgb8()),
    }
}

/// Convert back into an 8-bit RGB image.
pub fn to_bitmap(buf: &ImageBuffer) -> Result<RgbImage, Error> {
    let too_large = || ImageError::InvalidDimensions {
        width: buf.width(),
        height: buf.height(),
        pixels: buf.pixels().len(),
    };
    let width = u32::try_from(buf.width()).map_err(|_| too_large())?;
    let height = u32::try_from(buf.height()).map_err(|_| too_large())?;
    let raw: Vec<u8> = buf.pixels().iter().flat_map(|&p| unpack_rgb(p)).collect();
    RgbImage::from_raw(width, height, raw).ok_or_else(|| too_large().into())
}

/// Read and decode a bitmap file; the format is guessed from its contents.
pub fn load(path: impl AsRef<Path>) -> Result<ImageBuffer, Error> {
    let path = path.as_ref();
    let unreadable = |source: ::image::ImageError| Error::UnreadableSource {
        origin: path.display().to_string(),
        source,
    };
    let img = ImageReader::open(path)
        .map_err(|e| unreadable(e.into()))?
        .with_guessed_format()
        .map_err(|e| unreadable(e.into()))?
        .decode()
        .map_err(unreadable)?;
    log::debug!(
        "loaded {} ({}x{})",
        path.display(),
        img.width(),
        img.height()
    );
    convert(&img, || path.display().to_string())
}

/// Decode an in-memory bitmap (PNG, BMP, ...).
pub fn load_from_memory(bytes: &[u8]) -> Result<ImageBuffer, Error> {
    let origin = || format!("memory ({} bytes)", bytes.len());
    let img = ::image::load_from_memory(bytes).map_err(|source| Error::UnreadableSource {
        origin: origin(),
        source,
    })?;
    convert(&img, origin)
}

/// Write `buf` to `path`; the format follows the file extension.
pub fn save(buf: &ImageBuffer, path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    to_bitmap(buf)?
        .save(path)
        .map_err(|source| Error::UnwritableTarget {
            target: path.display().to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{Rgba, RgbaImage};

    #[test]
    fn rgb_conversion_keeps_pixels() {
        let buf = ImageBuffer::from_fn(3, 2, |x, y| pack_rgb(x as u8 * 80, y as u8 * 100, 7))
            .unwrap();
        let rgb = to_bitmap(&buf).unwrap();
        assert_eq!(rgb.dimensions(), (3, 2));
        assert_eq!(rgb.get_pixel(2, 1).0, [160, 100, 7]);
        assert_eq!(from_rgb(&rgb).unwrap(), buf);
    }

    #[test]
    fn alpha_is_dropped() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 0]));
        let buf = from_bitmap(&DynamicImage::ImageRgba8(rgba)).unwrap();
        assert_eq!(buf.pixel(1, 1), Some(0x0A141E));
    }

    #[test]
    fn garbage_bytes_are_unreadable() {
        let err = load_from_memory(b"definitely not a bitmap").unwrap_err();
        assert!(matches!(err, Error::UnreadableSource { .. }));
    }

    #[test]
    fn empty_bitmap_is_unreadable() {
        let err = from_bitmap(&DynamicImage::new_rgb8(0, 0)).unwrap_err();
        match err {
            Error::UnreadableSource { origin, .. } => assert_eq!(origin, "bitmap (0x0)"),
            other => panic!("unexpected error: {other}"),
        }
        let err = from_bitmap(&DynamicImage::new_luma8(4, 0)).unwrap_err();
        assert!(matches!(err, Error::UnreadableSource { .. }));
    }
}
