//! Owned RGB pixel buffers and the grayscale views the detector works on.

/// Mask selecting the red, green and blue channels of a packed pixel.
pub const RGB_MASK: u32 = 0x00FF_FFFF;

/// Errors raised when constructing an [`ImageBuffer`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid image dimensions (width={width}, height={height}, pixels={pixels})")]
    InvalidDimensions {
        width: usize,
        height: usize,
        pixels: usize,
    },
}

/// Immutable, row-major RGB image with a top-left origin.
///
/// Each pixel is packed as `0x00RRGGBB`. Host formats that carry alpha or
/// padding in the top byte are accepted; the top byte is cleared on
/// construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl ImageBuffer {
    /// Build a buffer from raw packed pixels.
    ///
    /// Fails if either dimension is zero or `width * height != pixels.len()`.
    pub fn new(width: usize, height: usize, mut pixels: Vec<u32>) -> Result<Self, ImageError> {
        let expected = checked_area(width, height);
        if expected != Some(pixels.len()) {
            return Err(ImageError::InvalidDimensions {
                width,
                height,
                pixels: pixels.len(),
            });
        }
        for p in &mut pixels {
            *p &= RGB_MASK;
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A uniform image of the given colour.
    pub fn filled(width: usize, height: usize, rgb: u32) -> Result<Self, ImageError> {
        let Some(len) = checked_area(width, height) else {
            return Err(ImageError::InvalidDimensions {
                width,
                height,
                pixels: 0,
            });
        };
        Self::new(width, height, vec![rgb; len])
    }

    /// Build a buffer by evaluating `f(x, y)` for every pixel in row-major order.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Result<Self, ImageError>
    where
        F: FnMut(usize, usize) -> u32,
    {
        let Some(len) = checked_area(width, height) else {
            return Err(ImageError::InvalidDimensions {
                width,
                height,
                pixels: 0,
            });
        };
        let mut pixels = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self::new(width, height, pixels)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major packed pixels, `width * height` entries.
    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Packed pixel at `(x, y)`, or `None` outside the image.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Pixel at `(x, y)` split into `[r, g, b]`.
    pub fn rgb(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        self.pixel(x, y).map(unpack_rgb)
    }

    pub fn into_pixels(self) -> Vec<u32> {
        self.pixels
    }

    /// Luminance of every pixel (`(299 R + 587 G + 114 B) / 1000`).
    pub fn to_gray(&self) -> GrayImage {
        GrayImage {
            width: self.width,
            height: self.height,
            data: self.pixels.iter().map(|&p| luminance(p)).collect(),
        }
    }
}

fn checked_area(width: usize, height: usize) -> Option<usize> {
    if width == 0 || height == 0 {
        return None;
    }
    width.checked_mul(height)
}

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[inline]
pub fn unpack_rgb(p: u32) -> [u8; 3] {
    [(p >> 16) as u8, (p >> 8) as u8, p as u8]
}

/// 8-bit luminance of a packed pixel.
#[inline]
pub fn luminance(p: u32) -> u8 {
    let [r, g, b] = unpack_rgb(p);
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
}

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

#[inline]
pub fn get_gray(src: &GrayImageView<'_>, x: i32, y: i32) -> u8 {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return 0;
    }
    src.data[y as usize * src.width + x as usize]
}

/// Bilinear sample with pixel centres at integer coordinates.
#[inline]
pub fn sample_bilinear(src: &GrayImageView<'_>, x: f32, y: f32) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_gray(src, x0, y0) as f32;
    let p10 = get_gray(src, x0 + 1, y0) as f32;
    let p01 = get_gray(src, x0, y0 + 1) as f32;
    let p11 = get_gray(src, x0 + 1, y0 + 1) as f32;

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

#[inline]
pub fn sample_bilinear_u8(src: &GrayImageView<'_>, x: f32, y: f32) -> u8 {
    sample_bilinear(src, x, y).clamp(0.0, 255.0) as u8
}
