//! Core types for the `dmtx` Data Matrix toolkit.
//!
//! This crate holds the pieces every other crate agrees on:
//! - [`ImageBuffer`], the owned RGB raster handed to a decoder,
//! - [`TagResult`] and [`Payload`], what a decoder returns,
//! - [`Point`] / [`BoundingBox`] geometry and the [`bounding_box`] query,
//! - a 4-point [`Homography`] and grayscale sampling helpers.
//!
//! It does not know anything about the Data Matrix symbology itself.

mod geometry;
mod homography;
mod image;
mod logger;
mod tag;

pub use geometry::{bounding_box, BoundingBox, Point};
pub use homography::{homography_from_4pt, Homography};
pub use image::{
    get_gray, luminance, pack_rgb, sample_bilinear, sample_bilinear_u8, unpack_rgb, GrayImage,
    GrayImageView, ImageBuffer, ImageError, RGB_MASK,
};
pub use tag::{Payload, PayloadKind, TagResult};

#[cfg(feature = "tracing")]
pub use logger::{init_tracing, init_tracing_with_level};

pub use logger::init_with_level;
