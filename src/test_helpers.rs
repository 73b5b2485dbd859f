//! Shared test utilities: synthetic JPEG fixtures.
//!
//! Fixtures are generated on the fly with the `image` crate's encoder, so no
//! binary files live in the repository.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("source.jpg");
//! create_test_jpeg(&path, 800, 600);
//! ```

use image::{ExtendedColorType, ImageEncoder, RgbImage};
use std::path::Path;

/// Encode an RGB gradient as JPEG bytes.
pub fn rgb_jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut bytes = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut bytes)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    bytes
}

/// Encode a grayscale gradient as JPEG bytes.
pub fn gray_jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let samples: Vec<u8> = (0..height)
        .flat_map(|y| (0..width).map(move |x| ((x + y) % 256) as u8))
        .collect();
    let mut bytes = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut bytes)
        .write_image(&samples, width, height, ExtendedColorType::L8)
        .unwrap();
    bytes
}

/// Create a small valid RGB JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::write(path, rgb_jpeg_bytes(width, height)).unwrap();
}

/// Create a small valid grayscale JPEG file with the given dimensions.
pub fn create_test_gray_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::write(path, gray_jpeg_bytes(width, height)).unwrap();
}
