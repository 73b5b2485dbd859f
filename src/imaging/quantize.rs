//! Decode-time palette quantization.
//!
//! Reduces a decoded buffer to a fixed palette: a uniform color cube for RGB
//! (216 colors = 6 levels per channel) or evenly spaced gray levels. With
//! [`Dither::Ordered`] a 4×4 Bayer matrix nudges each sample before rounding,
//! trading banding for a fine regular pattern.

use super::buffer::PixelBuffer;
use super::params::{ColorSpace, Dither};

const BAYER_4X4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

/// Levels per channel for a palette of at most `max_colors` colors.
pub fn levels_per_channel(color_space: ColorSpace, max_colors: u16) -> u32 {
    let max_colors = u32::from(max_colors).clamp(2, 256);
    match color_space {
        ColorSpace::Grayscale => max_colors,
        ColorSpace::Rgb => {
            let mut levels = 1;
            while (levels + 1) * (levels + 1) * (levels + 1) <= max_colors {
                levels += 1;
            }
            levels.max(2)
        }
    }
}

/// Quantize `buffer` in place to at most `max_colors` colors.
pub fn quantize(buffer: &mut PixelBuffer, max_colors: u16, dither: Dither) {
    let levels = levels_per_channel(buffer.color_space(), max_colors);
    if levels >= 256 {
        return;
    }
    let steps = (levels - 1) as f32;
    let components = buffer.components();

    for (y, row) in buffer.rows_mut().enumerate() {
        for (x, pixel) in row.chunks_exact_mut(components).enumerate() {
            let offset = match dither {
                Dither::None => 0.0,
                Dither::Ordered => (f32::from(BAYER_4X4[y % 4][x % 4]) + 0.5) / 16.0 - 0.5,
            };
            for sample in pixel {
                let level = (f32::from(*sample) / 255.0 * steps + offset)
                    .round()
                    .clamp(0.0, steps);
                *sample = (level * 255.0 / steps).round() as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::Dimensions;
    use std::collections::HashSet;

    fn gradient_rgb(width: u32, height: u32) -> PixelBuffer {
        let samples = (0..height)
            .flat_map(|y| {
                (0..width).flat_map(move |x| [(x * 7) as u8, (y * 5) as u8, ((x + y) * 3) as u8])
            })
            .collect();
        PixelBuffer::from_samples(Dimensions::new(width, height), ColorSpace::Rgb, samples)
            .unwrap()
    }

    #[test]
    fn rgb_216_is_six_levels() {
        assert_eq!(levels_per_channel(ColorSpace::Rgb, 216), 6);
        assert_eq!(levels_per_channel(ColorSpace::Rgb, 215), 5);
        assert_eq!(levels_per_channel(ColorSpace::Rgb, 8), 2);
    }

    #[test]
    fn grayscale_levels_equal_palette_size() {
        assert_eq!(levels_per_channel(ColorSpace::Grayscale, 16), 16);
        assert_eq!(levels_per_channel(ColorSpace::Grayscale, 1000), 256);
    }

    #[test]
    fn rgb_output_stays_inside_216_cube() {
        let mut buf = gradient_rgb(36, 51);
        quantize(&mut buf, 216, Dither::Ordered);

        let allowed = [0u8, 51, 102, 153, 204, 255];
        assert!(buf.as_bytes().iter().all(|s| allowed.contains(s)));

        let colors: HashSet<&[u8]> = buf.as_bytes().chunks_exact(3).collect();
        assert!(colors.len() <= 216);
    }

    #[test]
    fn without_dither_rounds_to_nearest_level() {
        let mut buf = PixelBuffer::from_samples(
            Dimensions::new(4, 1),
            ColorSpace::Grayscale,
            vec![0, 40, 128, 250],
        )
        .unwrap();
        quantize(&mut buf, 4, Dither::None);
        // Levels 0, 85, 170, 255
        assert_eq!(buf.as_bytes(), &[0, 0, 170, 255]);
    }

    #[test]
    fn ordered_dither_mixes_neighbouring_levels_on_flat_gray() {
        let mut buf =
            PixelBuffer::from_samples(Dimensions::new(4, 4), ColorSpace::Grayscale, vec![128; 16])
                .unwrap();
        quantize(&mut buf, 2, Dither::Ordered);
        let distinct: HashSet<u8> = buf.as_bytes().iter().copied().collect();
        assert_eq!(distinct, HashSet::from([0, 255]));
    }

    #[test]
    fn full_grayscale_palette_is_a_no_op() {
        let mut buf = PixelBuffer::from_samples(
            Dimensions::new(3, 1),
            ColorSpace::Grayscale,
            vec![1, 127, 254],
        )
        .unwrap();
        quantize(&mut buf, 256, Dither::Ordered);
        assert_eq!(buf.as_bytes(), &[1, 127, 254]);
    }
}
