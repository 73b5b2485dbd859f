//! Nearest-neighbor resampling with optional center crop.
//!
//! Every destination pixel is copied from exactly one source pixel at
//! `floor(dst × source / intermediate)`; nothing is blended. The floor biases
//! sampling toward the top-left of each source region.
//!
//! The *intermediate* size is the pre-crop output size from
//! [`compute_output_size`](super::calculations::compute_output_size). For the
//! square policy one axis of it is oversized, and a [`CropWindow`] selects the
//! centered `target × target` part of it. Scale factors always come from the
//! intermediate size, so cropping never changes the sampling density.

use super::backend::Dimensions;
use super::buffer::{BufferError, PixelBuffer};

/// Region of the intermediate image that ends up in the thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    pub start_x: u32,
    pub start_y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropWindow {
    /// The whole intermediate image, no crop.
    pub fn full(intermediate: Dimensions) -> Self {
        Self {
            start_x: 0,
            start_y: 0,
            width: intermediate.width,
            height: intermediate.height,
        }
    }

    pub fn dimensions(self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

/// Center a `target × target` window on the intermediate image.
///
/// An odd leftover pixel goes to the end side: `(11 - 4) / 2 = 3` pixels are
/// skipped at the start and 4 at the end.
pub fn center_crop(intermediate: Dimensions, target: u32) -> CropWindow {
    let start = |len: u32| if len > target { (len - target) / 2 } else { 0 };
    CropWindow {
        start_x: start(intermediate.width),
        start_y: start(intermediate.height),
        width: target,
        height: target,
    }
}

/// Resample `source` to `intermediate`, keeping only the crop window when
/// `crop_target` is set.
///
/// # Panics
/// If `intermediate` or `source` has a zero side.
pub fn sample(
    source: &PixelBuffer,
    intermediate: Dimensions,
    crop_target: Option<u32>,
) -> Result<PixelBuffer, BufferError> {
    let window = match crop_target {
        Some(target) => center_crop(intermediate, target),
        None => CropWindow::full(intermediate),
    };
    let components = source.components();
    let last_col = source.width() as usize - 1;
    let last_row = source.height() as usize - 1;

    let mut thumbnail = PixelBuffer::allocate(window.dimensions(), source.color_space())?;

    // Horizontal mapping is the same for every row; compute it once.
    let mut col_offsets: Vec<usize> = Vec::new();
    col_offsets.try_reserve_exact(window.width as usize)?;
    col_offsets.extend((0..window.width).map(|x| {
        let col = map_coordinate(x, window.start_x, source.width(), intermediate.width);
        col.min(last_col) * components
    }));

    for (y, dst_row) in (0u32..).zip(thumbnail.rows_mut()) {
        let src_y = map_coordinate(y, window.start_y, source.height(), intermediate.height);
        let src_row = source.row(src_y.min(last_row));
        for (dst_px, &offset) in dst_row.chunks_exact_mut(components).zip(&col_offsets) {
            dst_px.copy_from_slice(&src_row[offset..offset + components]);
        }
    }

    Ok(thumbnail)
}

/// `floor((dst + start) × source_len / intermediate_len)` in exact integer math.
fn map_coordinate(dst: u32, start: u32, source_len: u32, intermediate_len: u32) -> usize {
    let pos = u64::from(dst) + u64::from(start);
    (pos * u64::from(source_len) / u64::from(intermediate_len)) as usize
}
