//! Owned row-major pixel buffers.
//!
//! A [`PixelBuffer`] is allocated once per stage of a resize call and released
//! when it is dropped, so every allocation is freed exactly once on every exit
//! path, including early `?` returns. Two buffers are alive at the same time
//! during resampling (the decoded intermediate and the thumbnail); the
//! orchestrator drops the intermediate as soon as sampling is done.

use super::backend::Dimensions;
use super::params::ColorSpace;
use std::collections::TryReserveError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BufferError {
    #[error("{dimensions} buffer with {components} components does not fit in memory")]
    TooLarge {
        dimensions: Dimensions,
        components: usize,
    },
    #[error("Failed to allocate pixel buffer: {0}")]
    Allocation(#[from] TryReserveError),
    #[error("Sample count mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Row-major 8-bit samples: `height` rows of `width × components` samples.
#[derive(Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    dimensions: Dimensions,
    color_space: ColorSpace,
    samples: Vec<u8>,
}

fn sample_count(dimensions: Dimensions, color_space: ColorSpace) -> Result<usize, BufferError> {
    let too_large = || BufferError::TooLarge {
        dimensions,
        components: color_space.components(),
    };
    let width = usize::try_from(dimensions.width).map_err(|_| too_large())?;
    let height = usize::try_from(dimensions.height).map_err(|_| too_large())?;
    width
        .checked_mul(color_space.components())
        .and_then(|row| row.checked_mul(height))
        .ok_or_else(too_large)
}

impl PixelBuffer {
    /// Allocate a zero-initialized buffer.
    pub fn allocate(dimensions: Dimensions, color_space: ColorSpace) -> Result<Self, BufferError> {
        let len = sample_count(dimensions, color_space)?;
        let mut samples = Vec::new();
        samples.try_reserve_exact(len)?;
        samples.resize(len, 0);
        tracing::trace!(%dimensions, ?color_space, "allocated pixel buffer");
        Ok(Self {
            dimensions,
            color_space,
            samples,
        })
    }

    /// Adopt samples produced elsewhere, checking that the length matches.
    pub fn from_samples(
        dimensions: Dimensions,
        color_space: ColorSpace,
        samples: Vec<u8>,
    ) -> Result<Self, BufferError> {
        let expected = sample_count(dimensions, color_space)?;
        if samples.len() != expected {
            return Err(BufferError::LengthMismatch {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            dimensions,
            color_space,
            samples,
        })
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    pub fn components(&self) -> usize {
        self.color_space.components()
    }

    /// Samples per row (`width × components`).
    pub fn row_len(&self) -> usize {
        self.dimensions.width as usize * self.components()
    }

    /// Row `y`. Panics if `y >= height`.
    pub fn row(&self, y: usize) -> &[u8] {
        let len = self.row_len();
        &self.samples[y * len..(y + 1) * len]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let len = self.row_len();
        &mut self.samples[y * len..(y + 1) * len]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // chunks_exact(0) panics; a zero-width buffer has no samples anyway
        self.samples.chunks_exact(self.row_len().max(1))
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        let len = self.row_len().max(1);
        self.samples.chunks_exact_mut(len)
    }

    /// All samples, rows concatenated top to bottom.
    pub fn as_bytes(&self) -> &[u8] {
        &self.samples
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }
}

impl Drop for PixelBuffer {
    fn drop(&mut self) {
        tracing::trace!(dimensions = %self.dimensions, "released pixel buffer");
    }
}
