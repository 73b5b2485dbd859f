//! Parameter types for thumbnail operations.
//!
//! These types describe *what* to do, not *how* to do it. They are the
//! interface between the [`operations`](super::operations) module (which
//! drives one resize call) and the [`backend`](super::backend) (which owns the
//! compressed bitstream). Keeping them separate lets a mock backend stand in
//! for the real codec without touching the orchestration logic.
//!
//! ## Types
//!
//! - [`Policy`]: Fit (longer side = target) or Square (center-cropped target × target).
//! - [`ResizeRequest`]: Target size plus policy for one call.
//! - [`ColorSpace`]: Grayscale or RGB, derived from the component count.
//! - [`Quality`]: Lossy encoding quality (1–100, default 75). Clamped on construction.
//! - [`Speed`] / [`Dither`]: Codec tunables.
//! - [`DecodeSettings`] / [`EncodeSettings`]: Everything the backend needs per call.

use super::backend::BackendError;
use serde::{Deserialize, Serialize};

/// Output policy for a thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Preserve aspect ratio; the longer source side maps to the target size.
    Fit,
    /// Map the shorter side to the target size, then center-crop to a square.
    Square,
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Policy::Fit => write!(f, "fit"),
            Policy::Square => write!(f, "square"),
        }
    }
}

/// A single resize call: how big, and which policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeRequest {
    pub target_size: u32,
    pub policy: Policy,
}

impl ResizeRequest {
    pub fn fit(target_size: u32) -> Self {
        Self {
            target_size,
            policy: Policy::Fit,
        }
    }

    pub fn square(target_size: u32) -> Self {
        Self {
            target_size,
            policy: Policy::Square,
        }
    }
}

/// Color space of a decoded or encoded image.
///
/// Only 1-component (grayscale) and 3-component (RGB) images are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    Grayscale,
    Rgb,
}

impl ColorSpace {
    /// Map a component count to a color space.
    ///
    /// Anything other than 1 or 3 is rejected rather than treated as grayscale.
    pub fn from_components(components: usize) -> Result<Self, BackendError> {
        match components {
            1 => Ok(ColorSpace::Grayscale),
            3 => Ok(ColorSpace::Rgb),
            other => Err(BackendError::UnsupportedFormat { components: other }),
        }
    }

    /// Samples per pixel.
    pub fn components(self) -> usize {
        match self {
            ColorSpace::Grayscale => 1,
            ColorSpace::Rgb => 3,
        }
    }
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(75)
    }
}

/// Codec speed preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    /// Cheapest available settings; lets the decoder downscale while decoding.
    #[default]
    Fastest,
    /// Decode at full resolution and let the sampler do all the scaling.
    Accurate,
}

/// Dithering applied when palette quantization is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dither {
    None,
    /// 4×4 Bayer ordered dither.
    #[default]
    Ordered,
}

/// Palette size used when quantization is on: a 6×6×6 color cube.
pub const DEFAULT_PALETTE_COLORS: u16 = 216;

/// Decoder tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeSettings {
    pub speed: Speed,
    pub dither: Dither,
    /// Reduce decoded samples to at most `max_palette_colors` colors.
    pub quantize: bool,
    pub max_palette_colors: u16,
}

impl Default for DecodeSettings {
    fn default() -> Self {
        Self {
            speed: Speed::Fastest,
            dither: Dither::Ordered,
            quantize: false,
            max_palette_colors: DEFAULT_PALETTE_COLORS,
        }
    }
}

/// Encoder tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodeSettings {
    pub quality: Quality,
    pub speed: Speed,
}

/// Decoder and encoder settings for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecSettings {
    pub decode: DecodeSettings,
    pub encode: EncodeSettings,
}
