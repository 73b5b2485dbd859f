//! Pure calculation functions for thumbnail dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! Scale factors are kept as exact rationals ([`ScaleFactor`]); truncation only
//! happens when an integer dimension or decode hint is derived from one.

use super::backend::Dimensions;
use super::params::Policy;

/// Ratio of the requested target size to the chosen source side.
///
/// The chosen side is the longer one for [`Policy::Fit`] and the shorter one
/// for [`Policy::Square`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleFactor {
    pub numerator: u32,
    pub denominator: u32,
}

impl ScaleFactor {
    /// `floor(length × scale)`, saturating at `u32::MAX`.
    ///
    /// # Panics
    /// If the denominator is zero, i.e. the scale came from an empty image.
    pub fn apply(self, length: u32) -> u32 {
        let scaled = u64::from(length) * u64::from(self.numerator) / u64::from(self.denominator);
        u32::try_from(scaled).unwrap_or(u32::MAX)
    }

    /// `floor(1 / scale)`.
    ///
    /// # Panics
    /// If the numerator (the target size) is zero.
    pub fn inverse_floor(self) -> u32 {
        self.denominator / self.numerator
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }
}

/// Integer downscale divisor handed to the decoder (always ≥ 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeHint(pub u32);

impl DecodeHint {
    /// Decode at full resolution.
    pub const NONE: DecodeHint = DecodeHint(1);

    pub fn divisor(self) -> u32 {
        self.0
    }
}

/// Calculate the scale factor for a policy.
///
/// # Examples
/// ```
/// # use quickthumb::imaging::{Policy, compute_scale_factor};
/// // Fit divides by the longer side, Square by the shorter one
/// assert_eq!(compute_scale_factor(200, 800, 600, Policy::Fit).as_f64(), 0.25);
/// assert_eq!(compute_scale_factor(300, 800, 600, Policy::Square).as_f64(), 0.5);
/// ```
pub fn compute_scale_factor(target_size: u32, width: u32, height: u32, policy: Policy) -> ScaleFactor {
    let denominator = match policy {
        Policy::Fit => width.max(height),
        Policy::Square => width.min(height),
    };
    ScaleFactor {
        numerator: target_size,
        denominator,
    }
}

/// Calculate output dimensions before any crop.
///
/// Both sides start at `target_size`; one side is then scaled proportionally.
/// For Fit that is the shorter side, so the result fits inside a
/// `target × target` box. For Square it is the longer side, so the result
/// covers the box and is later center-cropped.
///
/// # Panics
/// If `width` or `height` is zero.
pub fn compute_output_size(target_size: u32, width: u32, height: u32, policy: Policy) -> Dimensions {
    let scale = compute_scale_factor(target_size, width, height, policy);
    let mut size = Dimensions {
        width: target_size,
        height: target_size,
    };

    let grow_width = match policy {
        Policy::Square => width > height,
        Policy::Fit => width < height,
    };

    if grow_width {
        size.width = scale.apply(width);
    } else {
        size.height = scale.apply(height);
    }

    // A 1000×1 strip fitted to 1px would otherwise truncate to zero rows.
    if policy == Policy::Fit {
        size.width = size.width.max(1);
        size.height = size.height.max(1);
    }

    size
}

/// Calculate the decode-time downscale divisor, `floor(1 / scale)`.
///
/// Upscale requests (scale > 1) decode at full resolution.
///
/// # Panics
/// If `target_size` is zero.
pub fn compute_decode_hint(target_size: u32, width: u32, height: u32, policy: Policy) -> DecodeHint {
    let scale = compute_scale_factor(target_size, width, height, policy);
    DecodeHint(scale.inverse_floor().max(1))
}
