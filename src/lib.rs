//! # quickthumb
//!
//! Fast JPEG thumbnails by decode, nearest-neighbor resample, and re-encode.
//!
//! Two policies:
//!
//! - [`resize`]: aspect-preserving; the longer side becomes the target size.
//! - [`resize_square`]: exactly `target × target`; the shorter side is scaled
//!   to the target and the longer side is center-cropped.
//!
//! ```no_run
//! # fn main() -> Result<(), quickthumb::imaging::ResizeError> {
//! let thumb = quickthumb::resize(200, "photo.jpg", "photo-200.jpg")?;
//! assert_eq!(thumb.width.max(thumb.height), 200);
//! quickthumb::resize_square(200, "photo.jpg", "photo-200-square.jpg")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Pipeline
//!
//! ```text
//! open input → read header → plan decode hint → decode (downscaled) →
//! plan output size from actual decoded size → sample → encode → close
//! ```
//!
//! Speed comes from two places. The JPEG decoder can skip most of the IDCT
//! work by decoding at 1/2, 1/4 or 1/8 scale, so a 4000px photo thumbnailed
//! to 200px is only ever decoded at 500px. The sampler then maps each output
//! pixel to exactly one decoded pixel, with the horizontal mapping computed
//! once per call rather than once per row.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Dimension planning, buffers, sampling, codec backend, orchestration |
//! | [`batch`] | Parallel thumbnails for many inputs |
//! | [`config`] | `quickthumb.toml` loading, validation, stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Nearest-Neighbor Only
//!
//! No filtering, no blending. Each output pixel is one source pixel, picked by
//! truncating the scaled coordinate. Thumbnails are small enough that the
//! aliasing rarely matters and the speed difference is large.
//!
//! ## Exact Rational Math
//!
//! Scale factors are kept as `target / side` rationals and every coordinate is
//! computed with integer arithmetic. Float rounding can never push a square
//! thumbnail one pixel short or a sample index past the edge.
//!
//! ## Codec Behind a Trait
//!
//! Planning and sampling never see compressed data. The
//! [`ImageBackend`](imaging::ImageBackend) trait is the only seam to the
//! codec, and [`JpegBackend`](imaging::JpegBackend) is the one implementation.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod output;

pub use imaging::{resize, resize_square};

#[cfg(test)]
pub(crate) mod test_helpers;
