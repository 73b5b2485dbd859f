//! Thumbnail pipeline: decode, nearest-neighbor resample, re-encode.
//!
//! | Step | Module |
//! |---|---|
//! | **Plan** scale factor, output size, decode hint | [`calculations`] |
//! | **Own** pixel buffers for one call | [`buffer`] |
//! | **Sample** destination pixels from source pixels, center crop | [`sampler`] |
//! | **Quantize** to a fixed palette at decode time | [`quantize`] |
//! | **Codec** traits and the JPEG implementation | [`backend`], [`jpeg_backend`] |
//! | **Orchestrate** one call end to end | [`operations`] |
//!
//! Only [`operations`] and the backend touch files or compressed data; the
//! rest are pure functions over dimensions and buffers.

pub mod backend;
pub mod buffer;
mod calculations;
pub mod jpeg_backend;
pub mod operations;
mod params;
pub mod quantize;
pub mod sampler;

pub use backend::{BackendError, Dimensions, ImageBackend, ImageHeader, ScanlineDecoder};
pub use buffer::{BufferError, PixelBuffer};
pub use calculations::{
    DecodeHint, ScaleFactor, compute_decode_hint, compute_output_size, compute_scale_factor,
};
pub use jpeg_backend::JpegBackend;
pub use operations::{
    ResizeError, Stage, Thumbnail, ThumbnailPlan, create_thumbnail, plan_thumbnail, resize,
    resize_square,
};
pub use params::{
    CodecSettings, ColorSpace, DEFAULT_PALETTE_COLORS, DecodeSettings, Dither, EncodeSettings,
    Policy, Quality, ResizeRequest, Speed,
};
