//! High-level thumbnail operations.
//!
//! [`create_thumbnail`] drives one resize call end to end:
//!
//! ```text
//! Idle → InputOpened → HeaderRead → Decoded → Resampled → Encoded → Done
//! ```
//!
//! Any step can fail; the error records the [`Stage`] the call had reached.
//! File handles and pixel buffers are owned values scoped to the call, so
//! whatever is held at the point of failure is released on the way out.
//!
//! The input is opened before the output, so a missing input never creates or
//! truncates the output file. The decoder (and with it the input handle) and
//! the decoded intermediate buffer are dropped as soon as resampling is done.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::buffer::{BufferError, PixelBuffer};
use super::calculations::{compute_decode_hint, compute_output_size};
use super::jpeg_backend::JpegBackend;
use super::params::{CodecSettings, ColorSpace, Policy, ResizeRequest};
use super::sampler::{self, CropWindow, center_crop};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info_span};

/// Progress of a single resize call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    InputOpened,
    HeaderRead,
    Decoded,
    Resampled,
    Encoded,
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::InputOpened => "input-opened",
            Stage::HeaderRead => "header-read",
            Stage::Decoded => "decoded",
            Stage::Resampled => "resampled",
            Stage::Encoded => "encoded",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("Target size must be at least 1")]
    InvalidTarget,
    #[error("Can't open input {}: {source}", path.display())]
    InputOpen {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Can't open output {}: {source}", path.display())]
    OutputOpen {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unsupported format: {components} color components (expected 1 or 3)")]
    UnsupportedFormat { stage: Stage, components: usize },
    #[error("Codec error at {stage}: {source}")]
    Codec { stage: Stage, source: BackendError },
    #[error("Buffer error at {stage}: {source}")]
    Buffer { stage: Stage, source: BufferError },
    #[error("IO error at {stage}: {source}")]
    Io {
        stage: Stage,
        source: std::io::Error,
    },
}

impl ResizeError {
    /// Wrap a backend failure, lifting format and buffer errors to their own variants.
    pub fn from_backend(stage: Stage, err: BackendError) -> Self {
        match err {
            BackendError::UnsupportedFormat { components } => {
                ResizeError::UnsupportedFormat { stage, components }
            }
            BackendError::Buffer(source) => ResizeError::Buffer { stage, source },
            source => ResizeError::Codec { stage, source },
        }
    }

    /// Stage the call had reached when it failed.
    pub fn stage(&self) -> Stage {
        match self {
            ResizeError::InvalidTarget | ResizeError::InputOpen { .. } => Stage::Idle,
            ResizeError::OutputOpen { .. } => Stage::InputOpened,
            ResizeError::UnsupportedFormat { stage, .. }
            | ResizeError::Codec { stage, .. }
            | ResizeError::Buffer { stage, .. }
            | ResizeError::Io { stage, .. } => *stage,
        }
    }
}

/// Result type for thumbnail operations.
pub type Result<T> = std::result::Result<T, ResizeError>;

/// A finished thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    /// Size stored in the source file.
    pub source: Dimensions,
    /// Size the decoder actually produced after its downscale hint.
    pub decoded: Dimensions,
}

impl Thumbnail {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

/// Geometry of one thumbnail, computed from the decoded image size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailPlan {
    /// Pre-crop size; sampling factors are derived from this.
    pub intermediate: Dimensions,
    /// Center crop for the square policy.
    pub crop: Option<CropWindow>,
    /// Size of the encoded thumbnail.
    pub output: Dimensions,
}

/// Plan a thumbnail without touching any pixels.
///
/// `decoded` must be the size the decoder actually produced, not the size
/// stored in the file header.
pub fn plan_thumbnail(request: ResizeRequest, decoded: Dimensions) -> ThumbnailPlan {
    let intermediate = compute_output_size(
        request.target_size,
        decoded.width,
        decoded.height,
        request.policy,
    );
    match request.policy {
        Policy::Fit => ThumbnailPlan {
            intermediate,
            crop: None,
            output: intermediate,
        },
        Policy::Square => {
            let crop = center_crop(intermediate, request.target_size);
            ThumbnailPlan {
                intermediate,
                crop: Some(crop),
                output: crop.dimensions(),
            }
        }
    }
}

/// Create a thumbnail of `input` at `output`.
pub fn create_thumbnail(
    backend: &impl ImageBackend,
    request: ResizeRequest,
    input: &Path,
    output: &Path,
    settings: &CodecSettings,
) -> Result<Thumbnail> {
    if request.target_size == 0 {
        return Err(ResizeError::InvalidTarget);
    }
    let span = info_span!(
        "thumbnail",
        size = request.target_size,
        policy = %request.policy,
        input = %input.display(),
    );
    let _guard = span.enter();

    let input_file = File::open(input).map_err(|source| ResizeError::InputOpen {
        path: input.to_path_buf(),
        source,
    })?;
    debug!(stage = %Stage::InputOpened);

    // `input_file` is dropped (closed) if this fails.
    let output_file = File::create(output).map_err(|source| ResizeError::OutputOpen {
        path: output.to_path_buf(),
        source,
    })?;

    let mut decoder = backend.open_decoder(Box::new(BufReader::new(input_file)));
    let header = decoder
        .read_header()
        .map_err(|e| ResizeError::from_backend(Stage::InputOpened, e))?;
    if header.dimensions.is_empty() {
        return Err(ResizeError::Codec {
            stage: Stage::InputOpened,
            source: BackendError::Decode(format!("empty image ({})", header.dimensions)),
        });
    }
    debug!(stage = %Stage::HeaderRead, source = %header.dimensions, color_space = ?header.color_space);

    let hint = compute_decode_hint(
        request.target_size,
        header.dimensions.width,
        header.dimensions.height,
        request.policy,
    );
    let decoded_size = decoder
        .configure(hint, &settings.decode)
        .map_err(|e| ResizeError::from_backend(Stage::HeaderRead, e))?;
    if decoded_size.is_empty() {
        return Err(ResizeError::Codec {
            stage: Stage::HeaderRead,
            source: BackendError::Decode(format!("decoder reported {decoded_size}")),
        });
    }
    let mut decoded = PixelBuffer::allocate(decoded_size, header.color_space)
        .map_err(|source| ResizeError::Buffer {
            stage: Stage::HeaderRead,
            source,
        })?;
    decoder
        .read_scanlines(&mut decoded)
        .map_err(|e| ResizeError::from_backend(Stage::HeaderRead, e))?;
    drop(decoder);
    debug!(stage = %Stage::Decoded, hint = hint.divisor(), decoded = %decoded_size);

    let plan = plan_thumbnail(request, decoded_size);
    let crop_target = plan.crop.map(|_| request.target_size);
    let thumbnail = sampler::sample(&decoded, plan.intermediate, crop_target).map_err(|source| {
        ResizeError::Buffer {
            stage: Stage::Decoded,
            source,
        }
    })?;
    drop(decoded);
    debug!(
        stage = %Stage::Resampled,
        intermediate = %plan.intermediate,
        crop = ?plan.crop,
        output = %thumbnail.dimensions(),
    );

    let mut writer = BufWriter::new(output_file);
    backend
        .encode(&thumbnail, &mut writer, &settings.encode)
        .map_err(|e| ResizeError::from_backend(Stage::Resampled, e))?;
    debug!(stage = %Stage::Encoded);

    writer.flush().map_err(|source| ResizeError::Io {
        stage: Stage::Encoded,
        source,
    })?;
    drop(writer);
    debug!(stage = %Stage::Done, output = %output.display());

    Ok(Thumbnail {
        width: thumbnail.width(),
        height: thumbnail.height(),
        color_space: thumbnail.color_space(),
        source: header.dimensions,
        decoded: decoded_size,
    })
}

/// Aspect-preserving thumbnail whose longer side is `target_size`.
///
/// Uses the JPEG backend with default settings.
pub fn resize(target_size: u32, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<Thumbnail> {
    create_thumbnail(
        &JpegBackend::new(),
        ResizeRequest::fit(target_size),
        input.as_ref(),
        output.as_ref(),
        &CodecSettings::default(),
    )
}

/// Exactly `target_size × target_size` thumbnail, center-cropped.
///
/// Uses the JPEG backend with default settings.
pub fn resize_square(
    target_size: u32,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<Thumbnail> {
    create_thumbnail(
        &JpegBackend::new(),
        ResizeRequest::square(target_size),
        input.as_ref(),
        output.as_ref(),
        &CodecSettings::default(),
    )
}
