//! Codec backend traits and shared types.
//!
//! The codec is an external collaborator: the orchestrator only needs a
//! scanline-oriented decoder and a whole-buffer encoder. [`ImageBackend`]
//! hands out one [`ScanlineDecoder`] per call and encodes finished buffers.
//!
//! The production implementation is
//! [`JpegBackend`](super::jpeg_backend::JpegBackend). Dimension planning and
//! sampling never see the backend, so a different codec only needs a new
//! implementation of these two traits.

use super::buffer::{BufferError, PixelBuffer};
use super::calculations::DecodeHint;
use super::params::{ColorSpace, DecodeSettings, EncodeSettings};
use std::io::{Read, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decoding failed: {0}")]
    Decode(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
    #[error("Unsupported format: {components} color components (expected 1 or 3)")]
    UnsupportedFormat { components: usize },
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// What the decoder knows after reading the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub dimensions: Dimensions,
    pub color_space: ColorSpace,
}

/// One decode session over a single compressed input.
///
/// Calls happen in order: [`read_header`](Self::read_header), then
/// [`configure`](Self::configure), then [`read_scanlines`](Self::read_scanlines).
pub trait ScanlineDecoder {
    /// Parse the header without decoding pixel data.
    fn read_header(&mut self) -> Result<ImageHeader, BackendError>;

    /// Apply decode tunables and return the size the decoder will actually
    /// produce. This may differ from `header / hint` because decoders only
    /// support a few scale steps and round up.
    fn configure(
        &mut self,
        hint: DecodeHint,
        settings: &DecodeSettings,
    ) -> Result<Dimensions, BackendError>;

    /// Decode every scanline into `buffer`, which has the configured size.
    fn read_scanlines(&mut self, buffer: &mut PixelBuffer) -> Result<(), BackendError>;
}

/// A codec backend.
///
/// `Sync` so a single backend can serve parallel batch calls; each call gets
/// its own decoder.
pub trait ImageBackend: Sync {
    /// Start a decode session over `input`.
    fn open_decoder<'a>(&'a self, input: Box<dyn Read + 'a>) -> Box<dyn ScanlineDecoder + 'a>;

    /// Encode `pixels` and write the compressed bytes to `output`.
    fn encode(
        &self,
        pixels: &PixelBuffer,
        output: &mut dyn Write,
        settings: &EncodeSettings,
    ) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock backend that records operations and fabricates decoded pixels.
    ///
    /// The decoded image is filled with `x + y` per sample, so tests can tell
    /// which source pixel a thumbnail sample came from. Uses Mutex (not
    /// RefCell) so it is Sync.
    pub struct MockBackend {
        pub header: ImageHeader,
        /// Size reported by `configure`; `None` means `header / hint`, rounded up.
        pub decoded_size: Option<Dimensions>,
        /// Component count the header reports instead of `header.color_space`.
        pub header_components: Option<usize>,
        pub fail_decode: bool,
        pub fail_encode: bool,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        ReadHeader,
        Configure { hint: u32, quantize: bool },
        ReadScanlines { width: u32, height: u32 },
        Encode { width: u32, height: u32, components: usize, quality: u32 },
    }

    impl MockBackend {
        pub fn new(width: u32, height: u32, color_space: ColorSpace) -> Self {
            Self {
                header: ImageHeader {
                    dimensions: Dimensions::new(width, height),
                    color_space,
                },
                decoded_size: None,
                header_components: None,
                fail_decode: false,
                fail_encode: false,
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn record(&self, op: RecordedOp) {
            self.operations.lock().unwrap().push(op);
        }
    }

    struct MockDecoder<'a> {
        backend: &'a MockBackend,
    }

    impl ScanlineDecoder for MockDecoder<'_> {
        fn read_header(&mut self) -> Result<ImageHeader, BackendError> {
            self.backend.record(RecordedOp::ReadHeader);
            let mut header = self.backend.header;
            if let Some(components) = self.backend.header_components {
                header.color_space = ColorSpace::from_components(components)?;
            }
            Ok(header)
        }

        fn configure(
            &mut self,
            hint: DecodeHint,
            settings: &DecodeSettings,
        ) -> Result<Dimensions, BackendError> {
            self.backend.record(RecordedOp::Configure {
                hint: hint.divisor(),
                quantize: settings.quantize,
            });
            let full = self.backend.header.dimensions;
            Ok(self.backend.decoded_size.unwrap_or(Dimensions {
                width: full.width.div_ceil(hint.divisor()),
                height: full.height.div_ceil(hint.divisor()),
            }))
        }

        fn read_scanlines(&mut self, buffer: &mut PixelBuffer) -> Result<(), BackendError> {
            self.backend.record(RecordedOp::ReadScanlines {
                width: buffer.width(),
                height: buffer.height(),
            });
            if self.backend.fail_decode {
                return Err(BackendError::Decode("corrupt entropy segment".into()));
            }
            let components = buffer.components();
            for (y, row) in buffer.rows_mut().enumerate() {
                for (i, sample) in row.iter_mut().enumerate() {
                    *sample = ((i / components + y) % 256) as u8;
                }
            }
            Ok(())
        }
    }

    impl ImageBackend for MockBackend {
        fn open_decoder<'a>(&'a self, _input: Box<dyn Read + 'a>) -> Box<dyn ScanlineDecoder + 'a> {
            Box::new(MockDecoder { backend: self })
        }

        fn encode(
            &self,
            pixels: &PixelBuffer,
            output: &mut dyn Write,
            settings: &EncodeSettings,
        ) -> Result<(), BackendError> {
            self.record(RecordedOp::Encode {
                width: pixels.width(),
                height: pixels.height(),
                components: pixels.components(),
                quality: settings.quality.value(),
            });
            if self.fail_encode {
                return Err(BackendError::Encode("disk quota exceeded".into()));
            }
            output.write_all(pixels.as_bytes())?;
            Ok(())
        }
    }
}
