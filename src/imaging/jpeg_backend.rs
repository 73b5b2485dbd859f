//! JPEG backend: scaled decoding plus baseline encoding, pure Rust.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Header | `jpeg_decoder::Decoder::read_info` |
//! | Decode-time downscale | `jpeg_decoder::Decoder::scale` (scaled IDCT: 1/2, 1/4, 1/8) |
//! | Scanlines | `jpeg_decoder::Decoder::decode` |
//! | Palette quantization | [`quantize`](super::quantize) |
//! | Encode | `image::codecs::jpeg::JpegEncoder` |
//!
//! The scaled IDCT only offers power-of-two steps, so a hint of 3 decodes at
//! 1/2 and a hint of 5 at 1/4. The decoder always picks the step that keeps
//! the image at least as large as `source / hint`.

use super::backend::{BackendError, Dimensions, ImageBackend, ImageHeader, ScanlineDecoder};
use super::buffer::PixelBuffer;
use super::calculations::DecodeHint;
use super::params::{ColorSpace, DecodeSettings, EncodeSettings, Speed};
use super::quantize::quantize;
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;
use jpeg_decoder::{Decoder, PixelFormat};
use std::io::{Read, Write};

/// JPEG codec backend.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct JpegBackend;

impl JpegBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JpegBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_error(e: jpeg_decoder::Error) -> BackendError {
    BackendError::Decode(e.to_string())
}

struct JpegScanlineDecoder<'a> {
    decoder: Decoder<Box<dyn Read + 'a>>,
    header: Option<ImageHeader>,
    settings: DecodeSettings,
}

impl ScanlineDecoder for JpegScanlineDecoder<'_> {
    fn read_header(&mut self) -> Result<ImageHeader, BackendError> {
        if let Some(header) = self.header {
            return Ok(header);
        }
        self.decoder.read_info().map_err(decode_error)?;
        let info = self
            .decoder
            .info()
            .ok_or_else(|| BackendError::Decode("missing frame header".into()))?;

        // L16 is one component but two bytes per sample.
        if info.pixel_format == PixelFormat::L16 {
            return Err(BackendError::Decode(
                "16-bit sample precision is not supported".into(),
            ));
        }
        let color_space = ColorSpace::from_components(info.pixel_format.pixel_bytes())?;

        let header = ImageHeader {
            dimensions: Dimensions::new(info.width.into(), info.height.into()),
            color_space,
        };
        self.header = Some(header);
        Ok(header)
    }

    fn configure(
        &mut self,
        hint: DecodeHint,
        settings: &DecodeSettings,
    ) -> Result<Dimensions, BackendError> {
        let full = self.read_header()?.dimensions;
        self.settings = *settings;

        let divisor = match settings.speed {
            Speed::Fastest => hint.divisor(),
            Speed::Accurate => 1,
        };
        if divisor <= 1 {
            return Ok(full);
        }

        // Header dimensions come from u16 fields, so these always fit.
        let requested_width = u16::try_from(full.width.div_ceil(divisor)).unwrap_or(u16::MAX);
        let requested_height = u16::try_from(full.height.div_ceil(divisor)).unwrap_or(u16::MAX);
        let (width, height) = self
            .decoder
            .scale(requested_width, requested_height)
            .map_err(decode_error)?;
        Ok(Dimensions::new(width.into(), height.into()))
    }

    fn read_scanlines(&mut self, buffer: &mut PixelBuffer) -> Result<(), BackendError> {
        let samples = self.decoder.decode().map_err(decode_error)?;
        if samples.len() != buffer.as_bytes().len() {
            return Err(BackendError::Decode(format!(
                "decoder produced {} samples for a {} buffer of {}",
                samples.len(),
                buffer.dimensions(),
                buffer.as_bytes().len()
            )));
        }
        buffer.as_bytes_mut().copy_from_slice(&samples);

        if self.settings.quantize {
            quantize(
                buffer,
                self.settings.max_palette_colors,
                self.settings.dither,
            );
        }
        Ok(())
    }
}

impl ImageBackend for JpegBackend {
    fn open_decoder<'a>(&'a self, input: Box<dyn Read + 'a>) -> Box<dyn ScanlineDecoder + 'a> {
        Box::new(JpegScanlineDecoder {
            decoder: Decoder::new(input),
            header: None,
            settings: DecodeSettings::default(),
        })
    }

    fn encode(
        &self,
        pixels: &PixelBuffer,
        output: &mut dyn Write,
        settings: &EncodeSettings,
    ) -> Result<(), BackendError> {
        let color_type = match pixels.color_space() {
            ColorSpace::Grayscale => ExtendedColorType::L8,
            ColorSpace::Rgb => ExtendedColorType::Rgb8,
        };
        // The baseline encoder has a single speed; `settings.speed` has nothing to select here.
        let quality = settings.quality.value().clamp(1, 100) as u8;
        let mut encoder = JpegEncoder::new_with_quality(output, quality);
        encoder
            .encode(pixels.as_bytes(), pixels.width(), pixels.height(), color_type)
            .map_err(|e| BackendError::Encode(e.to_string()))
    }
}
