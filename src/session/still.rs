//! Encoded still frames.
//!
//! A still is a value: once encoded it owns its bytes and has no tie to
//! the stream it came from.

use crate::capture::{Frame, StillConfig, StillFormat};
use base64::Engine;
use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{GenericImageView, ImageFormat, RgbImage};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors produced while encoding or inspecting a still frame.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("frame buffer holds {actual} bytes, expected {expected} for {width}x{height}")]
    BufferMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),
}

/// A single encoded image captured from a live stream.
#[derive(Clone)]
pub struct StillFrame {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    format: StillFormat,
    fingerprint: [u8; 32],
    captured_at: DateTime<Utc>,
}

impl StillFrame {
    /// Renders `frame` into an encode target of the frame's exact
    /// dimensions and encodes it.
    pub fn encode(frame: &Frame, config: &StillConfig) -> Result<Self, EncodeError> {
        let (width, height) = frame.dimensions();
        if !frame.is_valid() {
            return Err(EncodeError::BufferMismatch {
                width,
                height,
                expected: frame.pixel_count() * crate::capture::RGB_CHANNELS,
                actual: frame.pixels().len(),
            });
        }

        let mut target = RgbImage::new(width, height);
        let dst: &mut [u8] = &mut target;
        dst.copy_from_slice(frame.pixels());

        let mut bytes = Vec::new();
        match config.format {
            StillFormat::Png => target.write_with_encoder(PngEncoder::new(&mut bytes))?,
            StillFormat::Jpeg => target.write_with_encoder(JpegEncoder::new_with_quality(
                &mut bytes,
                config.jpeg_quality,
            ))?,
        }

        let fingerprint: [u8; 32] = Sha256::digest(&bytes).into();
        let still = Self {
            bytes,
            width,
            height,
            format: config.format,
            fingerprint,
            captured_at: Utc::now(),
        };

        tracing::debug!(
            width,
            height,
            encoded_bytes = still.bytes.len(),
            fingerprint = %still.fingerprint_hex(),
            "still frame encoded"
        );
        Ok(still)
    }

    /// Encoded image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> StillFormat {
        self.format
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// SHA-256 of the encoded bytes, lowercase hex.
    pub fn fingerprint_hex(&self) -> String {
        self.fingerprint.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Decodes the stored bytes and reports the resulting dimensions.
    pub fn decoded_dimensions(&self) -> Result<(u32, u32), EncodeError> {
        let format = match self.format {
            StillFormat::Png => ImageFormat::Png,
            StillFormat::Jpeg => ImageFormat::Jpeg,
        };
        let image = image::load_from_memory_with_format(&self.bytes, format)?;
        Ok(image.dimensions())
    }

    /// Renders the still as a `data:` URL.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

impl std::fmt::Debug for StillFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StillFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("encoded_bytes", &self.bytes.len())
            .field("captured_at", &self.captured_at)
            .finish()
    }
}
