//! Baseline JPEG encoding via the `image` crate.
//!
//! Quality is on the 1-100 integer scale everywhere in this crate.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use thiserror::Error;

/// Lowest JPEG quality the encoder accepts.
pub const MIN_QUALITY: u8 = 1;
/// Highest JPEG quality the encoder accepts.
pub const MAX_QUALITY: u8 = 100;

/// Errors that can occur during JPEG encoding.
///
/// These indicate a backend fault rather than a size problem and are never
/// retried with different parameters.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// JPEG encoding failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),

    /// The encoder finished without producing any bytes
    #[error("JPEG encoder produced no output")]
    EmptyOutput,
}

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality, clamped to `MIN_QUALITY..=MAX_QUALITY`
///
/// Output is deterministic: the same pixels and quality always produce the
/// same bytes.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let quality = quality.clamp(MIN_QUALITY, MAX_QUALITY);

    let mut buffer = Vec::with_capacity(expected_len / 8);
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    if buffer.is_empty() {
        return Err(EncodeError::EmptyOutput);
    }

    Ok(buffer)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
