//! Caller-side upload checks, run before the encoder sees any bytes.
//!
//! The encoder itself accepts anything decodable; size ceilings and content
//! type allow-lists belong to whoever receives the upload.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::budget::MIB;
use crate::decode::SourceFormat;

/// Default upload ceiling (10 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 10 * MIB;

/// Reasons an upload is refused before compression.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("No image data was provided")]
    Empty,

    #[error("Image is {size} bytes, the maximum is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    #[error("Only JPEG, PNG and WebP images are accepted (got {0})")]
    UnsupportedType(String),
}

/// Limits applied to incoming uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntakeLimits {
    pub max_input_bytes: u64,
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

/// Detect an accepted format from the leading magic bytes.
pub fn sniff_format(bytes: &[u8]) -> Option<SourceFormat> {
    image::guess_format(bytes)
        .ok()
        .and_then(SourceFormat::from_image_format)
}

/// Check an upload's size and type.
///
/// `declared_type` is the client-supplied MIME type, if any. A declared type
/// must be one of the accepted formats. The returned format is sniffed from
/// the bytes, falling back to the declared type when sniffing finds nothing.
pub fn validate_upload(
    bytes: &[u8],
    declared_type: Option<&str>,
    limits: &IntakeLimits,
) -> Result<SourceFormat, IntakeError> {
    if bytes.is_empty() {
        return Err(IntakeError::Empty);
    }

    let size = bytes.len() as u64;
    if size > limits.max_input_bytes {
        return Err(IntakeError::TooLarge {
            size,
            limit: limits.max_input_bytes,
        });
    }

    let declared = match declared_type.filter(|t| !t.trim().is_empty()) {
        Some(mime) => Some(
            SourceFormat::from_mime_type(mime)
                .ok_or_else(|| IntakeError::UnsupportedType(mime.to_string()))?,
        ),
        None => None,
    };

    sniff_format(bytes)
        .or(declared)
        .ok_or_else(|| IntakeError::UnsupportedType("unknown".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\x0dIHDR";
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn test_declared_type_accepted() {
        let limits = IntakeLimits::default();
        assert_eq!(
            validate_upload(PNG_MAGIC, Some("image/png"), &limits),
            Ok(SourceFormat::Png)
        );
        assert_eq!(
            validate_upload(b"opaque payload", Some("image/webp"), &limits),
            Ok(SourceFormat::WebP)
        );
    }

    #[test]
    fn test_sniffed_format_wins_over_declared() {
        let limits = IntakeLimits::default();
        assert_eq!(
            validate_upload(JPEG_MAGIC, Some("image/webp"), &limits),
            Ok(SourceFormat::Jpeg)
        );
        assert_eq!(
            validate_upload(PNG_MAGIC, Some("image/jpeg"), &limits),
            Ok(SourceFormat::Png)
        );
    }

    #[test]
    fn test_declared_type_rejected() {
        let result = validate_upload(PNG_MAGIC, Some("image/gif"), &IntakeLimits::default());
        assert_eq!(result, Err(IntakeError::UnsupportedType("image/gif".into())));
    }

    #[test]
    fn test_sniffed_when_undeclared() {
        let limits = IntakeLimits::default();
        assert_eq!(validate_upload(JPEG_MAGIC, None, &limits), Ok(SourceFormat::Jpeg));
        assert_eq!(validate_upload(PNG_MAGIC, Some(""), &limits), Ok(SourceFormat::Png));
        assert!(matches!(
            validate_upload(b"hello world", None, &limits),
            Err(IntakeError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_size_ceiling() {
        let limits = IntakeLimits { max_input_bytes: 8 };
        assert_eq!(
            validate_upload(PNG_MAGIC, Some("image/png"), &limits),
            Err(IntakeError::TooLarge {
                size: PNG_MAGIC.len() as u64,
                limit: 8
            })
        );
    }

    #[test]
    fn test_empty_upload() {
        assert_eq!(
            validate_upload(&[], Some("image/png"), &IntakeLimits::default()),
            Err(IntakeError::Empty)
        );
    }

    #[test]
    fn test_default_limit_is_ten_mib() {
        assert_eq!(IntakeLimits::default().max_input_bytes, 10 * 1024 * 1024);
    }
}
