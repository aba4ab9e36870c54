//! jpegfit Core - size-budget JPEG compression
//!
//! This crate turns arbitrary JPEG, PNG or WebP uploads into a JPEG that fits
//! under a raw byte ceiling and/or under a ceiling on its base64 form. It
//! searches over encode quality first and pixel dimensions second, with a
//! hard attempt limit so every call terminates.
//!
//! # Examples
//!
//! ```ignore
//! use jpegfit_core::{compress, SizeBudget};
//!
//! let upload = std::fs::read("palm.png").unwrap();
//! let jpeg = compress(&upload, &SizeBudget::encoded(4 * 1024 * 1024)).unwrap();
//! ```

pub mod budget;
pub mod decode;
pub mod encode;
pub mod encoder;
pub mod error;
pub mod intake;
pub mod plan;
pub mod transport;

pub use budget::{projected_base64_len, SizeBudget};
pub use decode::{DecodeError, FilterType, SourceFormat, SourceImage};
pub use encode::EncodeError;
pub use encoder::{AttemptRecord, BudgetPolicy, CompressedImage, EncodeAttempt, SizeBudgetEncoder};
pub use error::{CompressError, ConfigError};
pub use intake::{validate_upload, IntakeError, IntakeLimits};
pub use plan::{Degradation, DegradationPlan, DimensionCap};

/// Compress `input` into `budget` with the default plan, rejecting inputs
/// that cannot be made to fit.
pub fn compress(input: &[u8], budget: &SizeBudget) -> Result<Vec<u8>, CompressError> {
    SizeBudgetEncoder::default()
        .compress(input, budget)
        .map(CompressedImage::into_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_rejects_garbage() {
        let result = compress(&[0x00, 0x01, 0x02], &SizeBudget::default());
        assert!(matches!(result, Err(CompressError::Decode(_))));
    }

    #[test]
    fn test_compress_returns_jpeg() {
        let img = image::RgbImage::from_pixel(20, 10, image::Rgb([200, 100, 50]));
        let mut png = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut png, image::ImageFormat::Png)
            .unwrap();

        let jpeg = compress(&png.into_inner(), &SizeBudget::default()).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
    }
}
