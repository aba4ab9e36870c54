//! Aspect-preserving dimension math and resampling.
//!
//! Every function here keeps the source aspect ratio; nothing stretches.

use std::borrow::Cow;

use super::{DecodeError, FilterType, SourceImage};

/// Resample a source image to the given dimensions.
///
/// Returns the RGB pixel buffer at the target size. When the target equals the
/// source size the source pixels are borrowed as-is.
///
/// # Errors
///
/// Returns `DecodeError::EmptyImage` for a zero target dimension and
/// `DecodeError::CorruptedFile` if the source buffer does not match its
/// declared size.
pub fn resample(
    image: &SourceImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<Cow<'_, [u8]>, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage { width, height });
    }

    if image.width == width && image.height == height {
        return Ok(Cow::Borrowed(&image.pixels));
    }

    let view = image
        .view()
        .ok_or_else(|| DecodeError::CorruptedFile("Pixel buffer size mismatch".to_string()))?;

    let resized = image::imageops::resize(&view, width, height, filter.to_image_filter());
    Ok(Cow::Owned(resized.into_raw()))
}

/// Clamp `width x height` into a `cap_width x cap_height` box, preserving
/// aspect ratio.
///
/// The cap is a ceiling, not a target: images that already fit are returned
/// unchanged and never upscaled.
pub fn fit_within(width: u32, height: u32, cap_width: u32, cap_height: u32) -> (u32, u32) {
    scale_dimensions(width, height, fit_scale(width, height, cap_width, cap_height))
}

/// The scale factor (at most 1.0) that fits `width x height` inside the cap.
pub fn fit_scale(width: u32, height: u32, cap_width: u32, cap_height: u32) -> f64 {
    if width == 0 || height == 0 {
        return 1.0;
    }
    let scale_w = cap_width as f64 / width as f64;
    let scale_h = cap_height as f64 / height as f64;
    scale_w.min(scale_h).min(1.0)
}

/// Scale both dimensions by `scale`, rounding to the nearest pixel.
///
/// Neither side drops below 1 pixel.
pub fn scale_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    let w = ((width as f64 * scale).round() as u32).max(1);
    let h = ((height as f64 * scale).round() as u32).max(1);
    (w.min(width), h.min(height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::SourceFormat;

    fn create_test_image(width: u32, height: u32) -> SourceImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 255) / width.max(1)) as u8);
                pixels.push(((y * 255) / height.max(1)) as u8);
                pixels.push(128);
            }
        }
        SourceImage::new(width, height, SourceFormat::Png, pixels)
    }

    #[test]
    fn test_resample_basic() {
        let img = create_test_image(100, 50);
        let resized = resample(&img, 50, 25, FilterType::Bilinear).unwrap();
        assert_eq!(resized.len(), 50 * 25 * 3);
        assert!(matches!(resized, Cow::Owned(_)));
    }

    #[test]
    fn test_resample_same_dimensions_borrows() {
        let img = create_test_image(100, 50);
        let resized = resample(&img, 100, 50, FilterType::Bilinear).unwrap();
        assert!(matches!(resized, Cow::Borrowed(_)));
        assert_eq!(resized.len(), img.pixels.len());
    }

    #[test]
    fn test_resample_zero_dimensions_error() {
        let img = create_test_image(100, 50);
        assert!(resample(&img, 0, 50, FilterType::Bilinear).is_err());
        assert!(resample(&img, 50, 0, FilterType::Lanczos3).is_err());
    }

    #[test]
    fn test_resample_all_filters() {
        let img = create_test_image(60, 40);
        for filter in [FilterType::Bilinear, FilterType::Bicubic, FilterType::Lanczos3] {
            let resized = resample(&img, 30, 20, filter).unwrap();
            assert_eq!(resized.len(), 30 * 20 * 3);
        }
    }

    #[test]
    fn test_fit_within_landscape() {
        assert_eq!(fit_within(3000, 2000, 1600, 1600), (1600, 1067));
    }

    #[test]
    fn test_fit_within_portrait() {
        assert_eq!(fit_within(2000, 3000, 1600, 1600), (1067, 1600));
    }

    #[test]
    fn test_fit_within_square() {
        assert_eq!(fit_within(4000, 4000, 1600, 1600), (1600, 1600));
    }

    #[test]
    fn test_fit_within_already_smaller_is_not_upscaled() {
        assert_eq!(fit_within(800, 600, 1600, 1600), (800, 600));
    }

    #[test]
    fn test_fit_within_non_square_cap() {
        // Height is the binding side of a 1600x900 box.
        assert_eq!(fit_within(1920, 1080, 1600, 900), (1600, 900));
        assert_eq!(fit_within(1000, 1000, 1600, 900), (900, 900));
    }

    #[test]
    fn test_scale_dimensions_never_zero() {
        assert_eq!(scale_dimensions(1000, 2, 0.1), (100, 1));
        assert_eq!(scale_dimensions(0, 0, 0.5), (0, 0));
    }

    #[test]
    fn test_scale_dimensions_preserves_aspect() {
        let (w, h) = scale_dimensions(1600, 1067, 0.8);
        assert_eq!((w, h), (1280, 854));
        let ratio = w as f64 / h as f64;
        assert!((ratio - 1600.0 / 1067.0).abs() < 0.01);
    }
}
