//! Raster decoding with format detection, EXIF orientation handling and
//! alpha flattening.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{imageops, DynamicImage, ImageError, ImageReader, RgbImage, Rgba, RgbaImage};
use tracing::debug;

use super::{DecodeError, Orientation, SourceFormat, SourceImage};

/// Decode JPEG, PNG or WebP bytes into an upright RGB [`SourceImage`].
///
/// EXIF orientation is applied so phone photos come out the right way up.
/// Transparent pixels are composited onto white, since the output is JPEG.
///
/// # Errors
///
/// - `DecodeError::InvalidFormat` if the bytes are not a recognizable image
/// - `DecodeError::UnsupportedFormat` for images that are not JPEG/PNG/WebP
/// - `DecodeError::CorruptedFile` if decoding fails part way
/// - `DecodeError::EmptyImage` if the image has a zero dimension
pub fn decode_image(bytes: &[u8]) -> Result<SourceImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let format = match reader.format() {
        Some(detected) => SourceFormat::from_image_format(detected)
            .ok_or_else(|| DecodeError::UnsupportedFormat(format!("{:?}", detected)))?,
        None => return Err(DecodeError::InvalidFormat),
    };

    let img = reader.decode().map_err(map_image_error)?;

    if img.width() == 0 || img.height() == 0 {
        return Err(DecodeError::EmptyImage {
            width: img.width(),
            height: img.height(),
        });
    }

    let orientation = extract_orientation(bytes);
    if orientation != Orientation::Normal {
        let (width, height) = if orientation.swaps_dimensions() {
            (img.height(), img.width())
        } else {
            (img.width(), img.height())
        };
        debug!(?orientation, width, height, "applying exif orientation");
    }

    let oriented = apply_orientation(img, orientation);
    Ok(SourceImage::from_rgb_image(flatten_to_rgb(oriented), format))
}

fn map_image_error(err: ImageError) -> DecodeError {
    match err {
        ImageError::Limits(_) => DecodeError::OutOfMemory,
        ImageError::Unsupported(e) => DecodeError::UnsupportedFormat(e.to_string()),
        other => DecodeError::CorruptedFile(other.to_string()),
    }
}

/// Extract EXIF orientation from the container.
///
/// Returns `Orientation::Normal` if no EXIF data is found.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

/// Convert to RGB8, blending any alpha channel over a white background.
fn flatten_to_rgb(img: DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.into_rgb8();
    }

    let rgba = img.into_rgba8();
    let mut canvas = RgbaImage::from_pixel(rgba.width(), rgba.height(), Rgba([255, 255, 255, 255]));
    imageops::overlay(&mut canvas, &rgba, 0, 0);
    DynamicImage::ImageRgba8(canvas).into_rgb8()
}
