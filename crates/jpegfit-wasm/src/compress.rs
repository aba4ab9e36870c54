//! Compression WASM bindings.
//!
//! # Functions
//!
//! - [`compress_image`] - Compress an upload into a size budget
//! - [`compress_image_to_base64`] - Same, returning the base64 payload directly
//! - [`projected_base64_len`] - Exact base64 size of a byte count
//! - [`validate_upload`] - Caller-side size and type checks
//!
//! # Example
//!
//! ```typescript
//! import { validate_upload, compress_image } from '@jpegfit/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! validate_upload(bytes, file.type);                  // throws on >10 MiB or non-image
//! try {
//!   const result = compress_image(bytes, { encodedByteLimit: 4 * 1024 * 1024 });
//!   upload(result.toBase64());
//! } catch (e) {
//!   if (e.name === 'BudgetUnreachable') showError('Image cannot be reduced enough');
//! }
//! ```

use jpegfit_core::{intake, CompressError, IntakeLimits, SizeBudgetEncoder};
use wasm_bindgen::prelude::*;

use crate::options::CompressOptions;
use crate::types::JsCompressedImage;

/// Compress image bytes (JPEG, PNG or WebP) into a JPEG within budget.
///
/// # Arguments
///
/// * `bytes` - The uploaded file bytes as a `Uint8Array`
/// * `options` - Optional options object (see `CompressOptions`); `undefined`
///   uses a 4 MiB base64 budget and the default plan
///
/// # Errors
///
/// Throws an `Error` whose `name` is one of `DecodeError`, `EncodeError`,
/// `ConfigError`, `BudgetUnreachable` or `OptionsError`.
#[wasm_bindgen]
pub fn compress_image(bytes: &[u8], options: JsValue) -> Result<JsCompressedImage, JsValue> {
    let options = parse_options(options)?;
    let encoder = SizeBudgetEncoder::new(options.plan.clone())
        .map_err(|e| js_error("ConfigError", &e.to_string()))?
        .with_policy(options.policy());

    let compressed = encoder
        .compress(bytes, &options.budget())
        .map_err(compress_error)?;

    if !compressed.within_budget {
        web_sys::console::warn_1(&JsValue::from_str(&format!(
            "jpegfit: returning {} byte image that exceeds the size budget",
            compressed.bytes.len()
        )));
    }

    Ok(JsCompressedImage::from_compressed(compressed))
}

/// Compress image bytes and return the JPEG as a base64 string.
#[wasm_bindgen]
pub fn compress_image_to_base64(bytes: &[u8], options: JsValue) -> Result<String, JsValue> {
    compress_image(bytes, options).map(|image| image.to_base64())
}

/// Exact number of characters `byte_length` bytes occupy once base64 encoded.
#[wasm_bindgen]
pub fn projected_base64_len(byte_length: u32) -> f64 {
    jpegfit_core::projected_base64_len(byte_length as u64) as f64
}

/// Check an upload before compressing it.
///
/// # Arguments
///
/// * `bytes` - The uploaded file bytes
/// * `mime_type` - The browser-reported MIME type (`file.type`), if any
/// * `max_bytes` - Upload ceiling; defaults to 10 MiB
///
/// # Returns
///
/// The detected format name (`"jpeg"`, `"png"` or `"webp"`); throws an
/// `IntakeError` otherwise.
#[wasm_bindgen]
pub fn validate_upload(
    bytes: &[u8],
    mime_type: Option<String>,
    max_bytes: Option<u32>,
) -> Result<String, JsValue> {
    let limits = max_bytes
        .map(|max| IntakeLimits {
            max_input_bytes: max as u64,
        })
        .unwrap_or_default();

    intake::validate_upload(bytes, mime_type.as_deref(), &limits)
        .map(|format| format.mime_type().trim_start_matches("image/").to_string())
        .map_err(|e| js_error("IntakeError", &e.to_string()))
}

fn parse_options(options: JsValue) -> Result<CompressOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(CompressOptions::default());
    }
    serde_wasm_bindgen::from_value(options)
        .map_err(|e| js_error("OptionsError", &format!("Invalid options: {}", e)))
}

fn compress_error(err: CompressError) -> JsValue {
    js_error(err.kind(), &err.to_string())
}

/// A JS `Error` with its `name` set to the error kind.
fn js_error(name: &str, message: &str) -> JsValue {
    let error = js_sys::Error::new(message);
    error.set_name(name);
    error.into()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projected_base64_len() {
        assert_eq!(projected_base64_len(3072), 4096.0);
        assert_eq!(projected_base64_len(3073), 4100.0);
    }
}
