//! WASM-compatible wrapper types for compressed output.

use jpegfit_core::{transport, CompressedImage};
use wasm_bindgen::prelude::*;

/// A compressed JPEG and its metadata.
///
/// The JPEG bytes live in WASM memory; `bytes()` copies them out as a
/// `Uint8Array`.
#[wasm_bindgen]
pub struct JsCompressedImage {
    width: u32,
    height: u32,
    quality: u8,
    within_budget: bool,
    attempts: u32,
    source_format: String,
    bytes: Vec<u8>,
}

#[wasm_bindgen]
impl JsCompressedImage {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// JPEG quality (1-100) of the returned encode
    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// False only when `bestEffort` returned an image that is still over budget
    #[wasm_bindgen(getter, js_name = withinBudget)]
    pub fn within_budget(&self) -> bool {
        self.within_budget
    }

    /// Number of encode attempts made
    #[wasm_bindgen(getter)]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Format the input was decoded from ("jpeg", "png" or "webp")
    #[wasm_bindgen(getter, js_name = sourceFormat)]
    pub fn source_format(&self) -> String {
        self.source_format.clone()
    }

    #[wasm_bindgen(getter, js_name = byteLength)]
    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }

    /// Exact length of `toBase64()`
    #[wasm_bindgen(getter, js_name = encodedLength)]
    pub fn encoded_length(&self) -> f64 {
        jpegfit_core::projected_base64_len(self.bytes.len() as u64) as f64
    }

    /// Returns the JPEG bytes as a Uint8Array (copied).
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    #[wasm_bindgen(js_name = toBase64)]
    pub fn to_base64(&self) -> String {
        transport::to_base64(&self.bytes)
    }

    #[wasm_bindgen(js_name = toDataUrl)]
    pub fn to_data_url(&self) -> String {
        transport::to_data_url(&self.bytes)
    }

    /// Explicitly free WASM memory.
    ///
    /// Optional: wasm-bindgen's finalizer handles cleanup automatically.
    pub fn free(self) {}
}

impl JsCompressedImage {
    pub(crate) fn from_compressed(image: CompressedImage) -> Self {
        Self {
            width: image.width,
            height: image.height,
            quality: image.quality,
            within_budget: image.within_budget,
            attempts: image.attempts.len() as u32,
            source_format: format_name(image.source_format).to_string(),
            bytes: image.bytes,
        }
    }
}

fn format_name(format: jpegfit_core::SourceFormat) -> &'static str {
    match format {
        jpegfit_core::SourceFormat::Jpeg => "jpeg",
        jpegfit_core::SourceFormat::Png => "png",
        jpegfit_core::SourceFormat::WebP => "webp",
    }
}
