//! jpegfit WASM - WebAssembly bindings for jpegfit
//!
//! This crate exposes the size-budget compression pipeline to browser code,
//! so uploads can be shrunk client-side with exactly the same policy the
//! server applies.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for compressed output
//! - `options` - Plain-object options accepted from JavaScript
//! - `compress` - Compression, projection and upload validation bindings
//!
//! # Usage
//!
//! ```typescript
//! import init, { compress_image } from '@jpegfit/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = compress_image(bytes, { encodedByteLimit: 4 * 1024 * 1024 });
//! const blob = new Blob([result.bytes()], { type: 'image/jpeg' });
//! ```

use wasm_bindgen::prelude::*;

mod compress;
mod options;
mod types;

pub use compress::{compress_image, compress_image_to_base64, projected_base64_len, validate_upload};
pub use types::JsCompressedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
