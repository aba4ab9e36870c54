//! Helpers for handing compressed output to a transport.
//!
//! The output is always JPEG; callers choose between sending the raw bytes
//! or a base64 string.

use base64::{engine::general_purpose::STANDARD, Engine};

/// Content type of every compressed output.
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Standard, padded base64 of `bytes`.
///
/// The result length always equals
/// [`projected_base64_len`](crate::budget::projected_base64_len) of the input.
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// A `data:image/jpeg;base64,...` URL for `bytes`.
pub fn to_data_url(bytes: &[u8]) -> String {
    format!("data:{};base64,{}", JPEG_CONTENT_TYPE, to_base64(bytes))
}
