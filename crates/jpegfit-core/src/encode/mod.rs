//! JPEG encoding for the compression pipeline.
//!
//! All operations are synchronous; the encoder is called once per attempt of
//! the size-budget loop.
//!
//! # Examples
//!
//! ```ignore
//! use jpegfit_core::encode::encode_jpeg;
//!
//! let pixels = vec![128u8; 100 * 100 * 3]; // Gray image
//! let jpeg_bytes = encode_jpeg(&pixels, 100, 100, 80).unwrap();
//! println!("Encoded {} bytes", jpeg_bytes.len());
//! ```

mod jpeg;

pub use jpeg::{encode_jpeg, EncodeError, MAX_QUALITY, MIN_QUALITY};
