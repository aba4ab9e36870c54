//! Image decoding and resampling for the compression pipeline.
//!
//! This module provides functionality for:
//! - Decoding JPEG, PNG and WebP input into an upright RGB buffer
//! - Aspect-preserving dimension math (cap clamping, shrink steps)
//! - Resampling with quality-preserving filters
//!
//! # Examples
//!
//! ```ignore
//! use jpegfit_core::decode::{decode_image, fit_within};
//!
//! let bytes = std::fs::read("palm.png").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! let (w, h) = fit_within(image.width, image.height, 1600, 1600);
//! ```

mod raster;
mod resize;
mod types;

pub use raster::decode_image;
pub use resize::{fit_scale, fit_within, resample, scale_dimensions};
pub use types::{DecodeError, FilterType, Orientation, SourceFormat, SourceImage};
