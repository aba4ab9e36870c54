//! Error taxonomy for the compression pipeline.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;

/// Invalid budget or degradation parameters.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Size budget must set a raw or an encoded byte limit")]
    NoBudgetLimit,

    #[error("Quality {name} must be within 1..=100, got {value}")]
    QualityOutOfRange { name: &'static str, value: u8 },

    #[error("Quality floor ({floor}) must not exceed start quality ({start})")]
    QualityFloorAboveStart { floor: u8, start: u8 },

    #[error("Quality step must be at least 1")]
    ZeroQualityStep,

    #[error("Shrink factor must be within (0, 1), got {0}")]
    InvalidShrinkFactor(f64),

    #[error("Dimension floor must be non-zero")]
    ZeroDimensionFloor,

    #[error("Dimension cap {width}x{height} must be at least the dimension floor ({floor})")]
    CapBelowFloor { width: u32, height: u32, floor: u32 },

    #[error("Max attempts must be at least 1")]
    ZeroMaxAttempts,
}

/// Errors surfaced by [`crate::SizeBudgetEncoder`].
#[derive(Debug, Error)]
pub enum CompressError {
    /// The input is not a decodable raster image. Never retried.
    #[error("Could not decode image: {0}")]
    Decode(#[from] DecodeError),

    /// The JPEG backend failed. Fatal for the request.
    #[error("Could not encode image: {0}")]
    Encode(#[from] EncodeError),

    /// The budget or plan parameters are invalid.
    #[error("Invalid compression settings: {0}")]
    Config(#[from] ConfigError),

    /// Every attempt the plan allows still exceeds the budget.
    #[error(
        "Image cannot be reduced enough: {last_size} bytes after {attempts} attempts, \
         limit is {limit} bytes"
    )]
    BudgetUnreachable {
        attempts: u32,
        last_size: u64,
        limit: u64,
    },

    /// The caller abandoned the request between attempts.
    #[error("Compression cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}

impl CompressError {
    /// Short, stable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CompressError::Decode(_) => "DecodeError",
            CompressError::Encode(_) => "EncodeError",
            CompressError::Config(_) => "ConfigError",
            CompressError::BudgetUnreachable { .. } => "BudgetUnreachable",
            CompressError::Cancelled { .. } => "Cancelled",
        }
    }
}
