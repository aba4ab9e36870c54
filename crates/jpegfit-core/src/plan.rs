//! The degradation plan: how quality and dimensions step down between
//! attempts.
//!
//! Quality is reduced first, one `quality_step` at a time, until it reaches
//! `quality_floor`. Only then do the dimensions shrink by `shrink_factor`
//! per attempt, until the longer edge reaches `dimension_floor`. A single
//! step never changes both, so quality and dimensions are each
//! non-increasing across the sequence.

use serde::{Deserialize, Serialize};

use crate::decode::{fit_scale, scale_dimensions, FilterType};
use crate::encode::{MAX_QUALITY, MIN_QUALITY};
use crate::error::ConfigError;

pub const DEFAULT_START_QUALITY: u8 = 80;
pub const DEFAULT_QUALITY_FLOOR: u8 = 30;
pub const DEFAULT_QUALITY_STEP: u8 = 10;
pub const DEFAULT_DIMENSION_CAP: u32 = 1600;
pub const DEFAULT_DIMENSION_FLOOR: u32 = 200;
pub const DEFAULT_SHRINK_FACTOR: f64 = 0.8;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// Maximum output box. Sources larger than this are scaled down into it;
/// smaller sources are left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionCap {
    pub width: u32,
    pub height: u32,
}

impl DimensionCap {
    pub fn square(edge: u32) -> Self {
        Self {
            width: edge,
            height: edge,
        }
    }
}

/// Parameters of the quality/dimension search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DegradationPlan {
    /// Quality of the first attempt (1-100).
    pub start_quality: u8,
    /// Lowest quality used before dimensions start shrinking (1-100).
    pub quality_floor: u8,
    /// Amount quality drops per attempt.
    pub quality_step: u8,
    /// Output box applied before the first attempt.
    pub start_dimension_cap: DimensionCap,
    /// Smallest longer-edge length, in pixels, dimensions shrink to.
    pub dimension_floor: u32,
    /// Multiplier applied to both dimensions per shrinking attempt.
    pub shrink_factor: f64,
    /// Hard ceiling on encode attempts.
    pub max_attempts: u32,
    /// Resampling filter.
    pub filter: FilterType,
}

impl Default for DegradationPlan {
    fn default() -> Self {
        Self {
            start_quality: DEFAULT_START_QUALITY,
            quality_floor: DEFAULT_QUALITY_FLOOR,
            quality_step: DEFAULT_QUALITY_STEP,
            start_dimension_cap: DimensionCap::square(DEFAULT_DIMENSION_CAP),
            dimension_floor: DEFAULT_DIMENSION_FLOOR,
            shrink_factor: DEFAULT_SHRINK_FACTOR,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            filter: FilterType::default(),
        }
    }
}

impl DegradationPlan {
    /// Check every parameter for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("start", self.start_quality),
            ("floor", self.quality_floor),
        ] {
            if !(MIN_QUALITY..=MAX_QUALITY).contains(&value) {
                return Err(ConfigError::QualityOutOfRange { name, value });
            }
        }
        if self.quality_floor > self.start_quality {
            return Err(ConfigError::QualityFloorAboveStart {
                floor: self.quality_floor,
                start: self.start_quality,
            });
        }
        if self.quality_step == 0 {
            return Err(ConfigError::ZeroQualityStep);
        }
        if !(self.shrink_factor > 0.0 && self.shrink_factor < 1.0) {
            return Err(ConfigError::InvalidShrinkFactor(self.shrink_factor));
        }
        if self.dimension_floor == 0 {
            return Err(ConfigError::ZeroDimensionFloor);
        }
        let cap = self.start_dimension_cap;
        if cap.width < self.dimension_floor || cap.height < self.dimension_floor {
            return Err(ConfigError::CapBelowFloor {
                width: cap.width,
                height: cap.height,
                floor: self.dimension_floor,
            });
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroMaxAttempts);
        }
        Ok(())
    }

    /// Parameters of the first attempt for a `width x height` source.
    pub fn initial(&self, width: u32, height: u32) -> AttemptParams {
        let cap = self.start_dimension_cap;
        let scale = fit_scale(width, height, cap.width, cap.height);
        let (w, h) = scale_dimensions(width, height, scale);
        AttemptParams {
            width: w,
            height: h,
            quality: self.start_quality,
            scale,
        }
    }

    /// Parameters of the attempt following `current`, or `None` when both
    /// quality and dimensions are already at their floors.
    pub fn next(&self, width: u32, height: u32, current: &AttemptParams) -> Option<Step> {
        if current.quality > self.quality_floor {
            let quality = current
                .quality
                .saturating_sub(self.quality_step)
                .max(self.quality_floor);
            let params = AttemptParams {
                quality,
                ..*current
            };
            return Some(Step {
                params,
                degradation: Degradation::Quality {
                    from: current.quality,
                    to: quality,
                },
            });
        }

        let long_edge = width.max(height) as f64;
        let floor_scale = (self.dimension_floor as f64 / long_edge).min(1.0);
        let scale = (current.scale * self.shrink_factor).max(floor_scale);
        if scale >= current.scale {
            return None;
        }

        let (w, h) = scale_dimensions(width, height, scale);
        if (w, h) == (current.width, current.height) {
            return None;
        }

        Some(Step {
            params: AttemptParams {
                width: w,
                height: h,
                quality: current.quality,
                scale,
            },
            degradation: Degradation::Dimensions {
                from: (current.width, current.height),
                to: (w, h),
            },
        })
    }

    /// The full attempt sequence for a `width x height` source, at most
    /// `max_attempts` long.
    pub fn steps(&self, width: u32, height: u32) -> PlanSteps<'_> {
        PlanSteps {
            plan: self,
            source: (width, height),
            pending: Some((self.initial(width, height), None)),
            remaining: self.max_attempts,
        }
    }
}

/// Encode parameters for one attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptParams {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    /// Scale relative to the source dimensions.
    pub scale: f64,
}

/// What changed between two consecutive attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Degradation {
    Quality { from: u8, to: u8 },
    Dimensions { from: (u32, u32), to: (u32, u32) },
}

/// A planned attempt together with the degradation that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub params: AttemptParams,
    pub degradation: Degradation,
}

/// Iterator over the planned attempts for one source image.
///
/// Yields the attempt parameters and, for every attempt but the first, the
/// degradation applied to reach it.
#[derive(Debug)]
pub struct PlanSteps<'a> {
    plan: &'a DegradationPlan,
    source: (u32, u32),
    pending: Option<(AttemptParams, Option<Degradation>)>,
    remaining: u32,
}

impl Iterator for PlanSteps<'_> {
    type Item = (AttemptParams, Option<Degradation>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.pending.take()?;
        self.remaining -= 1;

        let (width, height) = self.source;
        self.pending = self
            .plan
            .next(width, height, &current.0)
            .map(|step| (step.params, Some(step.degradation)));

        Some(current)
    }
}
