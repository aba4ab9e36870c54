//! The size-budget encoder: resample, encode, measure, degrade, repeat.
//!
//! Each call is self-contained. The loop does no I/O and holds no state
//! between calls, so one encoder can serve concurrent requests.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::budget::SizeBudget;
use crate::decode::{decode_image, resample, SourceFormat, SourceImage};
use crate::encode::encode_jpeg;
use crate::error::{CompressError, ConfigError};
use crate::plan::{AttemptParams, Degradation, DegradationPlan};
use crate::transport;

/// What to do when the plan runs out before the budget is met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BudgetPolicy {
    /// Fail with [`CompressError::BudgetUnreachable`].
    #[default]
    Reject,
    /// Return the last attempt with `within_budget == false`.
    BestEffort,
}

/// One encode of the source at fixed dimensions and quality.
#[derive(Debug, Clone)]
pub struct EncodeAttempt {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub bytes: Vec<u8>,
}

impl EncodeAttempt {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Summary of an attempt, kept after its bytes are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub byte_len: u64,
    pub projected_len: u64,
    pub within_budget: bool,
    /// How this attempt differs from the previous one.
    pub degradation: Option<Degradation>,
}

/// The output of a compression request.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    /// JPEG bytes.
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub source_format: SourceFormat,
    /// False only for best-effort results that still exceed the budget.
    pub within_budget: bool,
    pub attempts: Vec<AttemptRecord>,
}

impl CompressedImage {
    pub fn byte_len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Exact size of [`Self::to_base64`].
    pub fn projected_base64_len(&self) -> u64 {
        crate::budget::projected_base64_len(self.byte_len())
    }

    pub fn to_base64(&self) -> String {
        transport::to_base64(&self.bytes)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Compresses images into JPEGs that fit a [`SizeBudget`].
///
/// # Algorithm
///
/// 1. Decode the input (decode errors are returned immediately).
/// 2. Clamp the dimensions into the plan's cap and start at its quality.
/// 3. For at most `max_attempts` attempts: resample, encode, measure against
///    every budget limit, and return on the first fit. Otherwise degrade
///    quality down to its floor, then dimensions down to theirs.
/// 4. If the plan runs out, apply the [`BudgetPolicy`].
#[derive(Debug, Clone, Default)]
pub struct SizeBudgetEncoder {
    plan: DegradationPlan,
    policy: BudgetPolicy,
}

impl SizeBudgetEncoder {
    /// Create an encoder for a validated plan.
    pub fn new(plan: DegradationPlan) -> Result<Self, ConfigError> {
        plan.validate()?;
        Ok(Self {
            plan,
            policy: BudgetPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: BudgetPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn plan(&self) -> &DegradationPlan {
        &self.plan
    }

    pub fn policy(&self) -> BudgetPolicy {
        self.policy
    }

    /// Decode `input` and compress it into `budget`.
    pub fn compress(
        &self,
        input: &[u8],
        budget: &SizeBudget,
    ) -> Result<CompressedImage, CompressError> {
        self.compress_with_cancel(input, budget, || false)
    }

    /// Like [`Self::compress`], but polls `is_cancelled` before every attempt.
    ///
    /// Cancellation is only observed between attempts, never during a
    /// resample or encode.
    pub fn compress_with_cancel<F>(
        &self,
        input: &[u8],
        budget: &SizeBudget,
        is_cancelled: F,
    ) -> Result<CompressedImage, CompressError>
    where
        F: Fn() -> bool,
    {
        budget.validate()?;
        let source = decode_image(input)?;
        debug!(
            width = source.width,
            height = source.height,
            format = ?source.format,
            input_len = input.len(),
            "decoded source image"
        );
        self.run(&source, budget, &is_cancelled)
    }

    /// Compress an already decoded image.
    pub fn compress_decoded(
        &self,
        source: &SourceImage,
        budget: &SizeBudget,
    ) -> Result<CompressedImage, CompressError> {
        budget.validate()?;
        self.run(source, budget, &|| false)
    }

    fn run(
        &self,
        source: &SourceImage,
        budget: &SizeBudget,
        is_cancelled: &dyn Fn() -> bool,
    ) -> Result<CompressedImage, CompressError> {
        if source.is_empty() {
            return Err(crate::decode::DecodeError::EmptyImage {
                width: source.width,
                height: source.height,
            }
            .into());
        }

        let mut records: Vec<AttemptRecord> = Vec::new();
        let mut last: Option<EncodeAttempt> = None;

        for (params, degradation) in self.plan.steps(source.width, source.height) {
            if is_cancelled() {
                debug!(attempts = records.len(), "compression cancelled");
                return Err(CompressError::Cancelled {
                    attempts: records.len() as u32,
                });
            }

            let attempt = self.attempt(source, &params)?;
            let check = budget.check(attempt.size());
            debug!(
                attempt = records.len() + 1,
                width = attempt.width,
                height = attempt.height,
                quality = attempt.quality,
                byte_len = check.raw_len,
                projected_len = check.projected_len,
                fits = check.fits,
                "encode attempt"
            );

            records.push(AttemptRecord {
                width: attempt.width,
                height: attempt.height,
                quality: attempt.quality,
                byte_len: check.raw_len,
                projected_len: check.projected_len,
                within_budget: check.fits,
                degradation,
            });

            if check.fits {
                return Ok(finish(attempt, source.format, true, records));
            }
            last = Some(attempt);
        }

        // The plan always yields at least one attempt.
        let Some(last) = last else {
            return Err(ConfigError::ZeroMaxAttempts.into());
        };

        let limit = budget.effective_raw_limit().unwrap_or(0);
        match self.policy {
            BudgetPolicy::Reject => Err(CompressError::BudgetUnreachable {
                attempts: records.len() as u32,
                last_size: last.size(),
                limit,
            }),
            BudgetPolicy::BestEffort => {
                warn!(
                    attempts = records.len(),
                    byte_len = last.size(),
                    limit,
                    "returning over-budget image"
                );
                Ok(finish(last, source.format, false, records))
            }
        }
    }

    fn attempt(
        &self,
        source: &SourceImage,
        params: &AttemptParams,
    ) -> Result<EncodeAttempt, CompressError> {
        let pixels = resample(source, params.width, params.height, self.plan.filter)?;
        let bytes = encode_jpeg(&pixels, params.width, params.height, params.quality)?;
        Ok(EncodeAttempt {
            width: params.width,
            height: params.height,
            quality: params.quality,
            bytes,
        })
    }
}

fn finish(
    attempt: EncodeAttempt,
    source_format: SourceFormat,
    within_budget: bool,
    attempts: Vec<AttemptRecord>,
) -> CompressedImage {
    CompressedImage {
        width: attempt.width,
        height: attempt.height,
        quality: attempt.quality,
        bytes: attempt.bytes,
        source_format,
        within_budget,
        attempts,
    }
}
