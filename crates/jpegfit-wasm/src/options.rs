//! Options accepted from JavaScript as a plain object.

use jpegfit_core::{BudgetPolicy, DegradationPlan, SizeBudget};
use serde::Deserialize;

/// Compression options.
///
/// Every field is optional:
///
/// ```typescript
/// {
///   rawByteLimit?: number,
///   encodedByteLimit?: number,      // defaults to 4 MiB when neither limit is set
///   plan?: { startQuality?: number, qualityFloor?: number, maxAttempts?: number, ... },
///   bestEffort?: boolean,
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct CompressOptions {
    pub raw_byte_limit: Option<u64>,
    pub encoded_byte_limit: Option<u64>,
    pub plan: DegradationPlan,
    pub best_effort: bool,
}

impl CompressOptions {
    pub fn budget(&self) -> SizeBudget {
        match (self.raw_byte_limit, self.encoded_byte_limit) {
            (None, None) => SizeBudget::default(),
            (raw, encoded) => SizeBudget {
                raw_byte_limit: raw,
                encoded_byte_limit: encoded,
            },
        }
    }

    pub fn policy(&self) -> BudgetPolicy {
        if self.best_effort {
            BudgetPolicy::BestEffort
        } else {
            BudgetPolicy::Reject
        }
    }
}
