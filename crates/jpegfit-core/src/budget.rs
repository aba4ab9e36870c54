//! Byte budgets and exact base64 size projection.
//!
//! A [`SizeBudget`] holds two independent ceilings: one on the encoded JPEG
//! file itself and one on its base64 text form. Every configured ceiling must
//! hold for an attempt to be accepted.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One mebibyte.
pub const MIB: u64 = 1024 * 1024;

/// Default ceiling on the base64-encoded payload (4 MiB).
pub const DEFAULT_ENCODED_BYTE_LIMIT: u64 = 4 * MIB;

/// Exact number of bytes `n` raw bytes occupy once base64 encoded with
/// padding: `ceil(n / 3) * 4`.
#[inline]
pub fn projected_base64_len(n: u64) -> u64 {
    n.div_ceil(3) * 4
}

/// The largest raw byte count whose base64 form fits in `encoded_limit`.
#[inline]
pub fn max_raw_len_for_encoded(encoded_limit: u64) -> u64 {
    encoded_limit / 4 * 3
}

/// Size ceilings for a compression request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeBudget {
    /// Ceiling on the encoded JPEG file, in bytes.
    #[serde(default)]
    pub raw_byte_limit: Option<u64>,
    /// Ceiling on the base64 text form of the file, in bytes.
    #[serde(default)]
    pub encoded_byte_limit: Option<u64>,
}

impl Default for SizeBudget {
    fn default() -> Self {
        Self::encoded(DEFAULT_ENCODED_BYTE_LIMIT)
    }
}

impl SizeBudget {
    /// A budget that only constrains the raw file size.
    pub fn raw(limit: u64) -> Self {
        Self {
            raw_byte_limit: Some(limit),
            encoded_byte_limit: None,
        }
    }

    /// A budget that only constrains the projected base64 size.
    pub fn encoded(limit: u64) -> Self {
        Self {
            raw_byte_limit: None,
            encoded_byte_limit: Some(limit),
        }
    }

    /// A budget with both ceilings.
    pub fn both(raw_limit: u64, encoded_limit: u64) -> Self {
        Self {
            raw_byte_limit: Some(raw_limit),
            encoded_byte_limit: Some(encoded_limit),
        }
    }

    /// Reject budgets with no ceiling at all.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.raw_byte_limit.is_none() && self.encoded_byte_limit.is_none() {
            return Err(ConfigError::NoBudgetLimit);
        }
        Ok(())
    }

    /// The single raw-byte ceiling equivalent to every configured limit.
    ///
    /// Returns `None` when no limit is configured.
    pub fn effective_raw_limit(&self) -> Option<u64> {
        let from_encoded = self.encoded_byte_limit.map(max_raw_len_for_encoded);
        match (self.raw_byte_limit, from_encoded) {
            (Some(raw), Some(enc)) => Some(raw.min(enc)),
            (raw, enc) => raw.or(enc),
        }
    }

    /// True when the encoded-size ceiling is the stricter of the two.
    pub fn encoded_is_binding(&self) -> bool {
        match (self.raw_byte_limit, self.encoded_byte_limit) {
            (Some(raw), Some(enc)) => max_raw_len_for_encoded(enc) < raw,
            (None, Some(_)) => true,
            _ => false,
        }
    }

    /// Measure a raw byte count against every configured ceiling.
    pub fn check(&self, raw_len: u64) -> BudgetCheck {
        let projected_len = projected_base64_len(raw_len);
        let raw_ok = self.raw_byte_limit.is_none_or(|limit| raw_len <= limit);
        let encoded_ok = self
            .encoded_byte_limit
            .is_none_or(|limit| projected_len <= limit);
        BudgetCheck {
            raw_len,
            projected_len,
            fits: raw_ok && encoded_ok,
        }
    }

    /// Shorthand for `check(raw_len).fits`.
    pub fn fits(&self, raw_len: u64) -> bool {
        self.check(raw_len).fits
    }
}

/// Result of measuring one encoded artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetCheck {
    pub raw_len: u64,
    pub projected_len: u64,
    pub fits: bool,
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: a raw size fits an encoded budget exactly when it is at
        /// most the derived raw ceiling.
        #[test]
        fn prop_effective_limit_matches_check(
            limit in 0u64..=100_000,
            raw_len in 0u64..=100_000,
        ) {
            let budget = SizeBudget::encoded(limit);
            let effective = budget.effective_raw_limit().unwrap();
            prop_assert_eq!(budget.fits(raw_len), raw_len <= effective);
        }

        /// Property: the projection never undercounts 4/3 inflation.
        #[test]
        fn prop_projection_bounds(n in 0u64..=u32::MAX as u64) {
            let projected = projected_base64_len(n);
            prop_assert!(projected * 3 >= n * 4);
            prop_assert!(projected * 3 < n * 4 + 12);
            prop_assert_eq!(projected % 4, 0);
        }
    }
}
