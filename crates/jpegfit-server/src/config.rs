//! Command-line and environment configuration.

use std::net::{IpAddr, SocketAddr};

use anyhow::Context;
use clap::Parser;
use jpegfit_core::{
    intake::DEFAULT_MAX_INPUT_BYTES,
    plan::{DEFAULT_DIMENSION_CAP, DEFAULT_MAX_ATTEMPTS},
    BudgetPolicy, DegradationPlan, DimensionCap, IntakeLimits, SizeBudget,
};

#[derive(Debug, Clone, Parser)]
#[command(name = "jpegfit-server", version, about = "Compress uploaded images into a JPEG size budget")]
pub struct Args {
    /// Address to listen on.
    #[arg(long, env = "JPEGFIT_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(long, env = "JPEGFIT_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Largest accepted upload, in bytes.
    #[arg(long, env = "JPEGFIT_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_INPUT_BYTES)]
    pub max_upload_bytes: u64,

    /// Ceiling on the output's raw byte length.
    #[arg(long, env = "JPEGFIT_RAW_BYTE_LIMIT")]
    pub raw_byte_limit: Option<u64>,

    /// Ceiling on the output's base64 length. Defaults to 4 MiB when no
    /// limit is given.
    #[arg(long, env = "JPEGFIT_ENCODED_BYTE_LIMIT")]
    pub encoded_byte_limit: Option<u64>,

    /// Longest edge of the first attempt.
    #[arg(long, env = "JPEGFIT_DIMENSION_CAP", default_value_t = DEFAULT_DIMENSION_CAP)]
    pub dimension_cap: u32,

    #[arg(long, env = "JPEGFIT_MAX_ATTEMPTS", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// Return the last attempt instead of failing when the budget
    /// cannot be met.
    #[arg(long, env = "JPEGFIT_BEST_EFFORT")]
    pub best_effort: bool,
}

/// Resolved server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub intake: IntakeLimits,
    pub budget: SizeBudget,
    pub plan: DegradationPlan,
    pub policy: BudgetPolicy,
}

impl Args {
    pub fn into_config(self) -> anyhow::Result<ServerConfig> {
        let budget = if self.raw_byte_limit.is_none() && self.encoded_byte_limit.is_none() {
            SizeBudget::default()
        } else {
            SizeBudget {
                raw_byte_limit: self.raw_byte_limit,
                encoded_byte_limit: self.encoded_byte_limit,
            }
        };
        budget.validate().context("invalid size budget")?;

        let plan = DegradationPlan {
            start_dimension_cap: DimensionCap::square(self.dimension_cap),
            max_attempts: self.max_attempts,
            ..DegradationPlan::default()
        };
        plan.validate().context("invalid degradation plan")?;

        let policy = if self.best_effort {
            BudgetPolicy::BestEffort
        } else {
            BudgetPolicy::Reject
        };

        Ok(ServerConfig {
            addr: SocketAddr::new(self.host, self.port),
            intake: IntakeLimits {
                max_input_bytes: self.max_upload_bytes,
            },
            budget,
            plan,
            policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("jpegfit-server").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).into_config().unwrap();
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.budget, SizeBudget::default());
        assert_eq!(config.plan, DegradationPlan::default());
        assert_eq!(config.policy, BudgetPolicy::Reject);
        assert_eq!(config.intake.max_input_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_explicit_limits() {
        let config = parse(&["--raw-byte-limit", "3900000", "--best-effort", "--port", "8080"])
            .into_config()
            .unwrap();
        assert_eq!(config.budget.raw_byte_limit, Some(3_900_000));
        assert_eq!(config.budget.encoded_byte_limit, None);
        assert_eq!(config.policy, BudgetPolicy::BestEffort);
        assert_eq!(config.addr.port(), 8080);
    }

    #[test]
    fn test_rejects_zero_attempts() {
        assert!(parse(&["--max-attempts", "0"]).into_config().is_err());
    }

    #[test]
    fn test_rejects_cap_below_floor() {
        assert!(parse(&["--dimension-cap", "100"]).into_config().is_err());
    }
}
