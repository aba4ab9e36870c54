use std::sync::Arc;

use jpegfit_core::{ConfigError, IntakeLimits, SizeBudget, SizeBudgetEncoder};

use crate::config::ServerConfig;

/// Shared, read-only handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub encoder: Arc<SizeBudgetEncoder>,
    pub budget: SizeBudget,
    pub intake: IntakeLimits,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self, ConfigError> {
        let encoder = SizeBudgetEncoder::new(config.plan.clone())?.with_policy(config.policy);
        Ok(Self {
            encoder: Arc::new(encoder),
            budget: config.budget,
            intake: config.intake,
        })
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            encoder: Arc::new(SizeBudgetEncoder::default()),
            budget: SizeBudget::default(),
            intake: IntakeLimits::default(),
        }
    }
}
