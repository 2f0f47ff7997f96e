//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Every section defaults, so a partial file is always valid input.

mod council;
mod provider;
mod storage;
mod strategies;

pub use council::FileCouncilConfig;
pub use provider::{API_KEY_ENV, FileProviderConfig};
pub use storage::FileStorageConfig;
pub use strategies::FileStrategiesConfig;

use council_domain::ranking::label::MAX_LABELS;
use council_domain::{StrategyKind, StrategyTunables};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("council.models cannot be empty")]
    EmptyModelList,

    #[error("model name cannot be empty")]
    EmptyModelName,

    #[error("council.models lists {0} models (at most 26 are supported)")]
    TooManyModels(usize),

    #[error("council.models lists '{0}' more than once")]
    DuplicateModel(String),

    #[error("provider.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("provider.max_retries cannot be 0")]
    InvalidRetries,

    #[error("strategies.default: {0}")]
    UnknownStrategy(String),

    #[error("strategies.{strategy}: {reason}")]
    InvalidTunables { strategy: String, reason: String },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub council: FileCouncilConfig,
    pub provider: FileProviderConfig,
    pub storage: FileStorageConfig,
    pub strategies: FileStrategiesConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning every detected issue.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        if self.council.models.is_empty() {
            issues.push(ConfigValidationError::EmptyModelList);
        }
        if self.council.models.len() > MAX_LABELS {
            issues.push(ConfigValidationError::TooManyModels(
                self.council.models.len(),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(name) = self.council.models.iter().find(|name| !seen.insert(name.trim())) {
            issues.push(ConfigValidationError::DuplicateModel(name.trim().to_string()));
        }
        if self.council.all_names().any(|name| name.trim().is_empty()) {
            issues.push(ConfigValidationError::EmptyModelName);
        }

        if self.provider.timeout_seconds == 0 {
            issues.push(ConfigValidationError::InvalidTimeout);
        }
        if self.provider.max_retries == 0 {
            issues.push(ConfigValidationError::InvalidRetries);
        }

        if let Err(e) = self.strategies.default.parse::<StrategyKind>() {
            issues.push(ConfigValidationError::UnknownStrategy(e.to_string()));
        }
        for kind in StrategyKind::ALL {
            let overrides = self.strategies.overrides(kind);
            if let Err(e) = StrategyTunables::from_json(kind, overrides.as_ref()) {
                issues.push(ConfigValidationError::InvalidTunables {
                    strategy: kind.as_str().to_string(),
                    reason: e.to_string(),
                });
            }
        }

        issues
    }

    /// Default strategy, falling back to `simple` when misconfigured
    pub fn default_strategy(&self) -> StrategyKind {
        self.strategies.default.parse().unwrap_or(StrategyKind::Simple)
    }
}
