//! Strategy configuration from TOML (`[strategies]` section)
//!
//! ```toml
//! [strategies]
//! default = "multi_round"
//!
//! [strategies.multi_round]
//! rounds = 3
//! ```

use council_domain::{MultiRoundConfig, ReasoningAwareConfig, StrategyKind, WeightedVotingConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStrategiesConfig {
    /// Strategy used when a run names none
    pub default: String,
    pub multi_round: MultiRoundConfig,
    pub reasoning_aware: ReasoningAwareConfig,
    pub weighted_voting: WeightedVotingConfig,
}

impl Default for FileStrategiesConfig {
    fn default() -> Self {
        Self {
            default: StrategyKind::Simple.as_str().to_string(),
            multi_round: MultiRoundConfig::default(),
            reasoning_aware: ReasoningAwareConfig::default(),
            weighted_voting: WeightedVotingConfig::default(),
        }
    }
}

impl FileStrategiesConfig {
    /// Configured tunables for `kind` as JSON overrides, ready for schema validation
    pub fn overrides(&self, kind: StrategyKind) -> Option<Value> {
        let value = match kind {
            StrategyKind::Simple => return None,
            StrategyKind::MultiRound => serde_json::to_value(self.multi_round),
            StrategyKind::ReasoningAware => serde_json::to_value(self.reasoning_aware),
            StrategyKind::WeightedVoting => serde_json::to_value(self.weighted_voting),
        };
        value.ok()
    }
}
