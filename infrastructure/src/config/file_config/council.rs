//! Council configuration from TOML (`[council]` section)

use council_application::CouncilParams;
use council_domain::Model;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    /// OpenRouter identifiers of the council members
    pub models: Vec<String>,
    /// Model synthesizing the final answer
    pub chairman: String,
    /// Model naming new conversations
    pub title_model: String,
}

impl Default for FileCouncilConfig {
    fn default() -> Self {
        Self {
            models: Model::default_council()
                .iter()
                .map(|m| m.to_string())
                .collect(),
            chairman: Model::default_chairman().to_string(),
            title_model: Model::default_title_model().to_string(),
        }
    }
}

impl FileCouncilConfig {
    pub fn to_params(&self) -> CouncilParams {
        CouncilParams::new(
            self.models.iter().map(|m| Model::from(m.trim())).collect(),
            Model::from(self.chairman.as_str()),
        )
        .with_title_model(Model::from(self.title_model.as_str()))
    }

    /// Every configured model name, for validation
    pub(super) fn all_names(&self) -> impl Iterator<Item = &str> {
        self.models
            .iter()
            .map(String::as_str)
            .chain([self.chairman.as_str(), self.title_model.as_str()])
    }
}
