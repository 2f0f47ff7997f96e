//! Council membership.

use council_domain::ranking::label::MAX_LABELS;
use council_domain::{DomainError, Model};
use serde::{Deserialize, Serialize};

/// Models taking part in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilParams {
    /// Members answering and critiquing
    pub council: Vec<Model>,
    /// Model synthesizing the final answer
    pub chairman: Model,
    /// Model naming new conversations
    pub title_model: Model,
}

impl Default for CouncilParams {
    fn default() -> Self {
        Self {
            council: Model::default_council(),
            chairman: Model::default_chairman(),
            title_model: Model::default_title_model(),
        }
    }
}

impl CouncilParams {
    pub fn new(council: Vec<Model>, chairman: Model) -> Self {
        Self {
            council,
            chairman,
            ..Default::default()
        }
    }

    pub fn with_title_model(mut self, model: Model) -> Self {
        self.title_model = model;
        self
    }

    /// Reject councils that cannot be labelled before any call is made
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.council.is_empty() {
            return Err(DomainError::NoModels);
        }
        if self.council.len() > MAX_LABELS {
            return Err(DomainError::TooManyModels(self.council.len()));
        }
        if let Some(model) = Model::first_duplicate(&self.council) {
            return Err(DomainError::DuplicateModel(model.to_string()));
        }
        Ok(())
    }
}
