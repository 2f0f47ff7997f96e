//! Model value object representing an OpenRouter backend

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;

/// A language-model backend reachable through OpenRouter (Value Object)
///
/// Well-known council members get their own variant; anything else is
/// carried verbatim in [`Model::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Model {
    // OpenAI
    Gpt51,
    Gpt5Mini,
    // Anthropic
    ClaudeSonnet45,
    ClaudeHaiku45,
    ClaudeOpus45,
    // Google
    Gemini3Pro,
    Gemini25Flash,
    // xAI
    Grok41Fast,
    // Reasoning-trace models
    DeepSeekR1,
    // Custom
    Custom(String),
}

impl Model {
    /// Get the OpenRouter identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gpt51 => "openai/gpt-5.1",
            Model::Gpt5Mini => "openai/gpt-5-mini",
            Model::ClaudeSonnet45 => "anthropic/claude-sonnet-4.5",
            Model::ClaudeHaiku45 => "anthropic/claude-haiku-4.5",
            Model::ClaudeOpus45 => "anthropic/claude-opus-4.5",
            Model::Gemini3Pro => "google/gemini-3-pro-preview",
            Model::Gemini25Flash => "google/gemini-2.5-flash",
            Model::Grok41Fast => "x-ai/grok-4.1-fast",
            Model::DeepSeekR1 => "deepseek/deepseek-r1",
            Model::Custom(s) => s,
        }
    }

    /// Default council members
    pub fn default_council() -> Vec<Model> {
        vec![
            Model::Gpt51,
            Model::ClaudeSonnet45,
            Model::Gemini3Pro,
            Model::Grok41Fast,
        ]
    }

    /// Default chairman for final synthesis
    pub fn default_chairman() -> Model {
        Model::ClaudeSonnet45
    }

    /// Cheap model used for conversation titles
    pub fn default_title_model() -> Model {
        Model::Gemini25Flash
    }

    /// Provider prefix of the identifier (e.g. `"openai"`)
    pub fn provider(&self) -> &str {
        self.as_str().split('/').next().unwrap_or_default()
    }

    /// Identifier without the provider prefix (e.g. `"gpt-5.1"`)
    pub fn short_name(&self) -> &str {
        let id = self.as_str();
        id.split_once('/').map(|(_, name)| name).unwrap_or(id)
    }

    /// First model whose identifier already appeared earlier in `models`
    pub fn first_duplicate<'a>(models: impl IntoIterator<Item = &'a Model>) -> Option<&'a Model> {
        let mut seen = HashSet::new();
        models.into_iter().find(|model| !seen.insert(model.as_str()))
    }
}

impl Default for Model {
    /// Returns the default chairman
    fn default() -> Self {
        Model::default_chairman()
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "openai/gpt-5.1" => Model::Gpt51,
            "openai/gpt-5-mini" => Model::Gpt5Mini,
            "anthropic/claude-sonnet-4.5" => Model::ClaudeSonnet45,
            "anthropic/claude-haiku-4.5" => Model::ClaudeHaiku45,
            "anthropic/claude-opus-4.5" => Model::ClaudeOpus45,
            "google/gemini-3-pro-preview" => Model::Gemini3Pro,
            "google/gemini-2.5-flash" => Model::Gemini25Flash,
            "x-ai/grok-4.1-fast" => Model::Grok41Fast,
            "deepseek/deepseek-r1" => Model::DeepSeekR1,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(model) => model,
            Err(never) => match never {},
        }
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Model::from(s.as_str()))
    }
}
