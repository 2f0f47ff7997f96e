//! Anonymized response labels.
//!
//! Critics never see which model wrote which answer. Each successful
//! response in a round gets a single uppercase letter, rendered to critics
//! as `Response A`, `Response B`, ... in collection order. The
//! [`LabelMap`] is the per-round bijection back to the authoring model.

use crate::core::error::DomainError;
use crate::core::model::Model;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Prefix used when a label is shown to (and parsed back from) critics.
pub const LABEL_PREFIX: &str = "Response ";

/// Largest number of candidates a single round can anonymize.
pub const MAX_LABELS: usize = 26;

/// A single-letter anonymized label (`A`..=`Z`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(char);

impl Label {
    /// Label for the `index`-th response of a round (0 → `A`)
    pub fn from_index(index: usize) -> Option<Self> {
        if index < MAX_LABELS {
            Some(Self((b'A' + index as u8) as char))
        } else {
            None
        }
    }

    /// Label from its letter, if it is an uppercase ASCII letter
    pub fn from_letter(letter: char) -> Option<Self> {
        letter.is_ascii_uppercase().then_some(Self(letter))
    }

    /// The bare letter
    pub fn letter(&self) -> char {
        self.0
    }

    /// Zero-based position in the round
    pub fn index(&self) -> usize {
        (self.0 as u8 - b'A') as usize
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", LABEL_PREFIX, self.0)
    }
}

impl std::str::FromStr for Label {
    type Err = DomainError;

    /// Accepts both `"Response C"` and a bare `"C"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let letter = s.strip_prefix(LABEL_PREFIX).unwrap_or(s);
        let mut chars = letter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Label::from_letter(c),
            _ => None,
        }
        .ok_or_else(|| DomainError::InvalidParameter {
            name: "label".to_string(),
            reason: format!("'{s}' is not an anonymized response label"),
        })
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Bijection between the labels of one round and the models behind them.
///
/// Serialized as `{"Response A": "openai/gpt-5.1", ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Label, Model>", into = "BTreeMap<Label, Model>")]
pub struct LabelMap {
    entries: Vec<(Label, Model)>,
}

impl LabelMap {
    /// Assign labels in order to the given (successful) responders.
    ///
    /// Each model may appear once.
    pub fn assign<'a>(models: impl IntoIterator<Item = &'a Model>) -> Result<Self, DomainError> {
        let models: Vec<&Model> = models.into_iter().collect();
        if models.len() > MAX_LABELS {
            return Err(DomainError::TooManyModels(models.len()));
        }
        if let Some(model) = Model::first_duplicate(models.iter().copied()) {
            return Err(DomainError::DuplicateModel(model.to_string()));
        }

        let entries = models
            .into_iter()
            .enumerate()
            .filter_map(|(i, model)| Label::from_index(i).map(|label| (label, model.clone())))
            .collect();

        Ok(Self { entries })
    }

    /// The model behind a label, if the label belongs to this round
    pub fn model_for(&self, label: Label) -> Option<&Model> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, model)| model)
    }

    /// The label assigned to a model in this round
    pub fn label_for(&self, model: &Model) -> Option<Label> {
        self.entries
            .iter()
            .find(|(_, m)| m == model)
            .map(|(label, _)| *label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in label order
    pub fn iter(&self) -> impl Iterator<Item = (Label, &Model)> {
        self.entries.iter().map(|(label, model)| (*label, model))
    }
}

impl From<BTreeMap<Label, Model>> for LabelMap {
    fn from(map: BTreeMap<Label, Model>) -> Self {
        Self {
            entries: map.into_iter().collect(),
        }
    }
}

impl From<LabelMap> for BTreeMap<Label, Model> {
    fn from(map: LabelMap) -> Self {
        map.entries.into_iter().collect()
    }
}
