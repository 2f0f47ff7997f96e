//! Ranking extraction from free-form critique text.
//!
//! Critics are asked to end their evaluation with a `FINAL RANKING:` marker
//! followed by a numbered list of anonymized labels. Models do not always
//! comply, so extraction is a best-effort, tiered algorithm that never fails:
//!
//! | Tier | Condition | Extraction |
//! |------|-----------|------------|
//! | [`ParseTier::Numbered`] | marker present | `N. Response X` lines after the marker |
//! | [`ParseTier::Unnumbered`] | marker present, no numbered lines | any `Response X` after the marker |
//! | [`ParseTier::WholeText`] | marker absent | any `Response X` in the whole text |
//! | [`ParseTier::Empty`] | nothing matched | empty ordering (zero votes) |
//!
//! Which tier fired is reported alongside the ordering so callers can log
//! degraded critiques.
//!
//! # Examples
//!
//! ```
//! use council_domain::ranking::parsing::{parse_ranking, ParseTier};
//!
//! let text = "B is the most thorough.\n\nFINAL RANKING:\n1. Response B\n2. Response A";
//! let parsed = parse_ranking(text);
//! assert_eq!(parsed.tier, ParseTier::Numbered);
//! assert_eq!(parsed.letters(), "BA");
//! ```

use super::label::Label;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Marker line critics are instructed to emit before their ordering.
pub const RANKING_MARKER: &str = "FINAL RANKING:";

static NUMBERED_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\s*Response ([A-Z])").expect("numbered entry pattern"));

static LABEL_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Response ([A-Z])").expect("label mention pattern"));

/// Which extraction tier produced an ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseTier {
    Numbered,
    Unnumbered,
    WholeText,
    Empty,
}

impl ParseTier {
    /// Anything other than a numbered list after the marker
    pub fn is_degraded(&self) -> bool {
        !matches!(self, ParseTier::Numbered)
    }
}

impl std::fmt::Display for ParseTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ParseTier::Numbered => "numbered",
            ParseTier::Unnumbered => "unnumbered",
            ParseTier::WholeText => "whole-text",
            ParseTier::Empty => "empty",
        };
        write!(f, "{}", s)
    }
}

/// Ordered labels extracted from one critique
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRanking {
    pub order: Vec<Label>,
    pub tier: ParseTier,
}

impl ParsedRanking {
    fn new(order: Vec<Label>, tier: ParseTier) -> Self {
        if order.is_empty() {
            Self {
                order,
                tier: ParseTier::Empty,
            }
        } else {
            Self { order, tier }
        }
    }

    /// Ordering as a compact letter string (e.g. `"BAC"`)
    pub fn letters(&self) -> String {
        self.order.iter().map(Label::letter).collect()
    }
}

/// Extract the ordered label sequence from a critique.
///
/// Only the section between the first marker and any repeated marker is
/// considered once a marker is found.
pub fn parse_ranking(text: &str) -> ParsedRanking {
    let Some((_, after)) = text.split_once(RANKING_MARKER) else {
        return ParsedRanking::new(capture_labels(&LABEL_MENTION, text), ParseTier::WholeText);
    };

    let section = after
        .split_once(RANKING_MARKER)
        .map(|(section, _)| section)
        .unwrap_or(after);

    let numbered = capture_labels(&NUMBERED_ENTRY, section);
    if !numbered.is_empty() {
        return ParsedRanking::new(numbered, ParseTier::Numbered);
    }

    ParsedRanking::new(capture_labels(&LABEL_MENTION, section), ParseTier::Unnumbered)
}

fn capture_labels(pattern: &Regex, text: &str) -> Vec<Label> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().chars().next())
        .filter_map(Label::from_letter)
        .collect()
}
