//! Question value object

use serde::{Deserialize, Serialize};

/// A query to be answered by the council (Value Object)
///
/// The same text is sent to every council member, shown to critics
/// alongside the anonymized answers, and handed to the chairman.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Question {
    content: String,
}

impl Question {
    /// Try to create a new question, returning None if empty or whitespace
    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            None
        } else {
            Some(Self { content })
        }
    }

    /// Get the question content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner content
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<&str> for Question {
    type Error = crate::core::error::DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Question::try_new(s).ok_or_else(|| {
            crate::core::error::DomainError::InvalidQuestion("question cannot be empty".into())
        })
    }
}

impl TryFrom<String> for Question {
    type Error = crate::core::error::DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Question::try_from(s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_creation() {
        let q = Question::try_new("What is Rust?").unwrap();
        assert_eq!(q.content(), "What is Rust?");
    }

    #[test]
    fn test_try_from_str() {
        let q: Question = "What is Rust?".try_into().unwrap();
        assert_eq!(q.to_string(), "What is Rust?");
    }

    #[test]
    fn test_try_new_empty() {
        assert!(Question::try_new("").is_none());
        assert!(Question::try_new("   ").is_none());
        assert!(Question::try_from("  ").is_err());
    }
}
