//! Classifier adapter trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

#[cfg(test)]
use mockall::automock;

/// Classification strategy under evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Approach {
    /// Confidence derived from the ratio of matching results
    Old,
    /// LLM classification over retrieved context
    Rag,
}

impl Approach {
    pub const ALL: [Approach; 2] = [Approach::Old, Approach::Rag];

    pub fn as_str(&self) -> &'static str {
        match self {
            Approach::Old => "old",
            Approach::Rag => "rag",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Approach::Old => "OLD (confidence-based)",
            Approach::Rag => "RAG (LLM-based)",
        }
    }
}

impl std::fmt::Display for Approach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a classifier reports for a single query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Detected category, if any
    #[serde(default)]
    pub category: Option<String>,
    /// Confidence score (0-1)
    #[serde(default)]
    pub confidence: f64,
    /// Whether the category filter was applied to the search
    #[serde(default)]
    pub filter_applied: bool,
    /// LLM justification (RAG only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Time reported by the classifier itself
    #[serde(default)]
    pub duration_ms: f64,
}

impl Classification {
    pub fn new(category: Option<String>, confidence: f64, filter_applied: bool) -> Self {
        Self {
            category,
            confidence,
            filter_applied,
            reasoning: None,
            duration_ms: 0.0,
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// Shared capability of both classification strategies
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClassifierAdapter: Send + Sync {
    /// Which approach this adapter stands for
    fn approach(&self) -> Approach;

    /// Classify a single query
    async fn classify(&self, query: &str) -> Result<Classification, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approach_names() {
        assert_eq!(Approach::Old.to_string(), "old");
        assert_eq!(Approach::Rag.as_str(), "rag");
        assert_eq!(serde_json::to_string(&Approach::Rag).unwrap(), "\"rag\"");
    }

    #[test]
    fn test_classification_builder() {
        let classification = Classification::new(Some("Gloves".to_string()), 0.92, true)
            .with_reasoning("Query names a glove SKU")
            .with_duration_ms(812.0);

        assert_eq!(classification.category.as_deref(), Some("Gloves"));
        assert_eq!(classification.reasoning.as_deref(), Some("Query names a glove SKU"));
        assert_eq!(classification.duration_ms, 812.0);
    }

    #[tokio::test]
    async fn test_mock_adapter() {
        let mut mock = MockClassifierAdapter::new();
        mock.expect_approach().return_const(Approach::Old);
        mock.expect_classify()
            .returning(|_| Ok(Classification::new(None, 0.0, false)));

        assert_eq!(mock.approach(), Approach::Old);
        let result = mock.classify("clear").await.unwrap();
        assert!(!result.filter_applied);
    }
}
