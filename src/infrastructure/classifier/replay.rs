//! Replay classifier - serves recorded classifications from a JSON fixture
//!
//! Two fixture layouts are accepted:
//! - a map from query to classification, shared by both approaches
//! - `{"old": {...}, "rag": {...}}` with one map per approach

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::classifier::{Approach, Classification, ClassifierAdapter};
use crate::domain::DomainError;

type Responses = HashMap<String, Classification>;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplayFixture {
    PerApproach(PerApproachFixture),
    Shared(Responses),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PerApproachFixture {
    #[serde(default)]
    old: Responses,
    #[serde(default)]
    rag: Responses,
}

/// Recorded responses for both approaches
#[derive(Debug, Clone, Default)]
pub struct ReplayFixtureSet {
    old: Arc<Responses>,
    rag: Arc<Responses>,
}

impl ReplayFixtureSet {
    /// Load a fixture from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading replay fixture");

        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::configuration(format!(
                "Failed to read replay fixture {}: {}",
                path.display(),
                e
            ))
        })?;

        let fixtures = Self::from_str(&content)?;
        debug!(
            old = fixtures.old.len(),
            rag = fixtures.rag.len(),
            "Replay fixture loaded"
        );

        Ok(fixtures)
    }

    /// Load a fixture from a JSON string
    pub fn from_str(content: &str) -> Result<Self, DomainError> {
        let fixture: ReplayFixture = serde_json::from_str(content).map_err(|e| {
            DomainError::configuration(format!("Invalid replay fixture: {}", e))
        })?;

        Ok(match fixture {
            ReplayFixture::PerApproach(PerApproachFixture { old, rag }) => Self {
                old: Arc::new(old),
                rag: Arc::new(rag),
            },
            ReplayFixture::Shared(responses) => {
                let responses = Arc::new(responses);
                Self {
                    old: responses.clone(),
                    rag: responses,
                }
            }
        })
    }

    pub fn classifier(&self, approach: Approach) -> ReplayClassifier {
        let responses = match approach {
            Approach::Old => self.old.clone(),
            Approach::Rag => self.rag.clone(),
        };

        ReplayClassifier {
            approach,
            responses,
        }
    }
}

/// Deterministic classifier answering from recorded responses
#[derive(Debug, Clone)]
pub struct ReplayClassifier {
    approach: Approach,
    responses: Arc<Responses>,
}

impl ReplayClassifier {
    pub fn new(approach: Approach, responses: HashMap<String, Classification>) -> Self {
        Self {
            approach,
            responses: Arc::new(responses),
        }
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

#[async_trait]
impl ClassifierAdapter for ReplayClassifier {
    fn approach(&self) -> Approach {
        self.approach
    }

    async fn classify(&self, query: &str) -> Result<Classification, DomainError> {
        self.responses
            .get(query)
            .cloned()
            .ok_or_else(|| {
                DomainError::adapter(
                    self.approach.as_str(),
                    format!("No recorded response for query '{}'", query),
                )
            })
    }
}
