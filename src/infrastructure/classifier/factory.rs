use std::sync::Arc;
use std::time::Duration;

use super::http_client::HttpClient;
use super::{ReplayFixtureSet, SearchApiClassifier};
use crate::config::{AdaptersConfig, EndpointConfig};
use crate::domain::classifier::{Approach, ClassifierAdapter};
use crate::domain::DomainError;

/// OLD and RAG adapters for one run
pub struct ClassifierPair {
    pub old: Arc<dyn ClassifierAdapter>,
    pub rag: Arc<dyn ClassifierAdapter>,
}

/// Factory for creating classifier adapters
#[derive(Debug)]
pub struct ClassifierFactory;

impl ClassifierFactory {
    /// Create both adapters; a replay fixture takes precedence over URLs
    pub fn create(config: &AdaptersConfig) -> Result<ClassifierPair, DomainError> {
        if let Some(ref path) = config.replay_file {
            let fixtures = ReplayFixtureSet::from_file(path)?;
            return Ok(ClassifierPair {
                old: Arc::new(fixtures.classifier(Approach::Old)),
                rag: Arc::new(fixtures.classifier(Approach::Rag)),
            });
        }

        Ok(ClassifierPair {
            old: Self::create_search_api(Approach::Old, &config.old, config.max_results)?,
            rag: Self::create_search_api(Approach::Rag, &config.rag, config.max_results)?,
        })
    }

    fn create_search_api(
        approach: Approach,
        endpoint: &EndpointConfig,
        max_results: u32,
    ) -> Result<Arc<dyn ClassifierAdapter>, DomainError> {
        let base_url = endpoint
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                DomainError::configuration(format!(
                    "No {} classifier configured: pass --{}-url, set adapters.{}.base_url or use --replay",
                    approach.as_str().to_uppercase(),
                    approach,
                    approach
                ))
            })?;

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(DomainError::configuration(format!(
                "Invalid {} base URL '{}': expected http:// or https://",
                approach, base_url
            )));
        }

        let client = HttpClient::with_timeout(Duration::from_secs(endpoint.timeout_secs.max(1)))?;
        let classifier = SearchApiClassifier::new(client, approach, base_url)
            .with_path(endpoint.path.as_str())
            .with_max_results(max_results);

        Ok(Arc::new(classifier))
    }
}
