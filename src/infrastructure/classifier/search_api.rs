use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::http_client::HttpClientTrait;
use crate::domain::classifier::{Approach, Classification, ClassifierAdapter};
use crate::domain::DomainError;

pub const DEFAULT_SEARCH_PATH: &str = "/api/search";
pub const DEFAULT_MAX_RESULTS: u32 = 20;

/// Classifier backed by a search service that reports the category it
/// detected for a query
#[derive(Debug)]
pub struct SearchApiClassifier<C: HttpClientTrait> {
    client: C,
    approach: Approach,
    base_url: String,
    path: String,
    max_results: u32,
}

impl<C: HttpClientTrait> SearchApiClassifier<C> {
    pub fn new(client: C, approach: Approach, base_url: impl Into<String>) -> Self {
        Self {
            client,
            approach,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            path: DEFAULT_SEARCH_PATH.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.path = if path.starts_with('/') {
            path
        } else {
            format!("/{}", path)
        };
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    fn search_url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<Classification, DomainError> {
        let response: SearchResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::adapter(
                self.approach.as_str(),
                format!("Failed to parse search response: {}", e),
            )
        })?;

        let category = response
            .detected_category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let mut classification = Classification::new(
            category,
            response.category_confidence.unwrap_or(0.0),
            response.category_applied.unwrap_or(false),
        )
        .with_duration_ms(response.query_time_ms.unwrap_or(0.0));

        if let Some(reasoning) = response
            .typesense_query
            .and_then(|q| q.llm_reasoning)
            .filter(|r| !r.is_empty())
        {
            classification = classification.with_reasoning(reasoning);
        }

        Ok(classification)
    }
}

#[async_trait]
impl<C: HttpClientTrait> ClassifierAdapter for SearchApiClassifier<C> {
    fn approach(&self) -> Approach {
        self.approach
    }

    async fn classify(&self, query: &str) -> Result<Classification, DomainError> {
        let body = serde_json::json!({
            "query": query,
            "max_results": self.max_results,
        });

        debug!(approach = %self.approach, url = %self.search_url(), query, "Sending search request");

        let json = self
            .client
            .post_json(
                &self.search_url(),
                vec![("Content-Type", "application/json")],
                &body,
            )
            .await
            .map_err(|e| match e {
                DomainError::Adapter { message, .. } => {
                    DomainError::adapter(self.approach.as_str(), message)
                }
                other => other,
            })?;

        self.parse_response(json)
    }
}

// Search service response types

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    detected_category: Option<String>,
    #[serde(default)]
    category_confidence: Option<f64>,
    #[serde(default)]
    category_applied: Option<bool>,
    #[serde(default)]
    query_time_ms: Option<f64>,
    #[serde(default)]
    typesense_query: Option<TypesenseQuery>,
}

#[derive(Debug, Deserialize)]
struct TypesenseQuery {
    #[serde(default)]
    llm_reasoning: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::classifier::http_client::mock::MockHttpClient;
    use crate::infrastructure::classifier::http_client::HttpClient;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const URL: &str = "http://rag.local/api/search";

    #[tokio::test]
    async fn test_classify_parses_rag_response() {
        let client = MockHttpClient::new().with_response(
            URL,
            serde_json::json!({
                "results": [],
                "detected_category": "Gloves",
                "category_confidence": 0.92,
                "category_applied": true,
                "query_time_ms": 812.5,
                "typesense_query": {"llm_reasoning": "SKU belongs to the glove line"}
            }),
        );
        let classifier = SearchApiClassifier::new(client, Approach::Rag, "http://rag.local/");

        let classification = classifier.classify("Ansell gloves ANS 5789911").await.unwrap();

        assert_eq!(classification.category.as_deref(), Some("Gloves"));
        assert!(classification.filter_applied);
        assert!((classification.confidence - 0.92).abs() < f64::EPSILON);
        assert_eq!(
            classification.reasoning.as_deref(),
            Some("SKU belongs to the glove line")
        );
        assert_eq!(classification.duration_ms, 812.5);
    }

    #[tokio::test]
    async fn test_classify_defaults_null_fields() {
        let client = MockHttpClient::new().with_response(
            URL,
            serde_json::json!({
                "detected_category": null,
                "category_confidence": null,
                "category_applied": null
            }),
        );
        let classifier = SearchApiClassifier::new(client, Approach::Old, "http://rag.local");

        let classification = classifier.classify("filters").await.unwrap();

        assert_eq!(classification.category, None);
        assert_eq!(classification.confidence, 0.0);
        assert!(!classification.filter_applied);
        assert_eq!(classification.reasoning, None);
    }

    #[tokio::test]
    async fn test_classify_sends_query_and_max_results() {
        let client = MockHttpClient::new().with_response(URL, serde_json::json!({}));
        let classifier = SearchApiClassifier::new(client, Approach::Old, "http://rag.local")
            .with_max_results(5);

        classifier.classify("pipettes").await.unwrap();

        let requests = classifier.client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, URL);
        assert_eq!(
            requests[0].1,
            serde_json::json!({"query": "pipettes", "max_results": 5})
        );
    }

    #[tokio::test]
    async fn test_classify_error_names_approach() {
        let client = MockHttpClient::new().with_error(URL, "HTTP 500: boom");
        let classifier = SearchApiClassifier::new(client, Approach::Rag, "http://rag.local");

        let error = classifier.classify("tubes").await.unwrap_err();

        assert!(matches!(error, DomainError::Adapter { ref adapter, .. } if adapter == "rag"));
        assert!(error.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_classify_against_http_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search/v2"))
            .and(body_json(
                serde_json::json!({"query": "lab coats", "max_results": 20}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "detected_category": "Lab Coats",
                "category_confidence": 0.81,
                "category_applied": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let classifier = SearchApiClassifier::new(HttpClient::new(), Approach::Old, server.uri())
            .with_path("search/v2");

        let classification = classifier.classify("lab coats").await.unwrap();

        assert_eq!(classification.category.as_deref(), Some("Lab Coats"));
        assert!(classification.filter_applied);
    }
}
