//! Test case entity and related types

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Kind of query a test case exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    /// Exact SKU or product name
    ExactMatch,
    /// Generic product type (e.g., "gloves")
    Generic,
    /// Specific but not exact (e.g., "nitrile gloves")
    Specific,
    /// Brand name query
    Brand,
    /// Could match multiple categories
    Ambiguous,
    /// Products legitimately in multiple categories
    MultiCategory,
}

impl QueryType {
    pub const ALL: [QueryType; 6] = [
        QueryType::ExactMatch,
        QueryType::Generic,
        QueryType::Specific,
        QueryType::Brand,
        QueryType::Ambiguous,
        QueryType::MultiCategory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::ExactMatch => "exact_match",
            QueryType::Generic => "generic",
            QueryType::Specific => "specific",
            QueryType::Brand => "brand",
            QueryType::Ambiguous => "ambiguous",
            QueryType::MultiCategory => "multi_category",
        }
    }
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QueryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QueryType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown query type '{}'", s))
    }
}

/// A declarative category classification test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// The search query to test
    query: String,
    /// Type of query (exact, generic, ambiguous, ...)
    query_type: QueryType,
    /// Expected category; `None` means no category should be detected
    #[serde(default)]
    expected_category: Option<String>,
    /// Whether the category filter should be applied to the search
    should_apply_filter: bool,
    /// Minimum acceptable confidence when a filter is expected
    #[serde(default)]
    min_confidence: f64,
    /// Other acceptable categories
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    alternative_categories: Vec<String>,
    /// Why the case is interesting
    #[serde(default, skip_serializing_if = "String::is_empty")]
    notes: String,
    /// Marker names used by `-m` selection
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    markers: BTreeSet<String>,
}

impl TestCase {
    /// Case that expects `category` to be detected and used as a filter
    pub fn filtered(
        query: impl Into<String>,
        query_type: QueryType,
        category: impl Into<String>,
        min_confidence: f64,
    ) -> Self {
        Self {
            query: query.into(),
            query_type,
            expected_category: Some(category.into()),
            should_apply_filter: true,
            min_confidence,
            alternative_categories: Vec::new(),
            notes: String::new(),
            markers: BTreeSet::new(),
        }
    }

    /// Case that expects no category and no filter
    pub fn unfiltered(query: impl Into<String>, query_type: QueryType, min_confidence: f64) -> Self {
        Self {
            query: query.into(),
            query_type,
            expected_category: None,
            should_apply_filter: false,
            min_confidence,
            alternative_categories: Vec::new(),
            notes: String::new(),
            markers: BTreeSet::new(),
        }
    }

    /// Fully specified case; validation happens when the registry is built
    pub fn new(
        query: impl Into<String>,
        query_type: QueryType,
        expected_category: Option<String>,
        should_apply_filter: bool,
        min_confidence: f64,
    ) -> Self {
        Self {
            query: query.into(),
            query_type,
            expected_category,
            should_apply_filter,
            min_confidence,
            alternative_categories: Vec::new(),
            notes: String::new(),
            markers: BTreeSet::new(),
        }
    }

    // Builder methods
    pub fn with_alternatives<I, S>(mut self, alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alternative_categories = alternatives.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.markers.insert(marker.into());
        self
    }

    // Getters
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    pub fn expected_category(&self) -> Option<&str> {
        self.expected_category.as_deref()
    }

    pub fn should_apply_filter(&self) -> bool {
        self.should_apply_filter
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    pub fn alternative_categories(&self) -> &[String] {
        &self.alternative_categories
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn markers(&self) -> &BTreeSet<String> {
        &self.markers
    }

    pub fn has_marker(&self, marker: &str) -> bool {
        self.markers.contains(marker)
    }

    /// Stable identifier used in reports, e.g. `generic[nitrile gloves]`
    pub fn id(&self) -> String {
        format!("{}[{}]", self.query_type, self.query)
    }
}
