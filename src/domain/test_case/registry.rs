//! Read-only, ordered registry of test cases

use std::collections::HashSet;

use super::{validate_test_case, QueryType, Selection, TestCase, TestCaseValidationError};
use crate::domain::classifier::Approach;

/// Query parameters for listing test cases
#[derive(Debug, Clone, Default)]
pub struct TestCaseQuery {
    /// Filter by query type
    pub query_type: Option<QueryType>,
    /// Case-insensitive substring of the query text
    pub query_contains: Option<String>,
    /// Filter by whether a category filter is expected
    pub should_apply_filter: Option<bool>,
    /// Filter by marker
    pub marker: Option<String>,
}

impl TestCaseQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query_type(mut self, query_type: QueryType) -> Self {
        self.query_type = Some(query_type);
        self
    }

    pub fn with_query_contains(mut self, text: impl Into<String>) -> Self {
        self.query_contains = Some(text.into());
        self
    }

    pub fn with_should_apply_filter(mut self, value: bool) -> Self {
        self.should_apply_filter = Some(value);
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    fn matches(&self, test_case: &TestCase) -> bool {
        if let Some(query_type) = self.query_type {
            if test_case.query_type() != query_type {
                return false;
            }
        }

        if let Some(ref text) = self.query_contains {
            if !test_case
                .query()
                .to_lowercase()
                .contains(&text.to_lowercase())
            {
                return false;
            }
        }

        if let Some(value) = self.should_apply_filter {
            if test_case.should_apply_filter() != value {
                return false;
            }
        }

        if let Some(ref marker) = self.marker {
            if !test_case.has_marker(marker) {
                return false;
            }
        }

        true
    }
}

/// A registry case picked by a [`Selection`], with its registry position
#[derive(Debug, Clone, Copy)]
pub struct SelectedCase<'a> {
    pub index: usize,
    pub test_case: &'a TestCase,
    /// Approaches whose assertions are reported for this case
    pub old_selected: bool,
    pub rag_selected: bool,
}

impl SelectedCase<'_> {
    pub fn is_selected(&self, approach: Approach) -> bool {
        match approach {
            Approach::Old => self.old_selected,
            Approach::Rag => self.rag_selected,
        }
    }

    pub fn assertion_count(&self) -> usize {
        usize::from(self.old_selected) + usize::from(self.rag_selected)
    }
}

/// Ordered, validated, immutable collection of test cases
#[derive(Debug, Clone, Default)]
pub struct TestCaseRegistry {
    cases: Vec<TestCase>,
}

impl TestCaseRegistry {
    /// Build a registry, validating every case and rejecting duplicate
    /// (query, query_type) pairs
    pub fn new(cases: Vec<TestCase>) -> Result<Self, TestCaseValidationError> {
        let mut seen = HashSet::new();

        for case in &cases {
            validate_test_case(case)?;

            if !seen.insert((case.query().to_string(), case.query_type())) {
                return Err(TestCaseValidationError::Duplicate {
                    query: case.query().to_string(),
                    query_type: case.query_type().to_string(),
                });
            }
        }

        Ok(Self { cases })
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TestCase> {
        self.cases.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestCase> {
        self.cases.iter()
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// List test cases matching a query, in registry order
    pub fn list(&self, query: &TestCaseQuery) -> Vec<&TestCase> {
        self.cases.iter().filter(|c| query.matches(c)).collect()
    }

    pub fn by_type(&self, query_type: QueryType) -> Vec<&TestCase> {
        self.list(&TestCaseQuery::new().with_query_type(query_type))
    }

    pub fn requiring_filter(&self) -> Vec<&TestCase> {
        self.list(&TestCaseQuery::new().with_should_apply_filter(true))
    }

    pub fn not_requiring_filter(&self) -> Vec<&TestCase> {
        self.list(&TestCaseQuery::new().with_should_apply_filter(false))
    }

    /// Apply `-k` / `-m` selection; cases with no selected assertion are
    /// dropped
    pub fn select(&self, selection: &Selection) -> Vec<SelectedCase<'_>> {
        self.cases
            .iter()
            .enumerate()
            .filter_map(|(index, test_case)| {
                let old_selected = selection.selects(test_case, Approach::Old);
                let rag_selected = selection.selects(test_case, Approach::Rag);

                (old_selected || rag_selected).then_some(SelectedCase {
                    index,
                    test_case,
                    old_selected,
                    rag_selected,
                })
            })
            .collect()
    }

    /// Keep only the first `limit` cases
    pub fn truncated(mut self, limit: usize) -> Self {
        self.cases.truncate(limit);
        self
    }

    /// Concatenate two registries, re-validating duplicates across both
    pub fn merged(self, other: TestCaseRegistry) -> Result<Self, TestCaseValidationError> {
        let mut cases = self.cases;
        cases.extend(other.cases);
        Self::new(cases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cases() -> Vec<TestCase> {
        vec![
            TestCase::filtered("nitrile gloves", QueryType::Generic, "Gloves", 0.8)
                .with_marker("benchmark"),
            TestCase::filtered("pipettes", QueryType::Generic, "Pipettes", 0.8),
            TestCase::unfiltered("Yamato", QueryType::Brand, 0.3),
            TestCase::unfiltered("filters", QueryType::Ambiguous, 0.4),
        ]
    }

    #[test]
    fn test_registry_preserves_order() {
        let registry = TestCaseRegistry::new(sample_cases()).unwrap();
        let queries: Vec<&str> = registry.iter().map(|c| c.query()).collect();

        assert_eq!(queries, vec!["nitrile gloves", "pipettes", "Yamato", "filters"]);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut cases = sample_cases();
        cases.push(TestCase::filtered("pipettes", QueryType::Generic, "Pipettes", 0.5));

        assert!(matches!(
            TestCaseRegistry::new(cases),
            Err(TestCaseValidationError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_same_query_different_type_allowed() {
        let mut cases = sample_cases();
        cases.push(TestCase::filtered("pipettes", QueryType::Specific, "Pipettes", 0.5));

        assert!(TestCaseRegistry::new(cases).is_ok());
    }

    #[test]
    fn test_registry_rejects_invalid_case() {
        let cases = vec![TestCase::new("gloves", QueryType::Generic, None, true, 0.7)];

        assert!(matches!(
            TestCaseRegistry::new(cases),
            Err(TestCaseValidationError::ExpectedCategoryRequired(_))
        ));
    }

    #[test]
    fn test_filter_views() {
        let registry = TestCaseRegistry::new(sample_cases()).unwrap();

        assert_eq!(registry.by_type(QueryType::Generic).len(), 2);
        assert_eq!(registry.requiring_filter().len(), 2);
        assert_eq!(registry.not_requiring_filter().len(), 2);

        let matching = registry.list(&TestCaseQuery::new().with_query_contains("GLOVES"));
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].query(), "nitrile gloves");
    }

    #[test]
    fn test_select_by_keyword() {
        let registry = TestCaseRegistry::new(sample_cases()).unwrap();
        let selection = Selection::parse(Some("generic and rag"), None).unwrap();
        let selected = registry.select(&selection);

        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].index, 0);
        assert!(!selected[0].old_selected);
        assert!(selected[0].rag_selected);
        assert_eq!(selected[0].assertion_count(), 1);
    }

    #[test]
    fn test_select_all_keeps_two_assertions_per_case() {
        let registry = TestCaseRegistry::new(sample_cases()).unwrap();
        let selected = registry.select(&Selection::all());

        let assertions: usize = selected.iter().map(|s| s.assertion_count()).sum();
        assert_eq!(assertions, 2 * registry.len());
    }

    #[test]
    fn test_truncated_keeps_leading_cases() {
        let registry = TestCaseRegistry::new(sample_cases()).unwrap().truncated(2);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(1).unwrap().query(), "pipettes");
    }

    #[test]
    fn test_merged_detects_cross_duplicates() {
        let first = TestCaseRegistry::new(sample_cases()).unwrap();
        let second = TestCaseRegistry::new(vec![TestCase::unfiltered("filters", QueryType::Ambiguous, 0.4)]).unwrap();

        assert!(first.merged(second).is_err());
    }
}
