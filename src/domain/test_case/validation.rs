//! Test case validation

use thiserror::Error;

use super::TestCase;

/// Validation errors for test cases
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TestCaseValidationError {
    #[error("Test case query is required")]
    QueryRequired,

    #[error("Test case '{0}' applies a filter but has no expected category")]
    ExpectedCategoryRequired(String),

    #[error("Test case '{0}' applies a filter but min_confidence is not greater than 0")]
    MinConfidenceRequired(String),

    #[error("Test case '{query}' has min_confidence {value} outside [0, 1]")]
    MinConfidenceOutOfRange { query: String, value: f64 },

    #[error("Test case '{0}' has an empty alternative category")]
    EmptyAlternative(String),

    #[error("Duplicate test case: query '{query}' with type '{query_type}'")]
    Duplicate { query: String, query_type: String },
}

/// Validate a single test case
pub fn validate_test_case(test_case: &TestCase) -> Result<(), TestCaseValidationError> {
    let query = test_case.query();

    if query.trim().is_empty() {
        return Err(TestCaseValidationError::QueryRequired);
    }

    let confidence = test_case.min_confidence();
    if !(0.0..=1.0).contains(&confidence) {
        return Err(TestCaseValidationError::MinConfidenceOutOfRange {
            query: query.to_string(),
            value: confidence,
        });
    }

    if test_case.should_apply_filter() {
        let has_category = test_case
            .expected_category()
            .map(|c| !c.trim().is_empty())
            .unwrap_or(false);

        if !has_category {
            return Err(TestCaseValidationError::ExpectedCategoryRequired(query.to_string()));
        }

        if confidence <= 0.0 {
            return Err(TestCaseValidationError::MinConfidenceRequired(query.to_string()));
        }
    }

    if test_case
        .alternative_categories()
        .iter()
        .any(|alt| alt.trim().is_empty())
    {
        return Err(TestCaseValidationError::EmptyAlternative(query.to_string()));
    }

    Ok(())
}
