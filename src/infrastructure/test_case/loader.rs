//! Test case files in TOML (`[[cases]]` tables) or JSON (array or
//! `{"cases": [...]}`)

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use super::builtin::builtin_test_cases;
use crate::domain::test_case::{TestCase, TestCaseRegistry, TestCaseValidationError};
use crate::domain::DomainError;

/// Error type for test case files
#[derive(Debug, Error)]
pub enum TestCaseFileError {
    #[error("Failed to read test case file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unsupported test case file extension '{0}' (expected .toml or .json)")]
    UnsupportedFormat(String),

    #[error("Invalid test case: {0}")]
    Invalid(#[from] TestCaseValidationError),
}

impl From<TestCaseFileError> for DomainError {
    fn from(err: TestCaseFileError) -> Self {
        match err {
            TestCaseFileError::Invalid(e) => DomainError::validation(e.to_string()),
            other => DomainError::configuration(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CasesDocument {
    #[serde(default)]
    cases: Vec<TestCase>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonCases {
    List(Vec<TestCase>),
    Document(CasesDocument),
}

/// Parse test cases from TOML text
pub fn parse_toml(content: &str) -> Result<Vec<TestCase>, TestCaseFileError> {
    let document: CasesDocument = toml::from_str(content)?;
    Ok(document.cases)
}

/// Parse test cases from JSON text
pub fn parse_json(content: &str) -> Result<Vec<TestCase>, TestCaseFileError> {
    let cases = match serde_json::from_str::<JsonCases>(content)? {
        JsonCases::List(cases) => cases,
        JsonCases::Document(document) => document.cases,
    };
    Ok(cases)
}

/// Load test cases from a file, choosing the format by extension
pub fn load_test_cases(path: impl AsRef<Path>) -> Result<Vec<TestCase>, TestCaseFileError> {
    let path = path.as_ref();
    info!(path = %path.display(), "Loading test cases");

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let content = std::fs::read_to_string(path)?;
    let cases = match extension.as_str() {
        "toml" => parse_toml(&content)?,
        "json" => parse_json(&content)?,
        other => return Err(TestCaseFileError::UnsupportedFormat(other.to_string())),
    };

    debug!(count = cases.len(), "Test cases loaded");
    Ok(cases)
}

/// Build the registry for a run.
///
/// Without a file the built-in cases are used. A file replaces them unless
/// `with_builtin` is set, in which case its cases follow the built-in ones.
pub fn load_registry(
    path: Option<&Path>,
    with_builtin: bool,
) -> Result<TestCaseRegistry, TestCaseFileError> {
    let cases = match path {
        None => builtin_test_cases(),
        Some(path) => {
            let loaded = load_test_cases(path)?;
            if with_builtin {
                let mut cases = builtin_test_cases();
                cases.extend(loaded);
                cases
            } else {
                loaded
            }
        }
    };

    Ok(TestCaseRegistry::new(cases)?)
}
