//! Evaluation result types

use serde::{Deserialize, Serialize};

use crate::domain::classifier::{Approach, Classification};
use crate::domain::test_case::TestCase;

/// Outcome of a single assertion (one approach on one test case)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail,
    /// RAG passed where OLD failed; surfaced as an improvement, not a pass
    SkipImprovement,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Pass => "pass",
            Outcome::Fail => "fail",
            Outcome::SkipImprovement => "skip_improvement",
        }
    }

    /// Console label in test-runner style
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Pass => "PASSED",
            Outcome::Fail => "FAILED",
            Outcome::SkipImprovement => "SKIPPED (improvement)",
        }
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Outcome::Fail)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why an assertion failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    WrongCategory {
        expected: Option<String>,
        detected: Option<String>,
    },
    WrongFilterDecision {
        expected: bool,
        actual: bool,
    },
    ConfidenceTooLow {
        confidence: f64,
        min_confidence: f64,
    },
    AdapterError {
        message: String,
    },
}

impl FailureReason {
    /// Short reason without the details
    pub fn summary(&self) -> &'static str {
        match self {
            FailureReason::WrongCategory { .. } => "wrong category detected",
            FailureReason::WrongFilterDecision { .. } => "wrong filter decision",
            FailureReason::ConfidenceTooLow { .. } => "confidence too low",
            FailureReason::AdapterError { .. } => "adapter error",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::WrongCategory { expected, detected } => write!(
                f,
                "wrong category detected (expected: {}, detected: {})",
                expected.as_deref().unwrap_or("None"),
                detected.as_deref().unwrap_or("None")
            ),
            FailureReason::WrongFilterDecision { expected, actual } => write!(
                f,
                "wrong filter decision (should apply filter: {}, actually applied: {})",
                expected, actual
            ),
            FailureReason::ConfidenceTooLow {
                confidence,
                min_confidence,
            } => write!(
                f,
                "confidence too low ({:.2} < {:.2})",
                confidence, min_confidence
            ),
            FailureReason::AdapterError { message } => write!(f, "adapter error: {}", message),
        }
    }
}

/// The three individual checks behind an outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checks {
    pub category_correct: bool,
    pub filter_decision_correct: bool,
    pub confidence_meets_threshold: bool,
}

impl Checks {
    pub fn all_passed(&self) -> bool {
        self.category_correct && self.filter_decision_correct && self.confidence_meets_threshold
    }
}

/// Result of evaluating one approach on one test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub approach: Approach,
    pub detected_category: Option<String>,
    pub confidence: f64,
    pub filter_applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    pub duration_ms: f64,
    pub outcome: Outcome,
    /// Failed checks, primary reason first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureReason>,
    pub checks: Checks,
    /// Exceeded the slow-query threshold; never changes the outcome
    #[serde(default)]
    pub slow: bool,
}

impl EvaluationResult {
    pub fn from_classification(
        approach: Approach,
        classification: Classification,
        duration_ms: f64,
        checks: Checks,
        failures: Vec<FailureReason>,
    ) -> Self {
        let outcome = if failures.is_empty() {
            Outcome::Pass
        } else {
            Outcome::Fail
        };

        Self {
            approach,
            detected_category: classification.category,
            confidence: classification.confidence,
            filter_applied: classification.filter_applied,
            reasoning: classification.reasoning,
            duration_ms,
            outcome,
            failures,
            checks,
            slow: false,
        }
    }

    pub fn adapter_error(approach: Approach, message: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            approach,
            detected_category: None,
            confidence: 0.0,
            filter_applied: false,
            reasoning: None,
            duration_ms,
            outcome: Outcome::Fail,
            failures: vec![FailureReason::AdapterError {
                message: message.into(),
            }],
            checks: Checks::default(),
            slow: false,
        }
    }

    /// Primary failure reason
    pub fn failure(&self) -> Option<&FailureReason> {
        self.failures.first()
    }

    /// Passed the rules, whether reported as PASS or as an improvement
    pub fn passed(&self) -> bool {
        !self.outcome.is_fail()
    }
}

/// Both evaluations of one test case plus the selection that applies to it
#[derive(Debug, Clone, Serialize)]
pub struct CaseEvaluation {
    /// Position in the registry
    pub index: usize,
    pub test_case: TestCase,
    pub old: EvaluationResult,
    pub rag: EvaluationResult,
    #[serde(skip)]
    pub old_selected: bool,
    #[serde(skip)]
    pub rag_selected: bool,
}

impl CaseEvaluation {
    pub fn result(&self, approach: Approach) -> &EvaluationResult {
        match approach {
            Approach::Old => &self.old,
            Approach::Rag => &self.rag,
        }
    }

    /// Selected assertions in approach order
    pub fn assertions(&self) -> impl Iterator<Item = &EvaluationResult> {
        let old = self.old_selected.then_some(&self.old);
        let rag = self.rag_selected.then_some(&self.rag);
        old.into_iter().chain(rag)
    }

    /// OLD passed and RAG failed
    pub fn is_regression(&self) -> bool {
        self.old.passed() && self.rag.outcome.is_fail()
    }

    /// RAG passed (or improved) and OLD failed
    pub fn is_improvement(&self) -> bool {
        self.old.outcome.is_fail() && self.rag.passed()
    }

    pub fn failed_assertions(&self) -> usize {
        self.assertions().filter(|r| r.outcome.is_fail()).count()
    }
}
