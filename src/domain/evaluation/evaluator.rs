//! Evaluator - runs one test case through both classifiers and applies the
//! pass/fail/improvement rules

use std::sync::Arc;
use std::time::Instant;

use super::{CaseEvaluation, Checks, EvaluationResult, FailureReason, Outcome};
use crate::domain::classifier::{Approach, ClassifierAdapter};
use crate::domain::test_case::{SelectedCase, TestCase};
use crate::domain::DomainError;

/// RAG calls slower than this are flagged SLOW
pub const DEFAULT_SLOW_THRESHOLD_MS: f64 = 5000.0;

/// Whether a detected category is acceptable for a test case.
///
/// A missing detection is only correct when no category is expected. A
/// detection matches the expected category or an alternative exactly, or as
/// a case-insensitive substring in either direction.
///
/// Alternatives still apply when no category is expected: an ambiguous case
/// accepts a detection listed among its alternatives instead of requiring no
/// detection at all.
pub fn category_matches(
    detected: Option<&str>,
    expected: Option<&str>,
    alternatives: &[String],
) -> bool {
    let detected = detected.map(str::trim).filter(|d| !d.is_empty());

    let Some(detected) = detected else {
        return expected.is_none();
    };

    let detected_lower = detected.to_lowercase();

    expected
        .into_iter()
        .chain(alternatives.iter().map(String::as_str))
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .any(|candidate| {
            if candidate == detected {
                return true;
            }
            let candidate_lower = candidate.to_lowercase();
            candidate_lower.contains(&detected_lower) || detected_lower.contains(&candidate_lower)
        })
}

/// Run the individual checks for a classification
pub fn run_checks(
    test_case: &TestCase,
    category: Option<&str>,
    confidence: f64,
    filter_applied: bool,
) -> Checks {
    Checks {
        category_correct: category_matches(
            category,
            test_case.expected_category(),
            test_case.alternative_categories(),
        ),
        filter_decision_correct: filter_applied == test_case.should_apply_filter(),
        confidence_meets_threshold: !test_case.should_apply_filter()
            || confidence >= test_case.min_confidence(),
    }
}

/// Failure reasons in rule order: category, filter decision, confidence.
///
/// Every failing check is listed, so a case that expects no category and gets
/// a filtered detection reports "wrong category detected" first, followed by
/// "wrong filter decision".
pub fn failure_reasons(
    test_case: &TestCase,
    checks: &Checks,
    category: Option<&str>,
    confidence: f64,
    filter_applied: bool,
) -> Vec<FailureReason> {
    let mut failures = Vec::new();

    if !checks.category_correct {
        failures.push(FailureReason::WrongCategory {
            expected: test_case.expected_category().map(str::to_string),
            detected: category.map(str::to_string),
        });
    }

    if !checks.filter_decision_correct {
        failures.push(FailureReason::WrongFilterDecision {
            expected: test_case.should_apply_filter(),
            actual: filter_applied,
        });
    }

    if !checks.confidence_meets_threshold {
        failures.push(FailureReason::ConfidenceTooLow {
            confidence,
            min_confidence: test_case.min_confidence(),
        });
    }

    failures
}

/// Mark RAG as an improvement when it passes where OLD failed
pub fn apply_comparison(old: &EvaluationResult, rag: &mut EvaluationResult) {
    if old.outcome == Outcome::Fail && rag.outcome == Outcome::Pass {
        rag.outcome = Outcome::SkipImprovement;
    }
}

/// Evaluates test cases against an OLD and a RAG classifier
#[derive(Clone)]
pub struct Evaluator {
    old: Arc<dyn ClassifierAdapter>,
    rag: Arc<dyn ClassifierAdapter>,
    slow_threshold_ms: f64,
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("slow_threshold_ms", &self.slow_threshold_ms)
            .finish()
    }
}

impl Evaluator {
    /// Create an evaluator; each adapter must report the approach it is
    /// wired in for
    pub fn new(
        old: Arc<dyn ClassifierAdapter>,
        rag: Arc<dyn ClassifierAdapter>,
    ) -> Result<Self, DomainError> {
        if old.approach() != Approach::Old {
            return Err(DomainError::configuration(format!(
                "Adapter configured for OLD reports approach '{}'",
                old.approach()
            )));
        }

        if rag.approach() != Approach::Rag {
            return Err(DomainError::configuration(format!(
                "Adapter configured for RAG reports approach '{}'",
                rag.approach()
            )));
        }

        Ok(Self {
            old,
            rag,
            slow_threshold_ms: DEFAULT_SLOW_THRESHOLD_MS,
        })
    }

    pub fn with_slow_threshold_ms(mut self, threshold_ms: f64) -> Self {
        self.slow_threshold_ms = threshold_ms;
        self
    }

    pub fn slow_threshold_ms(&self) -> f64 {
        self.slow_threshold_ms
    }

    /// Evaluate a selected case; both adapters are always invoked once
    pub async fn evaluate(&self, selected: &SelectedCase<'_>) -> CaseEvaluation {
        let test_case = selected.test_case;

        let old = self.evaluate_with(self.old.as_ref(), test_case).await;
        let mut rag = self.evaluate_with(self.rag.as_ref(), test_case).await;

        apply_comparison(&old, &mut rag);
        rag.slow = rag.duration_ms > self.slow_threshold_ms;

        CaseEvaluation {
            index: selected.index,
            test_case: test_case.clone(),
            old,
            rag,
            old_selected: selected.old_selected,
            rag_selected: selected.rag_selected,
        }
    }

    /// Evaluate a case with both assertions selected
    pub async fn evaluate_case(&self, index: usize, test_case: &TestCase) -> CaseEvaluation {
        let selected = SelectedCase {
            index,
            test_case,
            old_selected: true,
            rag_selected: true,
        };
        self.evaluate(&selected).await
    }

    async fn evaluate_with(
        &self,
        adapter: &dyn ClassifierAdapter,
        test_case: &TestCase,
    ) -> EvaluationResult {
        let approach = adapter.approach();
        let start = Instant::now();
        let response = adapter.classify(test_case.query()).await;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        match response {
            Ok(classification) => {
                // Replayed responses carry their recorded duration
                let duration_ms = elapsed_ms.max(classification.duration_ms);
                let category = classification.category.as_deref();
                let checks = run_checks(
                    test_case,
                    category,
                    classification.confidence,
                    classification.filter_applied,
                );
                let failures = failure_reasons(
                    test_case,
                    &checks,
                    category,
                    classification.confidence,
                    classification.filter_applied,
                );

                EvaluationResult::from_classification(
                    approach,
                    classification,
                    duration_ms,
                    checks,
                    failures,
                )
            }
            Err(DomainError::Adapter { message, .. }) => {
                EvaluationResult::adapter_error(approach, message, elapsed_ms)
            }
            Err(e) => EvaluationResult::adapter_error(approach, e.to_string(), elapsed_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::classifier::{Classification, MockClassifierAdapter};
    use crate::domain::test_case::QueryType;

    fn mock_adapter(approach: Approach, classification: Classification) -> Arc<dyn ClassifierAdapter> {
        let mut mock = MockClassifierAdapter::new();
        mock.expect_approach().return_const(approach);
        mock.expect_classify()
            .times(1)
            .returning(move |_| Ok(classification.clone()));
        Arc::new(mock)
    }

    fn failing_adapter(approach: Approach, message: &'static str) -> Arc<dyn ClassifierAdapter> {
        let mut mock = MockClassifierAdapter::new();
        mock.expect_approach().return_const(approach);
        mock.expect_classify()
            .times(1)
            .returning(move |_| Err(DomainError::adapter(approach.as_str(), message)));
        Arc::new(mock)
    }

    fn gloves_case() -> TestCase {
        TestCase::filtered("Ansell gloves ANS 5789911", QueryType::ExactMatch, "Gloves", 0.7)
    }

    #[test]
    fn test_category_matches_exact_and_alternative() {
        let alternatives = vec!["Microscopy".to_string(), "Slides & Coverslips".to_string()];

        assert!(category_matches(Some("Slides"), Some("Slides"), &alternatives));
        assert!(category_matches(Some("Microscopy"), Some("Slides"), &alternatives));
        assert!(!category_matches(Some("Pipettes"), Some("Slides"), &alternatives));
    }

    #[test]
    fn test_category_matches_partial_case_insensitive() {
        assert!(category_matches(Some("Disposable Gloves"), Some("Gloves"), &[]));
        assert!(category_matches(Some("gloves"), Some("Nitrile Gloves"), &[]));
    }

    #[test]
    fn test_category_matches_null_expected() {
        assert!(category_matches(None, None, &[]));
        assert!(category_matches(Some("  "), None, &[]));
        assert!(!category_matches(Some("Gloves"), None, &[]));
        assert!(!category_matches(None, Some("Gloves"), &[]));

        let alternatives = vec!["Filtration".to_string()];
        assert!(category_matches(Some("Filtration"), None, &alternatives));
    }

    #[test]
    fn test_unfiltered_case_fails_when_filter_applied_regardless_of_confidence() {
        let case = TestCase::unfiltered("filters", QueryType::Ambiguous, 0.4)
            .with_alternatives(["Water Purifiers", "Lab Equipment", "Filtration"]);

        for confidence in [0.0, 0.5, 1.0] {
            let checks = run_checks(&case, Some("Filtration"), confidence, true);
            let failures = failure_reasons(&case, &checks, Some("Filtration"), confidence, true);
            assert!(!failures.is_empty());
            assert_eq!(failures[0].summary(), "wrong filter decision");
        }

        let checks = run_checks(&case, None, 0.9, false);
        assert!(checks.all_passed());
    }

    #[test]
    fn test_filtered_case_requires_confidence() {
        let case = gloves_case().with_alternatives(["PPE"]);

        // Alternative match, marginally below the threshold
        let checks = run_checks(&case, Some("PPE"), 0.69, true);
        let failures = failure_reasons(&case, &checks, Some("PPE"), 0.69, true);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].summary(), "confidence too low");

        let checks = run_checks(&case, Some("Gloves"), 0.7, true);
        assert!(checks.all_passed());
    }

    #[test]
    fn test_failure_order_follows_rules() {
        let case = TestCase::unfiltered("Ansell", QueryType::Brand, 0.0);
        let checks = run_checks(&case, Some("Gloves"), 0.9, true);
        let failures = failure_reasons(&case, &checks, Some("Gloves"), 0.9, true);

        let summaries: Vec<&str> = failures.iter().map(|f| f.summary()).collect();
        assert_eq!(summaries, vec!["wrong category detected", "wrong filter decision"]);
    }

    #[tokio::test]
    async fn test_exact_match_passes() {
        let classification = Classification::new(Some("Gloves".to_string()), 0.92, true);
        let evaluator = Evaluator::new(
            mock_adapter(Approach::Old, classification.clone()),
            mock_adapter(Approach::Rag, classification.with_reasoning("SKU match")),
        )
        .unwrap();

        let evaluation = evaluator.evaluate_case(0, &gloves_case()).await;

        assert_eq!(evaluation.old.outcome, Outcome::Pass);
        assert_eq!(evaluation.rag.outcome, Outcome::Pass);
        assert_eq!(evaluation.rag.reasoning.as_deref(), Some("SKU match"));
        assert!(!evaluation.is_regression());
        assert!(!evaluation.is_improvement());
    }

    #[tokio::test]
    async fn test_rag_improvement_is_skip() {
        let case = TestCase::unfiltered("Ansell", QueryType::Brand, 0.0);
        let evaluator = Evaluator::new(
            mock_adapter(Approach::Old, Classification::new(Some("Gloves".to_string()), 0.8, true)),
            mock_adapter(Approach::Rag, Classification::new(None, 0.0, false)),
        )
        .unwrap();

        let evaluation = evaluator.evaluate_case(0, &case).await;

        assert_eq!(evaluation.old.outcome, Outcome::Fail);
        assert!(
            evaluation
                .old
                .failures
                .iter()
                .any(|f| f.summary() == "wrong filter decision")
        );
        assert_eq!(evaluation.rag.outcome, Outcome::SkipImprovement);
        assert!(evaluation.is_improvement());
    }

    #[tokio::test]
    async fn test_regression_detected() {
        let evaluator = Evaluator::new(
            mock_adapter(Approach::Old, Classification::new(Some("Gloves".to_string()), 0.9, true)),
            mock_adapter(Approach::Rag, Classification::new(Some("Pipettes".to_string()), 0.9, true)),
        )
        .unwrap();

        let evaluation = evaluator.evaluate_case(3, &gloves_case()).await;

        assert_eq!(evaluation.index, 3);
        assert_eq!(evaluation.old.outcome, Outcome::Pass);
        assert_eq!(evaluation.rag.outcome, Outcome::Fail);
        assert!(evaluation.is_regression());
    }

    #[tokio::test]
    async fn test_slow_rag_flagged_without_changing_outcome() {
        let classification = Classification::new(Some("Gloves".to_string()), 0.92, true);
        let evaluator = Evaluator::new(
            mock_adapter(Approach::Old, classification.clone()),
            mock_adapter(Approach::Rag, classification.with_duration_ms(6200.0)),
        )
        .unwrap();

        let evaluation = evaluator.evaluate_case(0, &gloves_case()).await;

        assert!(evaluation.rag.slow);
        assert!(evaluation.rag.duration_ms >= 6200.0);
        assert_eq!(evaluation.rag.outcome, Outcome::Pass);
        assert!(!evaluation.old.slow);
    }

    #[tokio::test]
    async fn test_adapter_error_becomes_failure() {
        let evaluator = Evaluator::new(
            failing_adapter(Approach::Old, "connection refused"),
            mock_adapter(Approach::Rag, Classification::new(Some("Gloves".to_string()), 0.92, true)),
        )
        .unwrap();

        let evaluation = evaluator.evaluate_case(0, &gloves_case()).await;

        assert_eq!(evaluation.old.outcome, Outcome::Fail);
        let reason = evaluation.old.failure().unwrap().to_string();
        assert!(reason.contains("connection refused"));
        assert_eq!(evaluation.rag.outcome, Outcome::SkipImprovement);
    }

    #[tokio::test]
    async fn test_deterministic_adapter_is_idempotent() {
        let case = gloves_case();
        let mut outcomes = Vec::new();

        for _ in 0..2 {
            let evaluator = Evaluator::new(
                mock_adapter(Approach::Old, Classification::new(Some("Gloves".to_string()), 0.5, true)),
                mock_adapter(Approach::Rag, Classification::new(Some("Gloves".to_string()), 0.9, true)),
            )
            .unwrap();
            let evaluation = evaluator.evaluate_case(0, &case).await;
            outcomes.push((evaluation.old.outcome, evaluation.rag.outcome));
        }

        assert_eq!(outcomes[0], outcomes[1]);
        assert_eq!(outcomes[0], (Outcome::Fail, Outcome::SkipImprovement));
    }

    #[test]
    fn test_mismatched_adapters_rejected() {
        let result = Evaluator::new(
            mock_adapter_no_calls(Approach::Rag),
            mock_adapter_no_calls(Approach::Rag),
        );

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    fn mock_adapter_no_calls(approach: Approach) -> Arc<dyn ClassifierAdapter> {
        let mut mock = MockClassifierAdapter::new();
        mock.expect_approach().return_const(approach);
        Arc::new(mock)
    }
}
