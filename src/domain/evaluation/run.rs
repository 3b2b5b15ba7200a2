//! A completed evaluation run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CaseEvaluation, RunSummary};
use crate::domain::classifier::Approach;
use crate::domain::test_case::TestCase;

/// Unique identifier for a run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    pub fn generate() -> Self {
        Self(format!("run-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The `-k` / `-m` expressions a run was started with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
}

/// Identifier of one assertion, e.g. `rag::generic[pipettes]`
pub fn assertion_id(test_case: &TestCase, approach: Approach) -> String {
    format!("{}::{}", approach, test_case.id())
}

/// Everything the reporters need about a finished run
#[derive(Debug, Clone)]
pub struct EvaluationRun {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub duration_ms: f64,
    pub selection: SelectionInfo,
    pub slow_threshold_ms: f64,
    /// Cases selected for the run
    pub collected: usize,
    /// Set when `--maxfail` stopped scheduling
    pub stopped_early: bool,
    /// Evaluated cases in registry order
    pub evaluations: Vec<CaseEvaluation>,
    pub summary: RunSummary,
}

impl EvaluationRun {
    pub fn new(
        started_at: DateTime<Utc>,
        selection: SelectionInfo,
        slow_threshold_ms: f64,
        collected: usize,
        mut evaluations: Vec<CaseEvaluation>,
    ) -> Self {
        evaluations.sort_by_key(|e| e.index);
        let summary = RunSummary::from_evaluations(&evaluations);
        let duration_ms = (Utc::now() - started_at).num_milliseconds().max(0) as f64;

        Self {
            run_id: RunId::generate(),
            started_at,
            duration_ms,
            selection,
            slow_threshold_ms,
            collected,
            stopped_early: false,
            evaluations,
            summary,
        }
    }

    pub fn with_stopped_early(mut self, stopped_early: bool) -> Self {
        self.stopped_early = stopped_early;
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// True when no selected assertion failed
    pub fn succeeded(&self) -> bool {
        !self.summary.has_failures()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evaluation::{Checks, EvaluationResult, Outcome};
    use crate::domain::test_case::QueryType;

    fn passing(approach: Approach) -> EvaluationResult {
        EvaluationResult {
            approach,
            detected_category: None,
            confidence: 0.0,
            filter_applied: false,
            reasoning: None,
            duration_ms: 10.0,
            outcome: Outcome::Pass,
            failures: Vec::new(),
            checks: Checks {
                category_correct: true,
                filter_decision_correct: true,
                confidence_meets_threshold: true,
            },
            slow: false,
        }
    }

    fn evaluation(index: usize) -> CaseEvaluation {
        CaseEvaluation {
            index,
            test_case: TestCase::unfiltered(format!("q{}", index), QueryType::Ambiguous, 0.0),
            old: passing(Approach::Old),
            rag: passing(Approach::Rag),
            old_selected: true,
            rag_selected: true,
        }
    }

    #[test]
    fn test_run_sorts_evaluations() {
        let run = EvaluationRun::new(
            Utc::now(),
            SelectionInfo::default(),
            5000.0,
            3,
            vec![evaluation(2), evaluation(0), evaluation(1)],
        );

        let indices: Vec<usize> = run.evaluations.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(run.summary.assertions(), 6);
        assert!(run.succeeded());
        assert!(run.run_id.as_str().starts_with("run-"));
    }

    #[test]
    fn test_assertion_id() {
        let case = TestCase::filtered("pipettes", QueryType::Generic, "Pipettes", 0.8);
        assert_eq!(assertion_id(&case, Approach::Rag), "rag::generic[pipettes]");
    }
}
