//! JSON report

use serde::Serialize;

use crate::domain::classifier::Approach;
use crate::domain::evaluation::{
    ApproachMetrics, CaseEvaluation, CaseRef, Comparison, EvaluationResult, EvaluationRun,
    SelectionInfo, SlowQuery,
};
use crate::domain::test_case::TestCase;
use crate::domain::DomainError;

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    run_id: &'a str,
    timestamp: String,
    duration_ms: f64,
    selection: &'a SelectionInfo,
    slow_threshold_ms: f64,
    stopped_early: bool,
    summary: JsonSummary<'a>,
    results: Vec<JsonCase<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonSummary<'a> {
    total_test_cases: usize,
    total_assertions: usize,
    passed: usize,
    failed: usize,
    skipped_improvement: usize,
    old_approach: ApproachMetrics,
    rag_approach: ApproachMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    comparison: Option<Comparison>,
    improvements: &'a [CaseRef],
    regressions: &'a [CaseRef],
    slow_queries: &'a [SlowQuery],
}

#[derive(Debug, Serialize)]
struct JsonCase<'a> {
    index: usize,
    id: String,
    test_case: &'a TestCase,
    #[serde(skip_serializing_if = "Option::is_none")]
    old_approach: Option<&'a EvaluationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rag_approach: Option<&'a EvaluationResult>,
    is_improvement: bool,
    is_regression: bool,
}

impl<'a> JsonCase<'a> {
    fn from_evaluation(evaluation: &'a CaseEvaluation) -> Self {
        Self {
            index: evaluation.index,
            id: evaluation.test_case.id(),
            test_case: &evaluation.test_case,
            old_approach: evaluation.old_selected.then_some(&evaluation.old),
            rag_approach: evaluation.rag_selected.then_some(&evaluation.rag),
            is_improvement: evaluation.is_improvement(),
            is_regression: evaluation.is_regression(),
        }
    }
}

fn build(run: &EvaluationRun) -> JsonReport<'_> {
    let summary = &run.summary;

    JsonReport {
        run_id: run.run_id.as_str(),
        timestamp: run.started_at.to_rfc3339(),
        duration_ms: run.duration_ms,
        selection: &run.selection,
        slow_threshold_ms: run.slow_threshold_ms,
        stopped_early: run.stopped_early,
        summary: JsonSummary {
            total_test_cases: summary.cases(),
            total_assertions: summary.assertions(),
            passed: summary.passed(),
            failed: summary.failed(),
            skipped_improvement: summary.improved(),
            old_approach: summary.metrics(Approach::Old),
            rag_approach: summary.metrics(Approach::Rag),
            comparison: summary.comparison(),
            improvements: summary.improvements(),
            regressions: summary.regressions(),
            slow_queries: summary.slow_queries(),
        },
        results: run.evaluations.iter().map(JsonCase::from_evaluation).collect(),
    }
}

/// Report as a JSON value
pub fn to_json_value(run: &EvaluationRun) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(build(run))
        .map_err(|e| DomainError::report(format!("Failed to serialize JSON report: {}", e)))
}

/// Report as pretty-printed JSON
pub fn to_json(run: &EvaluationRun) -> Result<String, DomainError> {
    serde_json::to_string_pretty(&build(run))
        .map_err(|e| DomainError::report(format!("Failed to serialize JSON report: {}", e)))
}
