//! Run summary types for aggregation and comparison

use serde::{Deserialize, Serialize};

use super::{CaseEvaluation, EvaluationResult, Outcome};
use crate::domain::classifier::Approach;

// ============================================================================
// LatencyStats
// ============================================================================

/// Latency statistics for an approach
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    /// Average latency in milliseconds
    pub avg_ms: f64,
    /// Minimum latency in milliseconds
    pub min_ms: f64,
    /// Maximum latency in milliseconds
    pub max_ms: f64,
    /// 50th percentile (median) latency
    pub p50_ms: f64,
    /// 95th percentile latency
    pub p95_ms: f64,
}

impl LatencyStats {
    /// Calculate latency statistics from a list of samples
    pub fn from_samples(mut samples: Vec<f64>) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        samples.sort_unstable_by(f64::total_cmp);
        let len = samples.len();
        let sum: f64 = samples.iter().sum();

        Self {
            avg_ms: sum / len as f64,
            min_ms: samples[0],
            max_ms: samples[len - 1],
            p50_ms: percentile(&samples, 50.0),
            p95_ms: percentile(&samples, 95.0),
        }
    }
}

/// Calculate a percentile from a sorted list
fn percentile(sorted_samples: &[f64], p: f64) -> f64 {
    if sorted_samples.is_empty() {
        return 0.0;
    }

    if sorted_samples.len() == 1 {
        return sorted_samples[0];
    }

    let index = (p / 100.0 * (sorted_samples.len() - 1) as f64) as usize;
    sorted_samples[index.min(sorted_samples.len() - 1)]
}

fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

// ============================================================================
// ApproachStats
// ============================================================================

/// Raw counters for one approach; merged by addition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApproachStats {
    pub assertions: usize,
    pub passed: usize,
    pub failed: usize,
    pub improved: usize,
    pub category_correct: usize,
    pub filter_decision_correct: usize,
    pub confidence_met: usize,
    durations_ms: Vec<f64>,
}

impl ApproachStats {
    fn record(&mut self, result: &EvaluationResult) {
        self.assertions += 1;
        match result.outcome {
            Outcome::Pass => self.passed += 1,
            Outcome::Fail => self.failed += 1,
            Outcome::SkipImprovement => self.improved += 1,
        }
        self.category_correct += usize::from(result.checks.category_correct);
        self.filter_decision_correct += usize::from(result.checks.filter_decision_correct);
        self.confidence_met += usize::from(result.checks.confidence_meets_threshold);
        self.durations_ms.push(result.duration_ms);
    }

    fn merge(&mut self, other: ApproachStats) {
        self.assertions += other.assertions;
        self.passed += other.passed;
        self.failed += other.failed;
        self.improved += other.improved;
        self.category_correct += other.category_correct;
        self.filter_decision_correct += other.filter_decision_correct;
        self.confidence_met += other.confidence_met;
        self.durations_ms.extend(other.durations_ms);
    }

    pub fn metrics(&self) -> ApproachMetrics {
        ApproachMetrics {
            assertions: self.assertions,
            passed: self.passed,
            failed: self.failed,
            improved: self.improved,
            category_accuracy: rate(self.category_correct, self.assertions),
            filter_decision_accuracy: rate(self.filter_decision_correct, self.assertions),
            confidence_met_rate: rate(self.confidence_met, self.assertions),
            latency: LatencyStats::from_samples(self.durations_ms.clone()),
        }
    }
}

/// Derived metrics for one approach
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApproachMetrics {
    pub assertions: usize,
    pub passed: usize,
    pub failed: usize,
    pub improved: usize,
    /// Share of assertions with an acceptable category (0.0 - 1.0)
    pub category_accuracy: f64,
    pub filter_decision_accuracy: f64,
    pub confidence_met_rate: f64,
    pub latency: LatencyStats,
}

/// RAG relative to OLD
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Category accuracy difference in percentage points
    pub accuracy_improvement: f64,
    /// Filter-decision accuracy difference in percentage points
    pub filter_decision_improvement: f64,
    /// Average latency difference in milliseconds
    pub time_overhead_ms: f64,
}

impl Comparison {
    pub fn between(old: &ApproachMetrics, rag: &ApproachMetrics) -> Self {
        Self {
            accuracy_improvement: (rag.category_accuracy - old.category_accuracy) * 100.0,
            filter_decision_improvement: (rag.filter_decision_accuracy
                - old.filter_decision_accuracy)
                * 100.0,
            time_overhead_ms: rag.latency.avg_ms - old.latency.avg_ms,
        }
    }
}

// ============================================================================
// RunSummary
// ============================================================================

/// Reference to a test case in a summary list
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaseRef {
    pub index: usize,
    pub id: String,
    pub query: String,
}

impl CaseRef {
    fn of(evaluation: &CaseEvaluation) -> Self {
        Self {
            index: evaluation.index,
            id: evaluation.test_case.id(),
            query: evaluation.test_case.query().to_string(),
        }
    }
}

/// A slow RAG call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlowQuery {
    pub case: CaseRef,
    pub duration_ms: f64,
}

/// Accumulated counters for a run.
///
/// `record` and `merge` are commutative, so summaries built from any
/// partition or ordering of the same evaluations compare equal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    cases: usize,
    old: ApproachStats,
    rag: ApproachStats,
    regressions: Vec<CaseRef>,
    improvements: Vec<CaseRef>,
    slow: Vec<SlowQuery>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Summarise a set of evaluations
    pub fn from_evaluations<'a>(evaluations: impl IntoIterator<Item = &'a CaseEvaluation>) -> Self {
        let mut summary = Self::new();
        for evaluation in evaluations {
            summary.record(evaluation);
        }
        summary
    }

    pub fn record(&mut self, evaluation: &CaseEvaluation) {
        self.cases += 1;

        if evaluation.old_selected {
            self.old.record(&evaluation.old);
        }
        if evaluation.rag_selected {
            self.rag.record(&evaluation.rag);
        }

        if evaluation.is_regression() {
            insert_sorted(&mut self.regressions, CaseRef::of(evaluation));
        }
        if evaluation.is_improvement() {
            insert_sorted(&mut self.improvements, CaseRef::of(evaluation));
        }
        if evaluation.rag_selected && evaluation.rag.slow {
            let entry = SlowQuery {
                case: CaseRef::of(evaluation),
                duration_ms: evaluation.rag.duration_ms,
            };
            let position = self
                .slow
                .partition_point(|s| s.case.index < entry.case.index);
            self.slow.insert(position, entry);
        }
    }

    pub fn merge(&mut self, other: RunSummary) {
        self.cases += other.cases;
        self.old.merge(other.old);
        self.rag.merge(other.rag);
        for case in other.regressions {
            insert_sorted(&mut self.regressions, case);
        }
        for case in other.improvements {
            insert_sorted(&mut self.improvements, case);
        }
        for entry in other.slow {
            let position = self
                .slow
                .partition_point(|s| s.case.index < entry.case.index);
            self.slow.insert(position, entry);
        }
    }

    pub fn cases(&self) -> usize {
        self.cases
    }

    pub fn assertions(&self) -> usize {
        self.old.assertions + self.rag.assertions
    }

    pub fn passed(&self) -> usize {
        self.old.passed + self.rag.passed
    }

    pub fn failed(&self) -> usize {
        self.old.failed + self.rag.failed
    }

    pub fn improved(&self) -> usize {
        self.old.improved + self.rag.improved
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Regressions in registry order
    pub fn regressions(&self) -> &[CaseRef] {
        &self.regressions
    }

    /// Improvements in registry order
    pub fn improvements(&self) -> &[CaseRef] {
        &self.improvements
    }

    pub fn slow_queries(&self) -> &[SlowQuery] {
        &self.slow
    }

    pub fn stats(&self, approach: Approach) -> &ApproachStats {
        match approach {
            Approach::Old => &self.old,
            Approach::Rag => &self.rag,
        }
    }

    pub fn metrics(&self, approach: Approach) -> ApproachMetrics {
        self.stats(approach).metrics()
    }

    /// Deltas are only meaningful when both approaches were evaluated
    pub fn comparison(&self) -> Option<Comparison> {
        if self.old.assertions == 0 || self.rag.assertions == 0 {
            return None;
        }
        Some(Comparison::between(&self.old.metrics(), &self.rag.metrics()))
    }
}

fn insert_sorted(list: &mut Vec<CaseRef>, case: CaseRef) {
    let position = list.partition_point(|c| c < &case);
    list.insert(position, case);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evaluation::{Checks, FailureReason};
    use crate::domain::test_case::{QueryType, TestCase};

    fn result(approach: Approach, outcome: Outcome, duration_ms: f64) -> EvaluationResult {
        let passed = outcome != Outcome::Fail;
        EvaluationResult {
            approach,
            detected_category: Some("Gloves".to_string()),
            confidence: 0.9,
            filter_applied: true,
            reasoning: None,
            duration_ms,
            outcome,
            failures: if passed {
                Vec::new()
            } else {
                vec![FailureReason::WrongFilterDecision {
                    expected: false,
                    actual: true,
                }]
            },
            checks: Checks {
                category_correct: true,
                filter_decision_correct: passed,
                confidence_meets_threshold: true,
            },
            slow: false,
        }
    }

    fn evaluation(index: usize, old: Outcome, rag: Outcome, rag_ms: f64) -> CaseEvaluation {
        let mut rag = result(Approach::Rag, rag, rag_ms);
        rag.slow = rag_ms > 5000.0;
        CaseEvaluation {
            index,
            test_case: TestCase::unfiltered(format!("query {}", index), QueryType::Generic, 0.5),
            old: result(Approach::Old, old, 100.0),
            rag,
            old_selected: true,
            rag_selected: true,
        }
    }

    fn sample() -> Vec<CaseEvaluation> {
        vec![
            evaluation(0, Outcome::Pass, Outcome::Pass, 800.0),
            evaluation(1, Outcome::Fail, Outcome::SkipImprovement, 6200.0),
            evaluation(2, Outcome::Pass, Outcome::Fail, 900.0),
            evaluation(3, Outcome::Fail, Outcome::Fail, 700.0),
            evaluation(4, Outcome::Fail, Outcome::SkipImprovement, 5100.0),
        ]
    }

    #[test]
    fn test_latency_stats_from_samples() {
        let stats = LatencyStats::from_samples(vec![300.0, 100.0, 200.0]);

        assert_eq!(stats.min_ms, 100.0);
        assert_eq!(stats.max_ms, 300.0);
        assert_eq!(stats.p50_ms, 200.0);
        assert!((stats.avg_ms - 200.0).abs() < f64::EPSILON);
        assert_eq!(LatencyStats::from_samples(Vec::new()), LatencyStats::default());
    }

    #[test]
    fn test_counts() {
        let summary = RunSummary::from_evaluations(&sample());

        assert_eq!(summary.cases(), 5);
        assert_eq!(summary.assertions(), 10);
        assert_eq!(summary.passed(), 3);
        assert_eq!(summary.failed(), 5);
        assert_eq!(summary.improved(), 2);
        assert!(summary.has_failures());
    }

    #[test]
    fn test_lists_in_registry_order() {
        let mut evaluations = sample();
        evaluations.reverse();
        let summary = RunSummary::from_evaluations(&evaluations);

        let improvements: Vec<usize> = summary.improvements().iter().map(|c| c.index).collect();
        let slow: Vec<usize> = summary.slow_queries().iter().map(|s| s.case.index).collect();

        assert_eq!(improvements, vec![1, 4]);
        assert_eq!(summary.regressions().len(), 1);
        assert_eq!(summary.regressions()[0].index, 2);
        assert_eq!(slow, vec![1, 4]);
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let evaluations = sample();
        let forward = RunSummary::from_evaluations(&evaluations);

        let mut first = RunSummary::from_evaluations(&evaluations[3..]);
        let second = RunSummary::from_evaluations(&evaluations[..3]);
        first.merge(second);

        assert_eq!(forward.cases(), first.cases());
        assert_eq!(forward.regressions(), first.regressions());
        assert_eq!(forward.improvements(), first.improvements());
        assert_eq!(forward.slow_queries(), first.slow_queries());
        assert_eq!(forward.metrics(Approach::Rag), first.metrics(Approach::Rag));
        assert_eq!(forward.metrics(Approach::Old), first.metrics(Approach::Old));
    }

    #[test]
    fn test_unselected_assertions_are_not_counted() {
        let mut only_rag = evaluation(0, Outcome::Fail, Outcome::SkipImprovement, 100.0);
        only_rag.old_selected = false;
        let summary = RunSummary::from_evaluations([&only_rag]);

        assert_eq!(summary.assertions(), 1);
        assert_eq!(summary.failed(), 0);
        assert_eq!(summary.improved(), 1);
        assert!(summary.comparison().is_none());
    }

    #[test]
    fn test_comparison_deltas() {
        let summary = RunSummary::from_evaluations(&sample());
        let comparison = summary.comparison().unwrap();

        let old = summary.metrics(Approach::Old);
        let rag = summary.metrics(Approach::Rag);
        assert!((old.filter_decision_accuracy - 0.4).abs() < 1e-9);
        assert!((rag.filter_decision_accuracy - 0.6).abs() < 1e-9);
        assert!((comparison.filter_decision_improvement - 20.0).abs() < 1e-9);
        assert!(comparison.time_overhead_ms > 0.0);
    }
}
