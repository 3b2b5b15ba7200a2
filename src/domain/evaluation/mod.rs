//! Evaluation domain - decision rules, outcomes and run aggregation

mod evaluator;
mod result;
mod run;
mod summary;

pub use evaluator::{
    apply_comparison, category_matches, failure_reasons, run_checks, Evaluator,
    DEFAULT_SLOW_THRESHOLD_MS,
};
pub use result::{CaseEvaluation, Checks, EvaluationResult, FailureReason, Outcome};
pub use run::{assertion_id, EvaluationRun, RunId, SelectionInfo};
pub use summary::{
    ApproachMetrics, ApproachStats, CaseRef, Comparison, LatencyStats, RunSummary, SlowQuery,
};
