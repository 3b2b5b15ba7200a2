//! Evaluation service - drives the evaluator over the selected test cases

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use tracing::{info, warn};

use crate::domain::evaluation::{
    CaseEvaluation, EvaluationRun, Evaluator, Outcome, SelectionInfo,
};
use crate::domain::test_case::{Selection, TestCaseRegistry};
use crate::infrastructure::observability::{record_assertion, record_slow_query};

#[cfg(test)]
use mockall::automock;

/// Called for every case with a failed assertion, before the run continues
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FailureInspector: Send + Sync {
    async fn inspect(&self, evaluation: &CaseEvaluation);
}

/// Resolve a worker count where 0 means one per available CPU
pub fn resolve_workers(requested: usize) -> usize {
    if requested > 0 {
        return requested;
    }

    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Runner options
#[derive(Debug, Clone)]
pub struct EvaluationOptions {
    /// Cases evaluated concurrently
    pub workers: usize,
    /// Stop scheduling once this many assertions failed
    pub maxfail: Option<usize>,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            maxfail: None,
        }
    }
}

impl EvaluationOptions {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_maxfail(mut self, maxfail: Option<usize>) -> Self {
        self.maxfail = maxfail.filter(|n| *n > 0);
        self
    }
}

/// Evaluation service running selected cases through the evaluator
pub struct EvaluationService {
    evaluator: Evaluator,
    options: EvaluationOptions,
    inspector: Option<Arc<dyn FailureInspector>>,
}

impl EvaluationService {
    pub fn new(evaluator: Evaluator, options: EvaluationOptions) -> Self {
        Self {
            evaluator,
            options,
            inspector: None,
        }
    }

    /// Pause on failures; forces sequential evaluation
    pub fn with_inspector(mut self, inspector: Arc<dyn FailureInspector>) -> Self {
        self.inspector = Some(inspector);
        self
    }

    fn workers(&self) -> usize {
        if self.inspector.is_some() {
            1
        } else {
            self.options.workers.max(1)
        }
    }

    /// Evaluate every selected case and collect the run
    pub async fn run(
        &self,
        registry: &TestCaseRegistry,
        selection: &Selection,
        selection_info: SelectionInfo,
    ) -> EvaluationRun {
        let started_at = Utc::now();
        let start = Instant::now();
        let selected = registry.select(selection);
        let collected = selected.len();
        let workers = self.workers();

        info!(
            cases = collected,
            workers,
            maxfail = ?self.options.maxfail,
            "Starting evaluation run"
        );

        let mut evaluations = Vec::with_capacity(collected);
        let mut failed = 0;
        let mut stopped_early = false;

        let mut stream = futures::stream::iter(selected.iter())
            .map(|case| self.evaluator.evaluate(case))
            .buffer_unordered(workers);

        while let Some(evaluation) = stream.next().await {
            self.observe(&evaluation);

            let case_failures = evaluation.failed_assertions();
            failed += case_failures;

            if case_failures > 0 {
                if let Some(ref inspector) = self.inspector {
                    inspector.inspect(&evaluation).await;
                }
            }

            evaluations.push(evaluation);

            if let Some(maxfail) = self.options.maxfail {
                if failed >= maxfail {
                    warn!(failed, maxfail, "Failure limit reached, stopping run");
                    stopped_early = true;
                    break;
                }
            }
        }
        drop(stream);

        let run = EvaluationRun::new(
            started_at,
            selection_info,
            self.evaluator.slow_threshold_ms(),
            collected,
            evaluations,
        )
        .with_stopped_early(stopped_early)
        .with_duration_ms(start.elapsed().as_secs_f64() * 1000.0);

        info!(
            run_id = %run.run_id,
            passed = run.summary.passed(),
            failed = run.summary.failed(),
            improved = run.summary.improved(),
            duration_ms = run.duration_ms,
            "Evaluation run finished"
        );

        run
    }

    fn observe(&self, evaluation: &CaseEvaluation) {
        let query = evaluation.test_case.query();

        for result in evaluation.assertions() {
            record_assertion(
                result.approach,
                result.outcome,
                Duration::from_secs_f64(result.duration_ms.max(0.0) / 1000.0),
            );

            match result.outcome {
                Outcome::Fail => warn!(
                    query,
                    approach = %result.approach,
                    outcome = %result.outcome,
                    duration_ms = result.duration_ms,
                    reason = result.failure().map(|f| f.summary()).unwrap_or("unknown"),
                    "Assertion failed"
                ),
                _ => info!(
                    query,
                    approach = %result.approach,
                    outcome = %result.outcome,
                    duration_ms = result.duration_ms,
                    "Assertion evaluated"
                ),
            }

            if result.slow {
                record_slow_query(result.approach);
                warn!(
                    query,
                    approach = %result.approach,
                    duration_ms = result.duration_ms,
                    threshold_ms = self.evaluator.slow_threshold_ms(),
                    "Slow classifier call"
                );
            }
        }
    }
}
