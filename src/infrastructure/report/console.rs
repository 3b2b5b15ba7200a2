//! Console report in test-runner style

use std::fmt::Write;

use crate::domain::classifier::Approach;
use crate::domain::evaluation::{
    assertion_id, ApproachMetrics, CaseEvaluation, EvaluationResult, EvaluationRun, Outcome,
};

const WIDTH: usize = 70;

/// How much failure detail the console summary shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracebackStyle {
    /// Primary reason only
    #[default]
    Short,
    /// Every failed check plus the classifier response
    Long,
    /// No failure section
    No,
}

impl std::str::FromStr for TracebackStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" => Ok(TracebackStyle::Short),
            "long" => Ok(TracebackStyle::Long),
            "no" => Ok(TracebackStyle::No),
            other => Err(format!(
                "Unknown traceback style '{}' (expected short, long or no)",
                other
            )),
        }
    }
}

/// Renders a run as console text
#[derive(Debug, Clone, Default)]
pub struct ConsoleReporter {
    verbosity: u8,
    traceback: TracebackStyle,
}

impl ConsoleReporter {
    pub fn new(verbosity: u8, traceback: TracebackStyle) -> Self {
        Self {
            verbosity,
            traceback,
        }
    }

    pub fn render(&self, run: &EvaluationRun) -> String {
        let mut out = String::new();
        let summary = &run.summary;

        banner(&mut out, "category classification evaluation", '=');
        let _ = writeln!(
            out,
            "collected {} cases ({} assertions)",
            run.collected,
            summary.assertions()
        );
        if let Some(ref keyword) = run.selection.keyword {
            let _ = writeln!(out, "keyword selection: {}", keyword);
        }
        if let Some(ref marker) = run.selection.marker {
            let _ = writeln!(out, "marker selection: {}", marker);
        }
        out.push('\n');

        self.render_assertions(&mut out, run);

        if self.traceback != TracebackStyle::No && summary.has_failures() {
            self.render_failures(&mut out, run);
        }

        if !summary.improvements().is_empty() {
            banner(&mut out, "improvements (RAG passed where OLD failed)", '-');
            for case in summary.improvements() {
                let _ = writeln!(out, "  {}", case.id);
            }
        }

        if !summary.regressions().is_empty() {
            banner(&mut out, "regressions (OLD passed, RAG failed)", '-');
            for case in summary.regressions() {
                let _ = writeln!(out, "  {}", case.id);
            }
        }

        if !summary.slow_queries().is_empty() {
            banner(
                &mut out,
                &format!("slow RAG queries (> {:.0}ms)", run.slow_threshold_ms),
                '-',
            );
            for slow in summary.slow_queries() {
                let _ = writeln!(out, "  {} {:.0}ms", slow.case.id, slow.duration_ms);
            }
        }

        self.render_statistics(&mut out, run);

        if summary.has_failures() {
            banner(&mut out, "short test summary info", '=');
            for evaluation in &run.evaluations {
                for result in evaluation.assertions().filter(|r| r.outcome.is_fail()) {
                    let reason = result
                        .failure()
                        .map(|f| f.summary())
                        .unwrap_or("failed");
                    let _ = writeln!(
                        out,
                        "FAILED {} - {}",
                        assertion_id(&evaluation.test_case, result.approach),
                        reason
                    );
                }
            }
        }

        if run.stopped_early {
            let _ = writeln!(
                out,
                "!!! stopping after {} failures !!!",
                summary.failed()
            );
        }

        banner(&mut out, &final_line(run), '=');
        out
    }

    fn render_assertions(&self, out: &mut String, run: &EvaluationRun) {
        if self.verbosity == 0 {
            let mut line = String::new();
            for evaluation in &run.evaluations {
                for result in evaluation.assertions() {
                    line.push(match result.outcome {
                        Outcome::Pass => '.',
                        Outcome::Fail => 'F',
                        Outcome::SkipImprovement => 's',
                    });
                }
            }
            let _ = writeln!(out, "{}", line);
            return;
        }

        for evaluation in &run.evaluations {
            for result in evaluation.assertions() {
                let slow = if result.slow { " [SLOW]" } else { "" };
                let _ = writeln!(
                    out,
                    "{} {}{}",
                    assertion_id(&evaluation.test_case, result.approach),
                    result.outcome.label(),
                    slow
                );

                if self.verbosity > 1 {
                    write_response(out, result, "    ");
                }
            }
        }
    }

    fn render_failures(&self, out: &mut String, run: &EvaluationRun) {
        banner(out, "FAILURES", '=');

        for evaluation in &run.evaluations {
            for result in evaluation.assertions().filter(|r| r.outcome.is_fail()) {
                banner(
                    out,
                    &assertion_id(&evaluation.test_case, result.approach),
                    '_',
                );
                match self.traceback {
                    TracebackStyle::Long => write_long_failure(out, evaluation, result),
                    _ => {
                        if let Some(reason) = result.failure() {
                            let _ = writeln!(out, "E   {}", reason);
                        }
                    }
                }
            }
        }
    }

    fn render_statistics(&self, out: &mut String, run: &EvaluationRun) {
        let summary = &run.summary;

        for approach in Approach::ALL {
            let metrics = summary.metrics(approach);
            if metrics.assertions == 0 {
                continue;
            }
            banner(out, &format!("{} approach", approach.label()), '-');
            write_metrics(out, &metrics);
        }

        if let Some(comparison) = summary.comparison() {
            banner(out, "improvement (RAG vs OLD)", '-');
            let _ = writeln!(
                out,
                "Category Accuracy:        {}",
                signed_percent(comparison.accuracy_improvement)
            );
            let _ = writeln!(
                out,
                "Filter Decision Accuracy: {}",
                signed_percent(comparison.filter_decision_improvement)
            );
            let _ = writeln!(
                out,
                "Time Overhead:            {:+.0}ms",
                comparison.time_overhead_ms
            );
        }
    }
}

fn write_metrics(out: &mut String, metrics: &ApproachMetrics) {
    let _ = writeln!(
        out,
        "Category Accuracy:        {:.1}% ({}/{})",
        metrics.category_accuracy * 100.0,
        (metrics.category_accuracy * metrics.assertions as f64).round() as usize,
        metrics.assertions
    );
    let _ = writeln!(
        out,
        "Filter Decision Accuracy: {:.1}% ({}/{})",
        metrics.filter_decision_accuracy * 100.0,
        (metrics.filter_decision_accuracy * metrics.assertions as f64).round() as usize,
        metrics.assertions
    );
    let _ = writeln!(
        out,
        "Confidence Threshold Met: {:.1}%",
        metrics.confidence_met_rate * 100.0
    );
    let _ = writeln!(
        out,
        "Query Time:               avg {:.0}ms, p50 {:.0}ms, p95 {:.0}ms, max {:.0}ms",
        metrics.latency.avg_ms, metrics.latency.p50_ms, metrics.latency.p95_ms, metrics.latency.max_ms
    );
}

fn write_response(out: &mut String, result: &EvaluationResult, indent: &str) {
    let _ = writeln!(
        out,
        "{}category={} confidence={:.2} filter_applied={} time={:.0}ms",
        indent,
        result.detected_category.as_deref().unwrap_or("None"),
        result.confidence,
        result.filter_applied,
        result.duration_ms
    );
    if let Some(ref reasoning) = result.reasoning {
        let _ = writeln!(out, "{}reasoning: {}", indent, reasoning);
    }
}

fn write_long_failure(out: &mut String, evaluation: &CaseEvaluation, result: &EvaluationResult) {
    let case = &evaluation.test_case;
    let _ = writeln!(out, "query:               {}", case.query());
    let _ = writeln!(
        out,
        "expected category:   {}",
        case.expected_category().unwrap_or("None")
    );
    if !case.alternative_categories().is_empty() {
        let _ = writeln!(
            out,
            "alternatives:        {}",
            case.alternative_categories().join(", ")
        );
    }
    let _ = writeln!(out, "should apply filter: {}", case.should_apply_filter());
    let _ = writeln!(out, "min confidence:      {:.2}", case.min_confidence());
    if !case.notes().is_empty() {
        let _ = writeln!(out, "notes:               {}", case.notes());
    }
    write_response(out, result, "");
    for reason in &result.failures {
        let _ = writeln!(out, "E   {}", reason);
    }
}

fn signed_percent(value: f64) -> String {
    format!("{:+.1}%", value)
}

fn final_line(run: &EvaluationRun) -> String {
    let summary = &run.summary;
    let mut parts = Vec::new();

    if summary.failed() > 0 {
        parts.push(format!("{} failed", summary.failed()));
    }
    if summary.passed() > 0 {
        parts.push(format!("{} passed", summary.passed()));
    }
    if summary.improved() > 0 {
        parts.push(format!("{} skipped (improvement)", summary.improved()));
    }
    if !summary.slow_queries().is_empty() {
        parts.push(format!("{} slow", summary.slow_queries().len()));
    }
    if parts.is_empty() {
        parts.push("no assertions ran".to_string());
    }

    format!("{} in {:.2}s", parts.join(", "), run.duration_ms / 1000.0)
}

fn banner(out: &mut String, title: &str, fill: char) {
    let title = format!(" {} ", title);
    let len = title.chars().count();
    if len >= WIDTH {
        let _ = writeln!(out, "{}", title.trim());
        return;
    }
    let left = (WIDTH - len) / 2;
    let right = WIDTH - len - left;
    let _ = writeln!(
        out,
        "{}{}{}",
        fill.to_string().repeat(left),
        title,
        fill.to_string().repeat(right)
    );
}
