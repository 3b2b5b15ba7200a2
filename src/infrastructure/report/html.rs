//! Self-contained HTML report

use std::fmt::Write;

use super::escape;
use crate::domain::classifier::Approach;
use crate::domain::evaluation::{assertion_id, EvaluationRun, Outcome};

const STYLE: &str = "body{font-family:sans-serif;margin:2em;color:#222}\
table{border-collapse:collapse;margin-bottom:1.5em}\
th,td{border:1px solid #ccc;padding:4px 8px;text-align:left;vertical-align:top}\
th{background:#f0f0f0}\
.pass{color:#1a7f37}.fail{color:#cf222e}.skip{color:#9a6700}\
.slow{font-weight:bold;color:#8250df}";

fn outcome_class(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Pass => "pass",
        Outcome::Fail => "fail",
        Outcome::SkipImprovement => "skip",
    }
}

/// Render a run as a single HTML document with inline styles
pub fn to_html(run: &EvaluationRun) -> String {
    let summary = &run.summary;
    let mut out = String::new();

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">");
    out.push_str("<title>Category classification evaluation</title>");
    let _ = write!(out, "<style>{}</style></head><body>", STYLE);
    out.push_str("<h1>Category classification evaluation</h1>");

    let _ = write!(
        out,
        "<p>Run <code>{}</code> started {} &middot; {:.2}s</p>",
        escape(run.run_id.as_str()),
        escape(&run.started_at.to_rfc3339()),
        run.duration_ms / 1000.0
    );
    if let Some(ref keyword) = run.selection.keyword {
        let _ = write!(out, "<p>Keyword selection: <code>{}</code></p>", escape(keyword));
    }
    if let Some(ref marker) = run.selection.marker {
        let _ = write!(out, "<p>Marker selection: <code>{}</code></p>", escape(marker));
    }

    out.push_str("<h2>Summary</h2><table>");
    let rows = [
        ("Test cases", summary.cases().to_string()),
        ("Assertions", summary.assertions().to_string()),
        ("Passed", summary.passed().to_string()),
        ("Failed", summary.failed().to_string()),
        ("Skipped (improvement)", summary.improved().to_string()),
        ("Slow RAG queries", summary.slow_queries().len().to_string()),
    ];
    for (label, value) in rows {
        let _ = write!(out, "<tr><th>{}</th><td>{}</td></tr>", label, value);
    }
    out.push_str("</table>");
    if run.stopped_early {
        out.push_str("<p class=\"fail\">Run stopped early after reaching the failure limit.</p>");
    }

    out.push_str("<h2>Approaches</h2><table><tr><th>Approach</th><th>Category accuracy</th>");
    out.push_str("<th>Filter decision accuracy</th><th>Confidence met</th>");
    out.push_str("<th>Avg time</th><th>p95 time</th></tr>");
    for approach in Approach::ALL {
        let metrics = summary.metrics(approach);
        if metrics.assertions == 0 {
            continue;
        }
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{:.1}%</td><td>{:.1}%</td><td>{:.1}%</td><td>{:.0}ms</td><td>{:.0}ms</td></tr>",
            escape(approach.label()),
            metrics.category_accuracy * 100.0,
            metrics.filter_decision_accuracy * 100.0,
            metrics.confidence_met_rate * 100.0,
            metrics.latency.avg_ms,
            metrics.latency.p95_ms
        );
    }
    out.push_str("</table>");

    if let Some(comparison) = summary.comparison() {
        let _ = write!(
            out,
            "<p>RAG vs OLD: category accuracy {:+.1}%, filter decision accuracy {:+.1}%, time overhead {:+.0}ms</p>",
            comparison.accuracy_improvement,
            comparison.filter_decision_improvement,
            comparison.time_overhead_ms
        );
    }

    for (title, cases) in [
        ("Improvements", summary.improvements()),
        ("Regressions", summary.regressions()),
    ] {
        if cases.is_empty() {
            continue;
        }
        let _ = write!(out, "<h2>{}</h2><ul>", title);
        for case in cases {
            let _ = write!(out, "<li>{}</li>", escape(&case.id));
        }
        out.push_str("</ul>");
    }

    out.push_str("<h2>Results</h2><table><tr><th>Assertion</th><th>Outcome</th>");
    out.push_str("<th>Expected</th><th>Detected</th><th>Confidence</th><th>Filter</th>");
    out.push_str("<th>Time</th><th>Details</th></tr>");
    for evaluation in &run.evaluations {
        let case = &evaluation.test_case;
        for result in evaluation.assertions() {
            let mut details: Vec<String> = result.failures.iter().map(|f| escape(&f.to_string())).collect();
            if let Some(ref reasoning) = result.reasoning {
                details.push(format!("<em>{}</em>", escape(reasoning)));
            }

            let slow = if result.slow {
                " <span class=\"slow\">SLOW</span>"
            } else {
                ""
            };

            let _ = write!(
                out,
                "<tr><td>{}</td><td class=\"{}\">{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td>{}</td><td>{:.0}ms{}</td><td>{}</td></tr>",
                escape(&assertion_id(case, result.approach)),
                outcome_class(result.outcome),
                result.outcome.label(),
                escape(case.expected_category().unwrap_or("None")),
                escape(result.detected_category.as_deref().unwrap_or("None")),
                result.confidence,
                result.filter_applied,
                result.duration_ms,
                slow,
                details.join("<br>")
            );
        }
    }
    out.push_str("</table></body></html>\n");

    out
}
