//! JUnit XML report: one testsuite, one testcase per assertion

use super::escape;
use crate::domain::evaluation::{EvaluationRun, Outcome};

const SUITE_NAME: &str = "category_classification";

pub fn to_junit(run: &EvaluationRun) -> String {
    let summary = &run.summary;
    let mut out = String::new();

    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<testsuites><testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"{}\" time=\"{:.3}\" timestamp=\"{}\">",
        SUITE_NAME,
        summary.assertions(),
        summary.failed(),
        summary.improved(),
        run.duration_ms / 1000.0,
        escape(&run.started_at.to_rfc3339())
    ));

    for evaluation in &run.evaluations {
        for result in evaluation.assertions() {
            out.push_str(&format!(
                "<testcase classname=\"{}.{}\" name=\"{}\" time=\"{:.3}\">",
                SUITE_NAME,
                result.approach,
                escape(&evaluation.test_case.id()),
                result.duration_ms / 1000.0
            ));

            match result.outcome {
                Outcome::Pass => {}
                Outcome::SkipImprovement => {
                    out.push_str("<skipped message=\"improvement: RAG passed where OLD failed\"/>");
                }
                Outcome::Fail => {
                    let message = result
                        .failure()
                        .map(|f| f.to_string())
                        .unwrap_or_else(|| "failed".to_string());
                    let detail = result
                        .failures
                        .iter()
                        .map(|f| f.to_string())
                        .collect::<Vec<_>>()
                        .join("\n");
                    out.push_str(&format!(
                        "<failure message=\"{}\">{}</failure>",
                        escape(&message),
                        escape(&detail)
                    ));
                }
            }

            if result.slow {
                out.push_str(&format!(
                    "<system-out>SLOW: {:.0}ms exceeds {:.0}ms threshold</system-out>",
                    result.duration_ms, run.slow_threshold_ms
                ));
            }

            out.push_str("</testcase>");
        }
    }

    out.push_str("</testsuite></testsuites>\n");
    out
}
