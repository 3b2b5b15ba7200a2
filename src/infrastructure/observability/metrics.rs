//! Prometheus metrics for evaluation runs

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::domain::classifier::Approach;
use crate::domain::evaluation::Outcome;
use crate::domain::DomainError;

/// Prometheus metrics handle used to export the run metrics
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics in Prometheus text exposition format
    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Write the rendered metrics to a file
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), DomainError> {
        let path = path.as_ref();
        std::fs::write(path, self.render()).map_err(|e| {
            DomainError::report(format!(
                "Failed to write metrics to {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!(path = %path.display(), "Metrics written");
        Ok(())
    }
}

/// Install the Prometheus recorder; metrics are no-ops when it is absent
pub fn init_metrics(enabled: bool) -> Option<PrometheusMetrics> {
    if !enabled {
        tracing::debug!("Prometheus metrics disabled");
        return None;
    }

    let builder = PrometheusBuilder::new();

    match builder.install_recorder() {
        Ok(handle) => {
            register_default_metrics();

            tracing::debug!("Prometheus metrics recorder installed");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

fn register_default_metrics() {
    gauge!("category_eval_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record one assertion and the adapter call behind it
pub fn record_assertion(approach: Approach, outcome: Outcome, duration: Duration) {
    counter!(
        "eval_assertions_total",
        "approach" => approach.as_str(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
    histogram!("eval_adapter_duration_seconds", "approach" => approach.as_str())
        .record(duration.as_secs_f64());
}

/// Record a call over the slow threshold
pub fn record_slow_query(approach: Approach) {
    counter!("eval_slow_queries_total", "approach" => approach.as_str()).increment(1);
}
