//! Observability infrastructure - run metrics

mod metrics;

pub use metrics::{init_metrics, record_assertion, record_slow_query, PrometheusMetrics};
