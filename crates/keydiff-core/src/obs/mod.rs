//! Observability: runtime counters for classification and apply operations.
//!
//! Orchestrator logic does not touch the metrics state directly; all
//! instrumentation flows through the sink boundary.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventReport, metrics_report, metrics_reset_all};
pub use sink::{MetricsEvent, MetricsSink, with_sink_override};
