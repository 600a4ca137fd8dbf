//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Core logic never touches counters directly; every instrumentation point
//! emits a `MetricsEvent` into the injected `MetricsSink`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EntityCounters, EventOps, EventReport, MetricsRecorder};
pub use sink::{MetricsEvent, MetricsSink, NoopSink};
