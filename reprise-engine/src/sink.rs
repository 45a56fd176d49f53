//! Metrics sinks.
//!
//! A sink receives one [`TurnReport`] per finished turn. Sinks are
//! fire-and-forget: the engine calls them through [`report_turn`], which
//! swallows panics so a broken sink never takes a turn down with it.

use reprise_types::{MetricsSink, TurnReport};
use std::panic::{AssertUnwindSafe, catch_unwind};

/// A [`MetricsSink`] that emits one `INFO` [`tracing`] event per turn.
///
/// ```
/// use reprise_engine::TracingMetricsSink;
/// use reprise_types::{Complexity, DurationMs, MetricsSink, TurnReport};
///
/// TracingMetricsSink::new().record(&TurnReport {
///     thinking_tokens: 1200,
///     continuation_count: 1,
///     duration: DurationMs::from_secs(4),
///     detected_complexity: Complexity::Moderate,
///     was_truncated: false,
/// });
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMetricsSink;

impl TracingMetricsSink {
    /// Create a new `TracingMetricsSink`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MetricsSink for TracingMetricsSink {
    fn record(&self, report: &TurnReport) {
        tracing::info!(
            thinking_tokens = report.thinking_tokens,
            continuation_count = report.continuation_count,
            duration_ms = report.duration.as_millis(),
            complexity = ?report.detected_complexity,
            was_truncated = report.was_truncated,
            "reprise.turn.metrics"
        );
    }
}

/// A [`MetricsSink`] that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn record(&self, _report: &TurnReport) {}
}

/// Hand `report` to `sink`, logging and discarding any panic.
pub fn report_turn(sink: &dyn MetricsSink, report: &TurnReport) {
    if catch_unwind(AssertUnwindSafe(|| sink.record(report))).is_err() {
        tracing::warn!("reprise.sink.panic");
    }
}
