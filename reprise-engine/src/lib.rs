#![deny(missing_docs)]
//! Turn completion engine for reprise.
//!
//! This crate provides:
//! - [`TurnEngine`]: drives one logical turn through as many physical
//!   requests as it takes to finish the answer
//! - [`TurnEngineBuilder`]: builder for wiring a session store, metrics sink and config
//! - [`EngineConfig`]: continuation prompts, progress measure, conflict policy,
//!   overlap handling
//! - [`merge`]: how continuation answers are joined
//! - [`TracingMetricsSink`] / [`NoopMetricsSink`]: stock [`MetricsSink`](reprise_types::MetricsSink)s
//!
//! A turn alternates between awaiting a response and classifying it. A
//! truncated response triggers a continuation request carrying the merged
//! answer so far and the latest reasoning state; the loop stops when a
//! response completes, a terminal stop (refusal, content filter) arrives,
//! or a budget guard trips. Budget exhaustion is an outcome, not an error:
//! the caller always gets the best answer the engine could assemble.

pub mod config;
mod engine;
pub mod merge;
pub mod sink;

pub use config::{ConflictPolicy, ContinuationPrompts, EngineConfig};
pub use merge::Overlap;
pub use engine::{TurnEngine, TurnEngineBuilder};
pub use sink::{NoopMetricsSink, TracingMetricsSink, report_turn};
