#![deny(missing_docs)]
//! # reprise-types — protocol types for turn completion
//!
//! Everything the turn completion engine and its components exchange:
//!
//! | Concern | Types |
//! |---------|-------|
//! | Wire-neutral messages | [`Message`], [`ProviderRequest`], [`ProviderResponse`], [`TokenUsage`] |
//! | Budgets | [`BudgetConfig`], [`ProgressMeasure`] |
//! | Classification | [`TruncationInfo`], [`TruncationReason`] |
//! | Reasoning | [`ThinkingContent`], [`ReasoningState`], [`ProviderFamily`] |
//! | Sessions | [`ThinkingState`], [`SessionStore`], [`SessionGuard`] |
//! | Results | [`TurnResult`], [`TurnOutcome`], [`TurnMetrics`], [`TurnReport`] |
//! | Collaborators | [`Transport`], [`MetricsSink`] |
//!
//! The engine never opens sockets. Callers hand it a [`Transport`] that
//! already speaks the provider's wire format; this crate only fixes the
//! fields the engine reads and writes.

pub mod budget;
pub mod duration;
pub mod error;
pub mod id;
pub mod message;
pub mod reasoning;
pub mod session;
pub mod traits;
pub mod truncation;
pub mod turn;

pub use budget::{BudgetConfig, ProgressMeasure};
pub use duration::DurationMs;
pub use error::{ConfigError, SessionError, TransportError, TurnError};
pub use id::SessionId;
pub use message::{Message, ProviderRequest, ProviderResponse, Role, TokenUsage};
pub use reasoning::{ProviderFamily, ReasoningState, RoundThinking, ThinkingContent};
pub use session::{SessionGuard, SessionStore, ThinkingState};
pub use traits::{MetricsSink, Transport};
pub use truncation::{TruncationInfo, TruncationReason};
pub use turn::{
    Complexity, ExhaustionCause, FailureCause, TurnMetrics, TurnOutcome, TurnOutput, TurnPhase,
    TurnReport, TurnRequest, TurnResult,
};
