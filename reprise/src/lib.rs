#![deny(missing_docs)]
//! # reprise — umbrella crate
//!
//! Single import surface for reprise: the turn completion engine, its
//! standalone components (classifier, extractor, repairer, estimator) and
//! session backends, each behind a feature flag, plus a `prelude` for the
//! happy path.
//!
//! ```
//! use reprise::prelude::*;
//!
//! let info = TruncationClassifier::new().classify(&ProviderResponse::new("max_tokens", "And so"));
//! assert_eq!(info.reason, TruncationReason::TokenLimit);
//!
//! let fixed = ContentRepairer::new().repair("[1, 2");
//! assert_eq!(fixed.repaired_text, "[1, 2]");
//! ```

#[cfg(feature = "core")]
pub use reprise_classify;
#[cfg(feature = "engine")]
pub use reprise_engine;
#[cfg(feature = "core")]
pub use reprise_reasoning;
#[cfg(feature = "core")]
pub use reprise_repair;
#[cfg(feature = "state-memory")]
pub use reprise_state_memory;
#[cfg(feature = "core")]
pub use reprise_tokens;
#[cfg(feature = "core")]
pub use reprise_types;

/// Happy-path imports for running turns.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use reprise_types::{
        BudgetConfig, DurationMs, ExhaustionCause, FailureCause, Message, MetricsSink,
        ProviderFamily, ProviderRequest, ProviderResponse, ReasoningState, SessionError,
        SessionId, SessionStore, ThinkingState, TokenUsage, Transport, TransportError,
        TruncationInfo, TruncationReason, TurnError, TurnOutcome, TurnRequest, TurnResult,
    };

    #[cfg(feature = "core")]
    pub use reprise_classify::TruncationClassifier;

    #[cfg(feature = "core")]
    pub use reprise_reasoning::{ReasoningExtractor, ReasoningFormat};

    #[cfg(feature = "core")]
    pub use reprise_repair::ContentRepairer;

    #[cfg(feature = "core")]
    pub use reprise_tokens::{TokenCounter, TokenEstimator};

    #[cfg(feature = "engine")]
    pub use reprise_engine::{
        ConflictPolicy, EngineConfig, NoopMetricsSink, TracingMetricsSink, TurnEngine,
    };

    #[cfg(feature = "state-memory")]
    pub use reprise_state_memory::MemorySessionStore;
}
