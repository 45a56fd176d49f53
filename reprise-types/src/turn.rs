//! Turn-level types: the request, the state machine phases, metrics and result.

use crate::budget::BudgetConfig;
use crate::duration::DurationMs;
use crate::error::ConfigError;
use crate::id::SessionId;
use crate::message::Message;
use crate::reasoning::{ProviderFamily, ReasoningState, RoundThinking};
use crate::truncation::{TruncationInfo, TruncationReason};
use serde::{Deserialize, Serialize};

/// One logical user-intent exchange, before any physical request is sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRequest {
    /// Conversation so far, ending with the user's message.
    pub messages: Vec<Message>,
    /// Ceilings for this turn.
    #[serde(default)]
    pub budget: BudgetConfig,
    /// Provider identifier (`"anthropic"`, `"gemini-2.5-pro"`, ...).
    pub provider: String,
    /// Pin the reasoning format instead of deriving it from `provider`.
    #[serde(default)]
    pub family: Option<ProviderFamily>,
    /// Model override passed through to the transport.
    #[serde(default)]
    pub model: Option<String>,
    /// Opt into session tracking.
    #[serde(default)]
    pub session: Option<SessionId>,
    /// Provider-specific passthrough copied onto every physical request.
    #[serde(default)]
    pub extra: serde_json::Value,
}

impl TurnRequest {
    /// A request with default budgets and no session tracking.
    pub fn new(provider: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            messages,
            budget: BudgetConfig::default(),
            provider: provider.into(),
            family: None,
            model: None,
            session: None,
            extra: serde_json::Value::Null,
        }
    }

    /// Replace the budget.
    pub fn with_budget(mut self, budget: BudgetConfig) -> Self {
        self.budget = budget;
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Track reasoning state under a session.
    pub fn with_session(mut self, session: impl Into<SessionId>) -> Self {
        self.session = Some(session.into());
        self
    }

    /// Pin the reasoning format.
    pub fn with_family(mut self, family: ProviderFamily) -> Self {
        self.family = Some(family);
        self
    }

    /// The reasoning format for this turn.
    pub fn family(&self) -> ProviderFamily {
        self.family
            .unwrap_or_else(|| ProviderFamily::from_provider_id(&self.provider))
    }

    /// Model id used for session bookkeeping: the override, else the provider id.
    pub fn model_id(&self) -> &str {
        self.model.as_deref().unwrap_or(&self.provider)
    }

    /// Reject requests the engine cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.messages.is_empty() {
            return Err(ConfigError::EmptyConversation);
        }
        self.budget.validate()
    }
}

/// Engine state machine phases.
///
/// ```text
/// Pending -> AwaitingResponse -> Classifying -> Continuing -> AwaitingResponse ...
///                                           \-> Completed | Exhausted | Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// Nothing sent yet.
    Pending,
    /// Waiting on the transport.
    AwaitingResponse,
    /// Classifying and extracting the latest response.
    Classifying,
    /// Building the next continuation request.
    Continuing,
    /// Finished: complete answer.
    Completed,
    /// Finished: guards stopped the turn while still incomplete.
    Exhausted,
    /// Finished: non-recoverable.
    Failed,
}

impl TurnPhase {
    /// Whether no further transitions are allowed.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TurnPhase::Completed | TurnPhase::Exhausted | TurnPhase::Failed
        )
    }

    /// Whether `self -> next` is a legal transition.
    ///
    /// Cancellation and deadlines can end a turn while awaiting a response,
    /// so `AwaitingResponse` may also go straight to `Exhausted` or `Failed`.
    pub fn can_transition_to(&self, next: TurnPhase) -> bool {
        use TurnPhase::*;
        matches!(
            (*self, next),
            (Pending, AwaitingResponse)
                | (AwaitingResponse, Classifying)
                | (AwaitingResponse, Exhausted)
                | (AwaitingResponse, Failed)
                | (Classifying, Continuing)
                | (Classifying, Completed)
                | (Classifying, Exhausted)
                | (Classifying, Failed)
                | (Continuing, AwaitingResponse)
        )
    }
}

/// Coarse difficulty of a finished turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    /// Little reasoning, no continuations.
    #[default]
    Simple,
    /// In between.
    Moderate,
    /// Most of the thinking budget used, or several continuations.
    Complex,
}

impl Complexity {
    /// Derive complexity from reasoning usage and continuation count.
    ///
    /// Under a quarter of the thinking budget with no continuation is
    /// `Simple`; three quarters or more, or two continuations or more, is
    /// `Complex`.
    pub fn detect(thinking_tokens: u64, thinking_budget: u32, continuations: u32) -> Self {
        let budget = u64::from(thinking_budget.max(1));
        if thinking_tokens.saturating_mul(4) >= budget * 3 || continuations >= 2 {
            Complexity::Complex
        } else if thinking_tokens.saturating_mul(4) < budget && continuations == 0 {
            Complexity::Simple
        } else {
            Complexity::Moderate
        }
    }
}

/// Counters for one turn. Updated once per completed round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnMetrics {
    /// Reasoning tokens across all rounds.
    pub thinking_tokens: u64,
    /// Answer tokens across all rounds.
    pub answer_tokens: u64,
    /// Continuation requests issued.
    pub continuation_count: u32,
    /// Physical requests issued, including one that was cancelled mid-flight.
    pub physical_requests: u32,
    /// Wall-clock time for the turn.
    pub duration: DurationMs,
    /// Derived difficulty.
    pub detected_complexity: Complexity,
}

/// The best-available merged response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutput {
    /// Answer text concatenated across rounds, repaired if the turn ended incomplete.
    pub answer: String,
    /// Per-round thinking, in request order.
    pub thinking: Vec<RoundThinking>,
    /// Latest provider continuation state.
    pub reasoning_state: Option<ReasoningState>,
    /// Classification of the final round, `None` if no response arrived.
    pub last_truncation: Option<TruncationInfo>,
    /// Whether the repairer changed the answer.
    pub repaired: bool,
}

impl TurnOutput {
    /// Thinking text of every round, joined for display.
    pub fn thinking_text(&self) -> String {
        self.thinking
            .iter()
            .map(|r| r.content.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Why guards stopped an incomplete turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExhaustionCause {
    /// `max_continuations` reached.
    MaxContinuations,
    /// `max_duration` elapsed.
    Deadline,
    /// The last round produced fewer tokens than `min_progress_tokens`.
    Stalled {
        /// Tokens the round produced.
        produced: u64,
        /// Threshold it missed.
        required: u32,
    },
    /// The caller cancelled the turn.
    Cancelled,
}

/// Why a turn failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum FailureCause {
    /// A terminal classification (filter, recitation, refusal, context window).
    Truncation(TruncationReason),
    /// The transport failed.
    Transport(String),
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// Complete answer.
    Success,
    /// Stopped while still incomplete.
    Truncated {
        /// Guard that fired.
        cause: ExhaustionCause,
        /// Last classification seen, `None` if the turn stopped before any
        /// response was classified.
        reason: Option<TruncationReason>,
    },
    /// Non-recoverable.
    Failed {
        /// What went wrong.
        cause: FailureCause,
    },
}

/// Terminal output of the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResult {
    /// How the turn ended.
    pub outcome: TurnOutcome,
    /// Best-available merged response.
    pub output: TurnOutput,
    /// Final counters.
    pub metrics: TurnMetrics,
}

impl TurnResult {
    /// Whether the turn completed.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TurnOutcome::Success)
    }

    /// Whether guards stopped the turn while incomplete.
    pub fn is_truncated(&self) -> bool {
        matches!(self.outcome, TurnOutcome::Truncated { .. })
    }

    /// Whether the turn failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, TurnOutcome::Failed { .. })
    }

    /// The terminal classification, for failed turns.
    pub fn failure_reason(&self) -> Option<TruncationReason> {
        match &self.outcome {
            TurnOutcome::Failed {
                cause: FailureCause::Truncation(reason),
            } => Some(*reason),
            _ => None,
        }
    }

    /// Telemetry tuple for a [`MetricsSink`](crate::MetricsSink).
    pub fn report(&self) -> TurnReport {
        TurnReport {
            thinking_tokens: self.metrics.thinking_tokens,
            continuation_count: self.metrics.continuation_count,
            duration: self.metrics.duration,
            detected_complexity: self.metrics.detected_complexity,
            was_truncated: !self.is_success(),
        }
    }
}

/// Per-turn telemetry tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    /// Reasoning tokens across the turn.
    pub thinking_tokens: u64,
    /// Continuation requests issued.
    pub continuation_count: u32,
    /// Wall-clock time.
    pub duration: DurationMs,
    /// Derived difficulty.
    pub detected_complexity: Complexity,
    /// Whether the turn ended without a complete answer.
    pub was_truncated: bool,
}
