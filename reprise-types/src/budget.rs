//! Per-turn budget configuration.

use crate::duration::DurationMs;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Ceilings for one turn.
///
/// Every field has a documented default, so a partial JSON object
/// deserializes into a usable budget:
///
/// ```
/// use reprise_types::BudgetConfig;
///
/// let budget: BudgetConfig = serde_json::from_str(r#"{"max_continuations": 2}"#).unwrap();
/// assert_eq!(budget.max_continuations, 2);
/// assert_eq!(budget.answer_budget, 4096);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Reasoning-token ceiling forwarded on each physical request.
    pub thinking_budget: u32,
    /// Answer-token ceiling forwarded on each physical request.
    pub answer_budget: u32,
    /// Continuation requests allowed after the first. `0` means single-shot.
    pub max_continuations: u32,
    /// Wall-clock ceiling for the whole turn.
    pub max_duration: DurationMs,
    /// A recoverable round producing fewer new tokens than this stops the turn.
    pub min_progress_tokens: u32,
}

impl BudgetConfig {
    /// Default reasoning-token ceiling.
    pub const DEFAULT_THINKING_BUDGET: u32 = 4096;
    /// Default answer-token ceiling.
    pub const DEFAULT_ANSWER_BUDGET: u32 = 4096;
    /// Default continuation ceiling.
    pub const DEFAULT_MAX_CONTINUATIONS: u32 = 5;
    /// Default wall-clock ceiling (10 minutes).
    pub const DEFAULT_MAX_DURATION: DurationMs = DurationMs::from_mins(10);
    /// Default anti-stall threshold.
    pub const DEFAULT_MIN_PROGRESS_TOKENS: u32 = 100;

    /// A budget that never continues: one physical request per turn.
    pub fn single_shot() -> Self {
        Self {
            max_continuations: 0,
            ..Self::default()
        }
    }

    /// Reject budgets the engine cannot honour.
    ///
    /// `max_continuations` may be zero; every other field must be positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thinking_budget == 0 {
            return Err(ConfigError::ZeroBudget("thinking_budget"));
        }
        if self.answer_budget == 0 {
            return Err(ConfigError::ZeroBudget("answer_budget"));
        }
        if self.max_duration.is_zero() {
            return Err(ConfigError::ZeroBudget("max_duration"));
        }
        if self.min_progress_tokens == 0 {
            return Err(ConfigError::ZeroBudget("min_progress_tokens"));
        }
        Ok(())
    }
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            thinking_budget: Self::DEFAULT_THINKING_BUDGET,
            answer_budget: Self::DEFAULT_ANSWER_BUDGET,
            max_continuations: Self::DEFAULT_MAX_CONTINUATIONS,
            max_duration: Self::DEFAULT_MAX_DURATION,
            min_progress_tokens: Self::DEFAULT_MIN_PROGRESS_TOKENS,
        }
    }
}

/// Which tokens count as progress for the anti-stall guard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressMeasure {
    /// Thinking and answer tokens together.
    #[default]
    Both,
    /// Thinking tokens only.
    Thinking,
    /// Answer tokens only.
    Answer,
}

impl ProgressMeasure {
    /// Tokens a round contributed under this measure.
    pub fn progress(&self, thinking_tokens: u64, answer_tokens: u64) -> u64 {
        match self {
            ProgressMeasure::Both => thinking_tokens.saturating_add(answer_tokens),
            ProgressMeasure::Thinking => thinking_tokens,
            ProgressMeasure::Answer => answer_tokens,
        }
    }
}
