//! Engine configuration.

use crate::merge::Overlap;
use reprise_reasoning::ExtractorConfig;
use reprise_tokens::ScriptRatios;
use reprise_types::{ProgressMeasure, TruncationReason};
use serde::{Deserialize, Serialize};

/// What to do when a turn targets a session another turn holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Wait for the other turn to release the session.
    #[default]
    Wait,
    /// Fail immediately with `SessionError::Busy`.
    Reject,
}

/// Instructions sent as the user message of a continuation request,
/// chosen by what the previous round left open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContinuationPrompts {
    /// Output hit the token limit.
    pub token_limit: String,
    /// A code block is still open.
    pub code_block: String,
    /// A JSON object or array is still open.
    pub structure: String,
    /// The text stopped mid-sentence.
    pub sentence: String,
}

impl Default for ContinuationPrompts {
    fn default() -> Self {
        Self {
            token_limit: "Your previous response was cut off by the output limit. Continue \
                          exactly where it stopped. Do not repeat anything already written."
                .into(),
            code_block: "Your previous response stopped inside a code block. Continue the \
                         code exactly where it stopped, without reopening the block, and \
                         close it when done."
                .into(),
            structure: "Your previous response stopped inside a JSON structure. Continue \
                        the JSON exactly where it stopped so the combined output is valid. \
                        Do not restart it."
                .into(),
            sentence: "Your previous response stopped mid-sentence. Continue exactly where \
                       it stopped."
                .into(),
        }
    }
}

impl ContinuationPrompts {
    /// The prompt for a round truncated by `reason`.
    pub fn for_reason(&self, reason: TruncationReason) -> &str {
        match reason {
            TruncationReason::IncompleteCodeBlock => &self.code_block,
            TruncationReason::UnbalancedStructure => &self.structure,
            TruncationReason::MidSentence => &self.sentence,
            _ => &self.token_limit,
        }
    }
}

/// Per-engine settings. Per-turn limits live in `BudgetConfig`.
///
/// ```
/// use reprise_engine::{ConflictPolicy, EngineConfig, Overlap};
/// use reprise_types::ProgressMeasure;
///
/// let config: EngineConfig = serde_json::from_str(r#"{"progress": "answer"}"#).unwrap();
/// assert_eq!(config.progress, ProgressMeasure::Answer);
/// assert_eq!(config.conflict_policy, ConflictPolicy::Wait);
/// assert_eq!(config.overlap, Overlap::Keep);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Continuation instructions.
    pub prompts: ContinuationPrompts,
    /// Which tokens count toward the anti-stall threshold.
    pub progress: ProgressMeasure,
    /// Concurrent access to one session.
    pub conflict_policy: ConflictPolicy,
    /// Whether a continuation's repeat of the previous tail is trimmed.
    pub overlap: Overlap,
    /// Reasoning format settings.
    pub extractor: ExtractorConfig,
    /// Token estimator ratios.
    pub ratios: ScriptRatios,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_follow_reason() {
        let prompts = ContinuationPrompts::default();
        assert!(prompts.for_reason(TruncationReason::IncompleteCodeBlock).contains("code block"));
        assert!(prompts.for_reason(TruncationReason::UnbalancedStructure).contains("JSON"));
        assert!(prompts.for_reason(TruncationReason::MidSentence).contains("mid-sentence"));
        assert!(prompts.for_reason(TruncationReason::TokenLimit).contains("output limit"));
    }

    #[test]
    fn overlap_trimming_is_opt_in() {
        let config: EngineConfig = serde_json::from_str(r#"{"overlap": "trim"}"#).unwrap();
        assert_eq!(config.overlap, Overlap::Trim);
        assert_eq!(EngineConfig::default().overlap, Overlap::Keep);
    }

    #[test]
    fn empty_json_is_default() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
