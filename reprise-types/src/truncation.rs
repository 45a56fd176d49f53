//! Truncation classification results.

use serde::{Deserialize, Serialize};

/// Why a response is considered incomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationReason {
    /// Not truncated.
    None,
    /// Output hit the provider's token limit.
    TokenLimit,
    /// Unclosed `{` or `[` in the emitted text.
    UnbalancedStructure,
    /// Opening code fence without a closing fence.
    IncompleteCodeBlock,
    /// Text stops without terminal punctuation.
    MidSentence,
    /// Safety filter stopped generation.
    ContentFiltered,
    /// Output blocked for reproducing source material.
    Recitation,
    /// The model declined to answer.
    Refusal,
    /// Prompt plus output exceeded the context window.
    ContextWindowExceeded,
}

impl TruncationReason {
    /// Reasons that are never retried.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TruncationReason::ContentFiltered
                | TruncationReason::Recitation
                | TruncationReason::Refusal
                | TruncationReason::ContextWindowExceeded
        )
    }

    /// Reasons that make a response a continuation candidate.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TruncationReason::TokenLimit
                | TruncationReason::UnbalancedStructure
                | TruncationReason::IncompleteCodeBlock
                | TruncationReason::MidSentence
        )
    }
}

impl std::fmt::Display for TruncationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TruncationReason::None => "none",
            TruncationReason::TokenLimit => "token_limit",
            TruncationReason::UnbalancedStructure => "unbalanced_structure",
            TruncationReason::IncompleteCodeBlock => "incomplete_code_block",
            TruncationReason::MidSentence => "mid_sentence",
            TruncationReason::ContentFiltered => "content_filtered",
            TruncationReason::Recitation => "recitation",
            TruncationReason::Refusal => "refusal",
            TruncationReason::ContextWindowExceeded => "context_window_exceeded",
        };
        f.write_str(s)
    }
}

/// Classification of one physical response.
///
/// `reason` is [`TruncationReason::None`] exactly when `is_truncated` is
/// false. Build values through [`TruncationInfo::complete`] and
/// [`TruncationInfo::truncated`] to keep that true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncationInfo {
    /// Whether the response is incomplete.
    pub is_truncated: bool,
    /// The single reason assigned.
    pub reason: TruncationReason,
    /// Human-readable detail (the signal seen, the open delimiter, ...).
    pub details: Option<String>,
}

impl TruncationInfo {
    /// A complete response.
    pub fn complete() -> Self {
        Self {
            is_truncated: false,
            reason: TruncationReason::None,
            details: None,
        }
    }

    /// A truncated response. Passing [`TruncationReason::None`] yields a complete one.
    pub fn truncated(reason: TruncationReason, details: impl Into<String>) -> Self {
        if reason == TruncationReason::None {
            return Self::complete();
        }
        Self {
            is_truncated: true,
            reason,
            details: Some(details.into()),
        }
    }

    /// Whether the engine must stop without continuing.
    pub fn is_terminal(&self) -> bool {
        self.is_truncated && self.reason.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TruncationReason; 9] = [
        TruncationReason::None,
        TruncationReason::TokenLimit,
        TruncationReason::UnbalancedStructure,
        TruncationReason::IncompleteCodeBlock,
        TruncationReason::MidSentence,
        TruncationReason::ContentFiltered,
        TruncationReason::Recitation,
        TruncationReason::Refusal,
        TruncationReason::ContextWindowExceeded,
    ];

    #[test]
    fn every_truncating_reason_is_terminal_xor_recoverable() {
        for reason in ALL {
            if reason == TruncationReason::None {
                assert!(!reason.is_terminal() && !reason.is_recoverable());
            } else {
                assert_ne!(reason.is_terminal(), reason.is_recoverable(), "{reason}");
            }
        }
    }

    #[test]
    fn truncated_with_none_reason_is_complete() {
        let info = TruncationInfo::truncated(TruncationReason::None, "ignored");
        assert_eq!(info, TruncationInfo::complete());
    }

    #[test]
    fn display_matches_serde_name() {
        for reason in ALL {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{reason}\""));
        }
    }
}
