//! Token count estimation from text and messages.

use crate::script::{Script, ScriptRatios};
use reprise_types::Message;

/// Fixed per-message overhead for role markers and formatting.
pub const MESSAGE_OVERHEAD_TOKENS: u64 = 4;

/// Counts tokens for budget decisions.
pub trait TokenCounter: Send + Sync {
    /// Tokens in a text fragment.
    fn count_text(&self, text: &str) -> u64;

    /// Tokens in a message, including its fixed overhead.
    fn count_message(&self, message: &Message) -> u64 {
        MESSAGE_OVERHEAD_TOKENS + self.count_text(&message.content)
    }

    /// Tokens in a conversation.
    fn count_messages(&self, messages: &[Message]) -> u64 {
        messages.iter().map(|m| self.count_message(m)).sum()
    }

    /// Whether this counter handles the given model.
    fn supports_model(&self, model_id: &str) -> bool;
}

/// Script-aware heuristic estimator. Works for every model.
///
/// # Example
///
/// ```
/// use reprise_tokens::{TokenCounter, TokenEstimator};
///
/// let estimator = TokenEstimator::new();
/// // 12 Latin characters at 4 per token
/// assert_eq!(estimator.count_text("Hello, world"), 3);
/// // 4 ideographs at 1.5 per token, rounded up
/// assert_eq!(estimator.count_text("中文字符"), 3);
/// assert_eq!(estimator.count_text(""), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TokenEstimator {
    ratios: ScriptRatios,
}

impl TokenEstimator {
    /// Estimator with the default ratios.
    pub fn new() -> Self {
        Self::default()
    }

    /// Estimator with custom ratios.
    pub fn with_ratios(ratios: ScriptRatios) -> Self {
        Self { ratios }
    }

    /// Ratios in use.
    pub fn ratios(&self) -> &ScriptRatios {
        &self.ratios
    }

    fn script_counts(text: &str) -> [u64; 5] {
        let mut counts = [0u64; 5];
        for c in text.chars() {
            if let Some(script) = Script::of(c) {
                counts[slot(script)] += 1;
            }
        }
        counts
    }
}

fn slot(script: Script) -> usize {
    match script {
        Script::Latin => 0,
        Script::Hangul => 1,
        Script::Kana => 2,
        Script::Cjk => 3,
        Script::Other => 4,
    }
}

const SCRIPTS: [Script; 5] = [
    Script::Latin,
    Script::Hangul,
    Script::Kana,
    Script::Cjk,
    Script::Other,
];

impl TokenCounter for TokenEstimator {
    fn count_text(&self, text: &str) -> u64 {
        if text.is_empty() {
            return 0;
        }
        let counts = Self::script_counts(text);
        let estimate: f64 = SCRIPTS
            .iter()
            .map(|&s| counts[slot(s)] as f64 / self.ratios.ratio(s))
            .sum();
        estimate.ceil() as u64
    }

    fn supports_model(&self, _model_id: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_and_controls_are_free() {
        let estimator = TokenEstimator::new();
        assert_eq!(estimator.count_text("   \n\t  "), 0);
        assert_eq!(estimator.count_text("abcd"), 1);
        assert_eq!(estimator.count_text("a b c d"), 1);
    }

    #[test]
    fn rounds_up() {
        let estimator = TokenEstimator::new();
        assert_eq!(estimator.count_text("a"), 1);
        assert_eq!(estimator.count_text("abcde"), 2);
    }

    #[test]
    fn mixed_scripts_sum_per_class() {
        let estimator = TokenEstimator::new();
        // 8 Latin (2.0) + 4 Hangul (2.0) + 3 CJK (2.0) = 6
        assert_eq!(estimator.count_text("abcdefgh 안녕하세 中文字"), 6);
    }

    #[test]
    fn message_adds_overhead() {
        let estimator = TokenEstimator::new();
        let message = Message::user("abcdefgh");
        assert_eq!(estimator.count_message(&message), MESSAGE_OVERHEAD_TOKENS + 2);
        assert_eq!(
            estimator.count_messages(&[message.clone(), message]),
            2 * (MESSAGE_OVERHEAD_TOKENS + 2)
        );
    }

    #[test]
    fn custom_ratios_apply() {
        let estimator = TokenEstimator::with_ratios(ScriptRatios {
            latin: 1.0,
            ..Default::default()
        });
        assert_eq!(estimator.count_text("abcd"), 4);
    }

    #[test]
    fn supports_every_model() {
        let estimator = TokenEstimator::new();
        assert!(estimator.supports_model("gpt-5"));
        assert!(estimator.supports_model(""));
    }
}
