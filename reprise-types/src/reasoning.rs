//! Reasoning payloads: extracted thinking text and opaque continuation state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The reasoning format a provider speaks.
///
/// Selected from the provider identifier on the turn request. Adding a
/// provider means adding a variant here and an extractor for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderFamily {
    /// Ordered typed blocks with signed thinking and redacted payloads.
    Anthropic,
    /// A dedicated reasoning field plus an encrypted continuation token.
    OpenAi,
    /// Thought-flagged parts plus a thought signature.
    Gemini,
    /// Reasoning inline in the answer between start/end delimiters. Stateless.
    Tagged,
}

impl ProviderFamily {
    /// Map a provider identifier to its reasoning format.
    ///
    /// Matching is case-insensitive on the identifier's leading segment.
    /// Unknown identifiers fall back to [`ProviderFamily::Tagged`], which
    /// extracts nothing when no delimiters are present.
    ///
    /// ```
    /// use reprise_types::ProviderFamily;
    ///
    /// assert_eq!(ProviderFamily::from_provider_id("claude-sonnet-4"), ProviderFamily::Anthropic);
    /// assert_eq!(ProviderFamily::from_provider_id("o3-mini"), ProviderFamily::OpenAi);
    /// assert_eq!(ProviderFamily::from_provider_id("deepseek-r1"), ProviderFamily::Tagged);
    /// ```
    pub fn from_provider_id(id: &str) -> Self {
        let id = id.trim().to_ascii_lowercase();
        let head = id.split(['/', ':']).next().unwrap_or_default();
        if head.starts_with("anthropic") || head.starts_with("claude") {
            ProviderFamily::Anthropic
        } else if head.starts_with("openai")
            || head.starts_with("azure")
            || head.starts_with("gpt")
            || head.starts_with("o1")
            || head.starts_with("o3")
            || head.starts_with("o4")
        {
            ProviderFamily::OpenAi
        } else if head.starts_with("gemini")
            || head.starts_with("google")
            || head.starts_with("vertex")
        {
            ProviderFamily::Gemini
        } else {
            ProviderFamily::Tagged
        }
    }

    /// Whether this family issues opaque continuation state.
    pub fn is_stateful(&self) -> bool {
        !matches!(self, ProviderFamily::Tagged)
    }
}

/// Reasoning trace extracted from one physical response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThinkingContent {
    /// Reasoning text. Multiple blocks are joined with a visible delimiter.
    pub text: String,
    /// Reasoning tokens, exact when the provider reported them.
    pub token_count: u64,
    /// Whether the provider returned a summary rather than the full trace.
    pub is_summarized: bool,
}

/// Thinking captured for one round of a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundThinking {
    /// Zero-based physical request index within the turn.
    pub round: u32,
    /// What the extractor produced for that round.
    pub content: ThinkingContent,
}

/// Provider-owned continuation token.
///
/// The engine stores and forwards `opaque_data` byte-for-byte; only the
/// extractor for the matching [`ProviderFamily`] may look inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningState {
    /// Family that issued the state.
    pub provider: ProviderFamily,
    /// Uninterpreted bytes.
    pub opaque_data: Vec<u8>,
    /// When the engine captured it.
    pub captured_at: DateTime<Utc>,
}

impl ReasoningState {
    /// Capture state now.
    pub fn new(provider: ProviderFamily, opaque_data: Vec<u8>) -> Self {
        Self {
            provider,
            opaque_data,
            captured_at: Utc::now(),
        }
    }

    /// Size of the opaque payload in bytes.
    pub fn len(&self) -> usize {
        self.opaque_data.len()
    }

    /// Whether the opaque payload is empty.
    pub fn is_empty(&self) -> bool {
        self.opaque_data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_ids_route_to_families() {
        let cases = [
            ("anthropic", ProviderFamily::Anthropic),
            ("Claude-Opus", ProviderFamily::Anthropic),
            ("openai", ProviderFamily::OpenAi),
            ("azure-openai", ProviderFamily::OpenAi),
            ("gpt-5", ProviderFamily::OpenAi),
            ("o4-mini", ProviderFamily::OpenAi),
            ("gemini-2.5-pro", ProviderFamily::Gemini),
            ("vertex/gemini", ProviderFamily::Gemini),
            ("qwen3", ProviderFamily::Tagged),
            ("", ProviderFamily::Tagged),
        ];
        for (id, family) in cases {
            assert_eq!(ProviderFamily::from_provider_id(id), family, "id {id:?}");
        }
    }

    #[test]
    fn tagged_family_is_stateless() {
        assert!(!ProviderFamily::Tagged.is_stateful());
        assert!(ProviderFamily::Anthropic.is_stateful());
    }

    #[test]
    fn reasoning_state_serde_preserves_bytes() {
        let state = ReasoningState::new(ProviderFamily::OpenAi, vec![0, 255, 7, 42]);
        let json = serde_json::to_string(&state).unwrap();
        let back: ReasoningState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.opaque_data, vec![0, 255, 7, 42]);
        assert_eq!(back, state);
    }
}
