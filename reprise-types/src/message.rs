//! Wire-neutral request and response types.
//!
//! These are the only fields the engine reads from or writes to the
//! transport. Provider-specific wire encoding belongs to the transport.

use crate::reasoning::ReasoningState;
use serde::{Deserialize, Serialize};

/// Role in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message (instructions).
    System,
    /// User message.
    User,
    /// Assistant (model) message.
    Assistant,
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message author.
    pub role: Role,
    /// Text content.
    pub content: String,
}

impl Message {
    /// Create a message with the given role.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Token usage reported by the provider for one physical request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens consumed.
    pub input_tokens: u64,
    /// Output tokens generated, reasoning included where the provider counts it there.
    pub output_tokens: u64,
    /// Tokens spent on reasoning, when reported separately.
    #[serde(default)]
    pub reasoning_tokens: Option<u64>,
}

/// One physical request handed to the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// Model to use (None = transport default).
    pub model: Option<String>,
    /// Conversation messages, including any continuation scaffolding.
    pub messages: Vec<Message>,
    /// Output ceiling for the answer.
    pub max_output_tokens: u32,
    /// Output ceiling for reasoning.
    pub thinking_budget: u32,
    /// Provider-owned continuation state to echo back verbatim.
    pub reasoning_state: Option<ReasoningState>,
    /// Zero for the first request of a turn, then 1, 2, ...
    pub continuation: u32,
    /// Provider-specific passthrough.
    #[serde(default)]
    pub extra: serde_json::Value,
}

impl ProviderRequest {
    /// Whether this request resumes an earlier response.
    pub fn is_continuation(&self) -> bool {
        self.continuation > 0
    }
}

/// One physical response from the transport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Vendor-native finish/stop reason, verbatim (`"length"`, `"max_tokens"`, `"SAFETY"`, ...).
    pub finish_reason: Option<String>,
    /// Emitted content segments, in order.
    pub content: Vec<String>,
    /// Raw provider payload for format-specific extraction.
    #[serde(default)]
    pub raw: Option<serde_json::Value>,
    /// Usage counters, when the provider reports them.
    #[serde(default)]
    pub usage: Option<TokenUsage>,
    /// Model that served the request.
    #[serde(default)]
    pub model: Option<String>,
}

impl ProviderResponse {
    /// A single-segment response with the given finish reason.
    pub fn new(finish_reason: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            finish_reason: Some(finish_reason.into()),
            content: vec![text.into()],
            ..Default::default()
        }
    }

    /// Attach a raw payload.
    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Attach usage counters.
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// All content segments joined.
    pub fn text(&self) -> String {
        self.content.concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
    }

    #[test]
    fn response_text_concatenates_segments() {
        let response = ProviderResponse {
            content: vec!["Hello, ".into(), "world.".into()],
            ..Default::default()
        };
        assert_eq!(response.text(), "Hello, world.");
    }

    #[test]
    fn response_deserializes_without_optional_fields() {
        let response: ProviderResponse =
            serde_json::from_str(r#"{"finish_reason": "stop", "content": ["ok"]}"#).unwrap();
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
        assert!(response.raw.is_none());
        assert!(response.usage.is_none());
    }
}
