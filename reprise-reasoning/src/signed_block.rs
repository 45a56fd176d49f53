//! Signed thinking blocks.
//!
//! The raw response holds a `content` array of typed blocks:
//!
//! ```json
//! [
//!   {"type": "thinking", "thinking": "...", "signature": "EqQB..."},
//!   {"type": "redacted_thinking", "data": "EmwKAhgB..."},
//!   {"type": "text", "text": "The answer."}
//! ]
//! ```
//!
//! The provider verifies signatures when the blocks come back, so a
//! thinking block without one is useless for continuation and is skipped.
//! Redacted blocks carry no readable text but must be sent back.

use crate::extractor::ReasoningFormat;
use crate::{encode_items, reasoning_tokens};
use reprise_types::{ProviderFamily, ProviderResponse, ReasoningState, ThinkingContent};
use serde_json::Value;

/// Separator between the texts of consecutive thinking blocks.
pub const BLOCK_DELIMITER: &str = "\n\n---\n\n";

/// Extractor for signed thinking blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignedBlockFormat;

enum Block<'a> {
    Thinking(&'a str),
    Redacted,
    Text(&'a str),
    Malformed(&'static str),
    Other,
}

fn str_field<'a>(block: &'a Value, name: &str) -> Option<&'a str> {
    block.get(name).and_then(Value::as_str)
}

fn classify(block: &Value) -> Block<'_> {
    let field = |name| str_field(block, name);
    match field("type") {
        Some("thinking") => {
            let Some(text) = field("thinking") else {
                return Block::Malformed("thinking block without text");
            };
            match field("signature") {
                Some(sig) if !sig.is_empty() => Block::Thinking(text),
                _ => Block::Malformed("thinking block without signature"),
            }
        }
        Some("redacted_thinking") => match field("data") {
            Some(data) if !data.is_empty() => Block::Redacted,
            _ => Block::Malformed("redacted block without data"),
        },
        Some("text") => field("text").map_or(Block::Other, Block::Text),
        _ => Block::Other,
    }
}

impl SignedBlockFormat {
    /// Create the extractor.
    pub fn new() -> Self {
        Self
    }

    fn blocks(response: &ProviderResponse) -> &[Value] {
        response
            .raw
            .as_ref()
            .and_then(|raw| raw.get("content"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl ReasoningFormat for SignedBlockFormat {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::Anthropic
    }

    fn try_parse(&self, response: &ProviderResponse) -> Option<ThinkingContent> {
        let mut texts = Vec::new();
        let mut redacted = false;
        for (index, block) in Self::blocks(response).iter().enumerate() {
            match classify(block) {
                Block::Thinking(text) => texts.push(text),
                Block::Redacted => redacted = true,
                Block::Malformed(problem) => {
                    tracing::warn!(index, problem, "reprise.reasoning.skip_block");
                }
                Block::Text(_) | Block::Other => {}
            }
        }
        if texts.is_empty() && !redacted {
            return None;
        }
        Some(ThinkingContent {
            text: texts.join(BLOCK_DELIMITER),
            token_count: reasoning_tokens(response, &[]),
            is_summarized: false,
        })
    }

    fn extract_state(&self, response: &ProviderResponse) -> Option<ReasoningState> {
        let kept: Vec<Value> = Self::blocks(response)
            .iter()
            .filter(|block| matches!(classify(block), Block::Thinking(_) | Block::Redacted))
            .cloned()
            .collect();
        encode_items(kept).map(|bytes| ReasoningState::new(ProviderFamily::Anthropic, bytes))
    }

    fn answer_text(&self, response: &ProviderResponse) -> String {
        if !response.content.is_empty() {
            return response.text();
        }
        Self::blocks(response)
            .iter()
            .filter_map(|block| match classify(block) {
                Block::Text(text) => Some(text),
                _ => None,
            })
            .collect()
    }
}
