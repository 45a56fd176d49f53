//! Thought parts with signatures.
//!
//! Reasoning arrives as `candidates[0].content.parts[]` entries flagged
//! `"thought": true`. Any part may carry a `thoughtSignature`; those parts
//! are what the provider needs back, so they become the opaque state.
//! Thought text here is always a summary of the hidden trace.

use crate::extractor::ReasoningFormat;
use crate::{encode_items, reasoning_tokens};
use reprise_types::{ProviderFamily, ProviderResponse, ReasoningState, ThinkingContent};
use serde_json::Value;

/// Extractor for thought-flagged parts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureFormat;

impl SignatureFormat {
    /// Create the extractor.
    pub fn new() -> Self {
        Self
    }

    fn parts(response: &ProviderResponse) -> Option<&Vec<Value>> {
        response
            .raw
            .as_ref()?
            .pointer("/candidates/0/content/parts")?
            .as_array()
    }
}

fn is_thought(part: &Value) -> bool {
    part.get("thought").and_then(Value::as_bool) == Some(true)
}

fn text(part: &Value) -> Option<&str> {
    part.get("text").and_then(Value::as_str)
}

impl ReasoningFormat for SignatureFormat {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::Gemini
    }

    fn try_parse(&self, response: &ProviderResponse) -> Option<ThinkingContent> {
        let thoughts: Vec<&str> = Self::parts(response)?
            .iter()
            .filter(|p| is_thought(p))
            .filter_map(text)
            .collect();
        if thoughts.is_empty() {
            return None;
        }
        Some(ThinkingContent {
            text: thoughts.concat(),
            token_count: reasoning_tokens(response, &["/usageMetadata/thoughtsTokenCount"]),
            is_summarized: true,
        })
    }

    fn extract_state(&self, response: &ProviderResponse) -> Option<ReasoningState> {
        let signed: Vec<Value> = Self::parts(response)?
            .iter()
            .filter(|p| {
                p.get("thoughtSignature")
                    .and_then(Value::as_str)
                    .is_some_and(|s| !s.is_empty())
            })
            .cloned()
            .collect();
        encode_items(signed).map(|bytes| ReasoningState::new(ProviderFamily::Gemini, bytes))
    }

    fn answer_text(&self, response: &ProviderResponse) -> String {
        match Self::parts(response) {
            Some(parts) => parts
                .iter()
                .filter(|p| !is_thought(p))
                .filter_map(text)
                .collect(),
            None => response.text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(parts: Value) -> ProviderResponse {
        ProviderResponse::default().with_raw(json!({
            "candidates": [{"content": {"role": "model", "parts": parts}, "finishReason": "STOP"}],
            "usageMetadata": {"thoughtsTokenCount": 128, "candidatesTokenCount": 20}
        }))
    }

    #[test]
    fn splits_thoughts_from_answer() {
        let r = candidate(json!([
            {"text": "Considering the ", "thought": true},
            {"text": "options.", "thought": true},
            {"text": "Use a map.", "thoughtSignature": "CiQB..."}
        ]));
        let format = SignatureFormat::new();
        let thinking = format.try_parse(&r).unwrap();
        assert_eq!(thinking.text, "Considering the options.");
        assert_eq!(thinking.token_count, 128);
        assert!(thinking.is_summarized);
        assert_eq!(format.answer_text(&r), "Use a map.");
    }

    #[test]
    fn signed_parts_become_state() {
        let signed = json!({"functionCall": {"name": "f", "args": {}}, "thoughtSignature": "sig"});
        let r = candidate(json!([{"text": "x", "thought": true}, signed.clone()]));
        let state = SignatureFormat::new().extract_state(&r).unwrap();
        assert_eq!(state.provider, ProviderFamily::Gemini);
        let parts: Value = serde_json::from_slice(&state.opaque_data).unwrap();
        assert_eq!(parts, json!([signed]));
    }

    #[test]
    fn no_thoughts_is_absent() {
        let r = candidate(json!([{"text": "plain"}]));
        let format = SignatureFormat::new();
        assert!(format.try_parse(&r).is_none());
        assert!(format.extract_state(&r).is_none());
        assert_eq!(format.answer_text(&r), "plain");
    }

    #[test]
    fn blocked_prompt_without_candidates() {
        let r = ProviderResponse::default()
            .with_raw(json!({"promptFeedback": {"blockReason": "SAFETY"}}));
        assert!(SignatureFormat::new().try_parse(&r).is_none());
        assert_eq!(SignatureFormat::new().answer_text(&r), "");
    }
}
