//! Reasoning carried in dedicated response fields.
//!
//! Two shapes are recognised:
//!
//! - Chat-completions style: the assistant message carries the reasoning as
//!   a plain string (`reasoning_content`, or `reasoning` on some gateways).
//!   Where to look is configurable through [`FieldPointers`].
//! - Responses style: `output[]` holds `{"type": "reasoning"}` items with
//!   `summary` and/or `content` text parts and an `encrypted_content`
//!   token. Items carrying the token are kept verbatim as the opaque state.

use crate::extractor::ReasoningFormat;
use crate::{encode_items, reasoning_tokens};
use reprise_types::{ProviderFamily, ProviderResponse, ReasoningState, ThinkingContent};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const USAGE_POINTERS: &[&str] = &[
    "/usage/completion_tokens_details/reasoning_tokens",
    "/usage/output_tokens_details/reasoning_tokens",
];

/// JSON pointers into the raw response, tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldPointers {
    /// Locations of a reasoning text string.
    pub reasoning: Vec<String>,
    /// Locations of an opaque continuation value.
    pub state: Vec<String>,
}

impl Default for FieldPointers {
    fn default() -> Self {
        Self {
            reasoning: vec![
                "/choices/0/message/reasoning_content".into(),
                "/choices/0/message/reasoning".into(),
            ],
            state: vec!["/choices/0/message/reasoning_details".into()],
        }
    }
}

/// Extractor for reasoning fields.
#[derive(Debug, Clone, Default)]
pub struct FieldFormat {
    pointers: FieldPointers,
}

impl FieldFormat {
    /// Extractor reading the given locations.
    pub fn new(pointers: FieldPointers) -> Self {
        Self { pointers }
    }

    /// Locations in use.
    pub fn pointers(&self) -> &FieldPointers {
        &self.pointers
    }

    fn reasoning_items(raw: &Value) -> impl Iterator<Item = &Value> {
        raw.get("output")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter(|item| item.get("type").and_then(Value::as_str) == Some("reasoning"))
    }

    /// Text parts of `item[key]`, skipping anything without a `text` string.
    fn part_texts<'a>(item: &'a Value, key: &str) -> Vec<&'a str> {
        item.get(key)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect()
    }

    fn output_item_text(raw: &Value) -> Option<(String, bool)> {
        let mut full = Vec::new();
        let mut summary = Vec::new();
        let mut seen = false;
        for item in Self::reasoning_items(raw) {
            seen = true;
            full.extend(Self::part_texts(item, "content"));
            summary.extend(Self::part_texts(item, "summary"));
        }
        if !full.is_empty() {
            Some((full.join("\n\n"), false))
        } else if !summary.is_empty() {
            Some((summary.join("\n\n"), true))
        } else if seen {
            Some((String::new(), false))
        } else {
            None
        }
    }

    fn field_text(&self, raw: &Value) -> Option<String> {
        self.pointers
            .reasoning
            .iter()
            .find_map(|p| raw.pointer(p).and_then(Value::as_str))
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    }
}

impl ReasoningFormat for FieldFormat {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::OpenAi
    }

    fn try_parse(&self, response: &ProviderResponse) -> Option<ThinkingContent> {
        let raw = response.raw.as_ref()?;
        let (text, is_summarized) = match self.field_text(raw) {
            Some(text) => (text, false),
            None => Self::output_item_text(raw)?,
        };
        Some(ThinkingContent {
            text,
            token_count: reasoning_tokens(response, USAGE_POINTERS),
            is_summarized,
        })
    }

    fn extract_state(&self, response: &ProviderResponse) -> Option<ReasoningState> {
        let raw = response.raw.as_ref()?;
        let encrypted: Vec<Value> = Self::reasoning_items(raw)
            .filter(|item| {
                item.get("encrypted_content")
                    .and_then(Value::as_str)
                    .is_some_and(|s| !s.is_empty())
            })
            .cloned()
            .collect();
        let bytes = match encode_items(encrypted) {
            Some(bytes) => bytes,
            None => {
                let value = self
                    .pointers
                    .state
                    .iter()
                    .find_map(|p| raw.pointer(p))
                    .filter(|v| !v.is_null())?;
                match value {
                    Value::String(s) if s.is_empty() => return None,
                    Value::String(s) => s.clone().into_bytes(),
                    Value::Array(items) if items.is_empty() => return None,
                    other => serde_json::to_vec(other).ok()?,
                }
            }
        };
        Some(ReasoningState::new(ProviderFamily::OpenAi, bytes))
    }

    fn answer_text(&self, response: &ProviderResponse) -> String {
        if !response.content.is_empty() {
            return response.text();
        }
        let Some(raw) = response.raw.as_ref() else {
            return String::new();
        };
        if let Some(text) = raw.pointer("/choices/0/message/content").and_then(Value::as_str) {
            return text.to_string();
        }
        raw.get("output")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter(|item| item.get("type").and_then(Value::as_str) == Some("message"))
            .flat_map(|item| Self::part_texts(item, "content"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> ProviderResponse {
        ProviderResponse::default().with_raw(value)
    }

    #[test]
    fn reads_reasoning_content_field() {
        let r = raw(json!({
            "choices": [{"message": {"content": "42", "reasoning_content": "6 times 7"}}],
            "usage": {"completion_tokens_details": {"reasoning_tokens": 17}}
        }));
        let format = FieldFormat::default();
        let thinking = format.try_parse(&r).unwrap();
        assert_eq!(thinking.text, "6 times 7");
        assert_eq!(thinking.token_count, 17);
        assert!(!thinking.is_summarized);
        assert_eq!(format.answer_text(&r), "42");
        assert!(format.extract_state(&r).is_none());
    }

    #[test]
    fn falls_back_to_reasoning_field() {
        let r = raw(json!({"choices": [{"message": {"reasoning": "hmm"}}]}));
        assert_eq!(FieldFormat::default().try_parse(&r).unwrap().text, "hmm");
    }

    #[test]
    fn missing_fields_are_absent() {
        let r = raw(json!({"choices": [{"message": {"content": "hi", "reasoning_content": null}}]}));
        assert!(FieldFormat::default().try_parse(&r).is_none());
        assert!(FieldFormat::default().try_parse(&ProviderResponse::new("stop", "hi")).is_none());
    }

    #[test]
    fn responses_summary_is_marked_summarized() {
        let r = raw(json!({
            "output": [
                {"type": "reasoning", "id": "rs_1",
                 "summary": [{"type": "summary_text", "text": "Plan"}],
                 "encrypted_content": "gAAAA..."},
                {"type": "message", "content": [{"type": "output_text", "text": "Done."}]}
            ],
            "usage": {"output_tokens_details": {"reasoning_tokens": 64}}
        }));
        let format = FieldFormat::default();
        let thinking = format.try_parse(&r).unwrap();
        assert_eq!(thinking.text, "Plan");
        assert!(thinking.is_summarized);
        assert_eq!(thinking.token_count, 64);
        assert_eq!(format.answer_text(&r), "Done.");

        let state = format.extract_state(&r).unwrap();
        let items: Value = serde_json::from_slice(&state.opaque_data).unwrap();
        assert_eq!(items[0]["id"], "rs_1");
        assert_eq!(items[0]["encrypted_content"], "gAAAA...");
    }

    #[test]
    fn custom_pointers() {
        let format = FieldFormat::new(FieldPointers {
            reasoning: vec!["/thoughts".into()],
            state: vec!["/token".into()],
        });
        let r = raw(json!({"thoughts": "t", "token": "abc"}));
        assert_eq!(format.try_parse(&r).unwrap().text, "t");
        assert_eq!(format.extract_state(&r).unwrap().opaque_data, b"abc".to_vec());
    }

    #[test]
    fn reasoning_details_become_state() {
        let details = json!([{"type": "reasoning.encrypted", "data": "xyz"}]);
        let r = raw(json!({"choices": [{"message": {"reasoning_details": details.clone()}}]}));
        let state = FieldFormat::default().extract_state(&r).unwrap();
        let parsed: Value = serde_json::from_slice(&state.opaque_data).unwrap();
        assert_eq!(parsed, details);
    }
}
