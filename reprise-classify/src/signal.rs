//! Vendor stop-signal vocabulary.
//!
//! Finish reasons are compared case-insensitively, so `MAX_TOKENS` (Gemini),
//! `max_tokens` (Anthropic) and `length` (OpenAI) all land on the same
//! [`Signal`].

use reprise_types::{ProviderResponse, TruncationReason};
use serde_json::Value;

/// What a vendor stop signal says about a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The model finished normally.
    Complete,
    /// The response stopped early for this reason.
    Stopped(TruncationReason),
    /// No signal, or one this crate does not recognise.
    Unknown,
}

/// Map a finish reason string to a [`Signal`].
pub fn finish_signal(reason: &str) -> Signal {
    let reason = reason.trim().to_ascii_lowercase();
    match reason.as_str() {
        "content_filter" | "safety" | "blocklist" | "prohibited_content" | "spii"
        | "image_safety" => Signal::Stopped(TruncationReason::ContentFiltered),
        "recitation" => Signal::Stopped(TruncationReason::Recitation),
        "refusal" => Signal::Stopped(TruncationReason::Refusal),
        "model_context_window_exceeded" | "context_length_exceeded"
        | "context_window_exceeded" => Signal::Stopped(TruncationReason::ContextWindowExceeded),
        "length" | "max_tokens" | "max_output_tokens" => {
            Signal::Stopped(TruncationReason::TokenLimit)
        }
        "stop" | "end_turn" | "stop_sequence" | "tool_calls" | "tool_use" | "function_call"
        | "completed" => Signal::Complete,
        _ => Signal::Unknown,
    }
}

/// The finish reason of `response`, falling back to the raw payload when
/// the transport did not surface one.
pub(crate) fn finish_reason(response: &ProviderResponse) -> Option<String> {
    if let Some(reason) = response.finish_reason.as_deref() {
        if !reason.trim().is_empty() {
            return Some(reason.to_string());
        }
    }
    let raw = response.raw.as_ref()?;
    [
        "/stop_reason",
        "/choices/0/finish_reason",
        "/candidates/0/finishReason",
        "/incomplete_details/reason",
        "/status",
    ]
    .iter()
    .find_map(|pointer| raw.pointer(pointer).and_then(Value::as_str))
    .map(str::to_string)
}

/// Refusal or block signals carried in the raw payload instead of the
/// finish reason.
pub(crate) fn raw_refusal(raw: &Value) -> Option<(TruncationReason, String)> {
    if let Some(reason) = raw
        .pointer("/promptFeedback/blockReason")
        .and_then(Value::as_str)
    {
        return Some((
            TruncationReason::ContentFiltered,
            format!("prompt blocked: {reason}"),
        ));
    }
    let refusal = raw
        .pointer("/choices/0/message/refusal")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty());
    if let Some(text) = refusal {
        return Some((TruncationReason::Refusal, text.to_string()));
    }
    let responses_refusal = raw
        .get("output")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .find(|part| part.get("type").and_then(Value::as_str) == Some("refusal"));
    if let Some(part) = responses_refusal {
        let text = part
            .get("refusal")
            .and_then(Value::as_str)
            .unwrap_or("refused");
        return Some((TruncationReason::Refusal, text.to_string()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn vendor_spellings_agree() {
        for reason in ["length", "max_tokens", "MAX_TOKENS", "max_output_tokens"] {
            assert_eq!(
                finish_signal(reason),
                Signal::Stopped(TruncationReason::TokenLimit),
                "{reason}"
            );
        }
        for reason in ["stop", "end_turn", "STOP", "tool_calls", "tool_use"] {
            assert_eq!(finish_signal(reason), Signal::Complete, "{reason}");
        }
    }

    #[test]
    fn safety_reasons_are_terminal() {
        for reason in ["content_filter", "SAFETY", "BLOCKLIST", "PROHIBITED_CONTENT", "SPII"] {
            match finish_signal(reason) {
                Signal::Stopped(r) => assert!(r.is_terminal(), "{reason}"),
                other => panic!("{reason}: {other:?}"),
            }
        }
        assert_eq!(
            finish_signal("RECITATION"),
            Signal::Stopped(TruncationReason::Recitation)
        );
        assert_eq!(
            finish_signal("model_context_window_exceeded"),
            Signal::Stopped(TruncationReason::ContextWindowExceeded)
        );
    }

    #[test]
    fn unknown_and_empty_reasons() {
        assert_eq!(finish_signal(""), Signal::Unknown);
        assert_eq!(finish_signal("FINISH_REASON_UNSPECIFIED"), Signal::Unknown);
        assert_eq!(finish_signal("pause_turn"), Signal::Unknown);
    }

    #[test]
    fn finish_reason_falls_back_to_raw() {
        let mut response = ProviderResponse::default()
            .with_raw(json!({"candidates": [{"finishReason": "MAX_TOKENS"}]}));
        assert_eq!(finish_reason(&response).as_deref(), Some("MAX_TOKENS"));
        response.finish_reason = Some("stop".into());
        assert_eq!(finish_reason(&response).as_deref(), Some("stop"));
        assert_eq!(finish_reason(&ProviderResponse::default()), None);
    }

    #[test]
    fn raw_refusals() {
        let openai = json!({"choices": [{"message": {"refusal": "I can't help with that."}}]});
        assert_eq!(
            raw_refusal(&openai).map(|r| r.0),
            Some(TruncationReason::Refusal)
        );
        let null_refusal = json!({"choices": [{"message": {"refusal": null, "content": "ok"}}]});
        assert!(raw_refusal(&null_refusal).is_none());
        let gemini = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        assert_eq!(
            raw_refusal(&gemini).map(|r| r.0),
            Some(TruncationReason::ContentFiltered)
        );
        let responses = json!({"output": [{"type": "message", "content": [
            {"type": "refusal", "refusal": "No."}
        ]}]});
        assert_eq!(raw_refusal(&responses).map(|r| r.1), Some("No.".to_string()));
    }
}
