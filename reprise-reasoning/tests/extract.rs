//! Extraction through the family-selected extractor.

use proptest::prelude::*;
use reprise_reasoning::{BLOCK_DELIMITER, ReasoningExtractor, ReasoningFormat};
use reprise_types::{ProviderFamily, ProviderResponse};
use serde_json::{Value, json};

#[test]
fn unsigned_block_is_skipped_not_fatal() {
    let response = ProviderResponse::new("end_turn", "Answer.").with_raw(json!({
        "content": [
            {"type": "thinking", "thinking": "Well-formed reasoning.", "signature": "EqQBCkYIBRgCKkC"},
            {"type": "thinking", "thinking": "Tampered reasoning."},
            {"type": "text", "text": "Answer."}
        ]
    }));
    let extractor = ReasoningExtractor::for_family(ProviderFamily::from_provider_id("anthropic"));
    let out = extractor.extract(&response);
    let thinking = out.thinking.expect("well-formed block survives");
    assert_eq!(thinking.text, "Well-formed reasoning.");
    assert!(!thinking.text.contains("Tampered"));
    assert!(!thinking.text.contains(BLOCK_DELIMITER));

    let state = out.state.expect("signed block is kept as state");
    let blocks: Value = serde_json::from_slice(&state.opaque_data).unwrap();
    assert_eq!(blocks.as_array().map(Vec::len), Some(1));
    assert_eq!(out.answer, "Answer.");
}

#[test]
fn stateless_family_never_yields_state() {
    let extractor = ReasoningExtractor::for_family(ProviderFamily::Tagged);
    let response = ProviderResponse::new("stop", "<think>x</think>y")
        .with_raw(json!({"content": [{"type": "redacted_thinking", "data": "zzz"}]}));
    assert!(extractor.extract_state(&response).is_none());
    assert!(!extractor.family().is_stateful());
}

#[test]
fn every_family_tolerates_garbage_raw() {
    let garbage = [
        json!(null),
        json!(42),
        json!("text"),
        json!({"content": [1, "two", null, {"type": 3}]}),
        json!({"candidates": [{"content": {"parts": [null, {"thought": "yes"}]}}]}),
        json!({"output": [{"type": "reasoning", "summary": "flat"}]}),
        json!({"choices": [{"message": {"reasoning_content": 7}}]}),
    ];
    for family in [
        ProviderFamily::Anthropic,
        ProviderFamily::OpenAi,
        ProviderFamily::Gemini,
        ProviderFamily::Tagged,
    ] {
        let extractor = ReasoningExtractor::for_family(family);
        for raw in &garbage {
            let response = ProviderResponse::new("stop", "ok").with_raw(raw.clone());
            let out = extractor.extract(&response);
            if let Some(thinking) = out.thinking {
                assert!(thinking.text.is_empty(), "{family:?} {raw}");
            }
        }
    }
}

proptest! {
    #[test]
    fn tagged_split_never_grows_text(text in "[a-z <>/think]{0,60}") {
        let extractor = ReasoningExtractor::for_family(ProviderFamily::Tagged);
        let response = ProviderResponse::new("stop", text.clone());
        let out = extractor.extract(&response);
        let thinking_len = out.thinking.map_or(0, |t| t.text.len());
        prop_assert!(out.answer.len() <= text.len());
        prop_assert!(thinking_len <= text.len());
    }
}
