//! Integration and property tests for TokenEstimator.

use proptest::prelude::*;
use reprise_tokens::{ScriptRatios, TokenCounter, TokenEstimator};

#[test]
fn korean_and_japanese_cost_more_than_english() {
    let estimator = TokenEstimator::new();
    let english = estimator.count_text("hello there");
    let korean = estimator.count_text("안녕하세요 여러분");
    let japanese = estimator.count_text("こんにちはみなさん");
    assert!(korean > english);
    assert!(japanese > english);
}

#[test]
fn ratios_deserialize_with_defaults() {
    let ratios: ScriptRatios = serde_json::from_str(r#"{"cjk": 1.0}"#).unwrap();
    assert_eq!(ratios.cjk, 1.0);
    assert_eq!(ratios.latin, 4.0);
    let estimator = TokenEstimator::with_ratios(ratios);
    assert_eq!(estimator.count_text("中文"), 2);
}

proptest! {
    #[test]
    fn concatenation_is_monotonic(a in "\\PC{1,64}", b in "\\PC{1,64}") {
        let estimator = TokenEstimator::new();
        let joined = format!("{a}{b}");
        let whole = estimator.count_text(&joined);
        prop_assert!(whole >= estimator.count_text(&a));
        prop_assert!(whole >= estimator.count_text(&b));
    }

    #[test]
    fn estimate_never_exceeds_char_count(text in "\\PC{0,128}") {
        let estimator = TokenEstimator::new();
        prop_assert!(estimator.count_text(&text) <= text.chars().count() as u64);
    }
}
