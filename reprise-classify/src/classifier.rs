use crate::signal::{Signal, finish_reason, finish_signal, raw_refusal};
use reprise_repair::{open_fence, unclosed_brackets};
use reprise_types::{ProviderResponse, TruncationInfo, TruncationReason};

/// Characters a complete response plausibly ends with.
const TERMINAL_CHARS: &[char] = &[
    '.', '!', '?', '…', '。', '！', '？', '．', '"', '\'', '”', '’', '」', '』', ')', ']', '}',
    '）', '`', ':', ';', '*', '_', '|', '>', '~',
];

/// Assigns exactly one [`TruncationReason`] (or none) to a response.
///
/// Priority, highest first:
///
/// 1. Safety and refusal signals, from the finish reason or the raw payload.
/// 2. Context window exhaustion.
/// 3. Token limit.
/// 4. An explicit normal stop, which short-circuits everything below.
/// 5. Heuristics on the answer text: open code fence, unbalanced `{`/`[`,
///    missing terminal punctuation.
///
/// Pure: the same response always classifies the same way.
#[derive(Debug, Clone, Copy, Default)]
pub struct TruncationClassifier;

impl TruncationClassifier {
    /// Create a classifier.
    pub fn new() -> Self {
        Self
    }

    /// Classify a response, applying the heuristics to its full text.
    pub fn classify(&self, response: &ProviderResponse) -> TruncationInfo {
        self.classify_answer(response, &response.text())
    }

    /// Classify a response, applying the heuristics to `answer`.
    ///
    /// Use this when reasoning has already been stripped from the text, so
    /// inline thinking does not skew the structural checks.
    pub fn classify_answer(&self, response: &ProviderResponse, answer: &str) -> TruncationInfo {
        let reason = finish_reason(response).unwrap_or_default();
        let signal = finish_signal(&reason);

        if let Signal::Stopped(r) = signal {
            if matches!(
                r,
                TruncationReason::ContentFiltered
                    | TruncationReason::Recitation
                    | TruncationReason::Refusal
            ) {
                return stopped(r, &reason);
            }
        }
        if let Some((r, details)) = response.raw.as_ref().and_then(raw_refusal) {
            return TruncationInfo::truncated(r, details);
        }

        match signal {
            Signal::Stopped(r) => stopped(r, &reason),
            Signal::Complete => TruncationInfo::complete(),
            Signal::Unknown => heuristics(answer),
        }
    }
}

fn stopped(reason: TruncationReason, finish: &str) -> TruncationInfo {
    TruncationInfo::truncated(reason, format!("finish reason `{finish}`"))
}

fn heuristics(answer: &str) -> TruncationInfo {
    if let Some(fence) = open_fence(answer) {
        let details = if fence.info.is_empty() {
            "unclosed code fence".to_string()
        } else {
            format!("unclosed `{}` code fence", fence.info)
        };
        return TruncationInfo::truncated(TruncationReason::IncompleteCodeBlock, details);
    }
    let open = unclosed_brackets(answer);
    if !open.is_empty() {
        let details: String = open.iter().collect();
        return TruncationInfo::truncated(
            TruncationReason::UnbalancedStructure,
            format!("unclosed `{details}`"),
        );
    }
    let trimmed = answer.trim_end();
    match trimmed.chars().last() {
        None => TruncationInfo::complete(),
        Some(c) if TERMINAL_CHARS.contains(&c) || is_emoji(c) => TruncationInfo::complete(),
        Some(c) => TruncationInfo::truncated(
            TruncationReason::MidSentence,
            format!("ends with `{c}`"),
        ),
    }
}

fn is_emoji(c: char) -> bool {
    matches!(c as u32, 0x1F300..=0x1FAFF | 0x2600..=0x27BF)
}
