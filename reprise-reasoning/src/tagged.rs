//! Reasoning inline in the answer between start and end delimiters.
//!
//! Open-weight reasoning models emit `<think>...</think>` before the answer.
//! Two irregular shapes are handled: a missing start tag (the chat template
//! already opened the span, so the text begins inside it) and a missing end
//! tag (generation stopped mid-thought). This family has no opaque state.

use crate::extractor::ReasoningFormat;
use crate::reasoning_tokens;
use reprise_types::{ConfigError, ProviderFamily, ProviderResponse, ReasoningState, ThinkingContent};
use serde::{Deserialize, Serialize};

/// Start and end delimiters of an inline reasoning span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagDelimiters {
    /// Opening delimiter.
    pub start: String,
    /// Closing delimiter.
    pub end: String,
}

impl Default for TagDelimiters {
    fn default() -> Self {
        Self {
            start: "<think>".into(),
            end: "</think>".into(),
        }
    }
}

impl TagDelimiters {
    /// Reject empty delimiters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start.is_empty() || self.end.is_empty() {
            return Err(ConfigError::EmptyDelimiter {
                start: self.start.clone(),
                end: self.end.clone(),
            });
        }
        Ok(())
    }
}

/// Extractor for inline delimited reasoning.
#[derive(Debug, Clone, Default)]
pub struct TaggedFormat {
    tags: TagDelimiters,
}

/// A text split into reasoning spans and the remaining answer.
#[derive(Debug, Default, PartialEq, Eq)]
struct Split {
    spans: Vec<String>,
    answer: String,
}

impl TaggedFormat {
    /// Extractor with the given delimiters.
    pub fn new(tags: TagDelimiters) -> Result<Self, ConfigError> {
        tags.validate()?;
        Ok(Self { tags })
    }

    /// Delimiters in use.
    pub fn tags(&self) -> &TagDelimiters {
        &self.tags
    }

    fn split(&self, text: &str) -> Split {
        let TagDelimiters { start, end } = &self.tags;
        let mut split = Split::default();
        let mut rest = text;

        // An end tag before any start tag closes a span opened upstream.
        if let Some(end_at) = rest.find(end.as_str()) {
            if rest.find(start.as_str()).is_none_or(|s| end_at < s) {
                push_span(&mut split.spans, &rest[..end_at]);
                rest = rest[end_at + end.len()..].trim_start();
            }
        }

        while let Some(start_at) = rest.find(start.as_str()) {
            split.answer.push_str(&rest[..start_at]);
            let inner = &rest[start_at + start.len()..];
            match inner.find(end.as_str()) {
                Some(end_at) => {
                    push_span(&mut split.spans, &inner[..end_at]);
                    rest = inner[end_at + end.len()..].trim_start();
                }
                None => {
                    push_span(&mut split.spans, inner);
                    rest = "";
                }
            }
        }
        split.answer.push_str(rest);
        split
    }
}

fn push_span(spans: &mut Vec<String>, span: &str) {
    let span = span.trim();
    if !span.is_empty() {
        spans.push(span.to_string());
    }
}

impl ReasoningFormat for TaggedFormat {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::Tagged
    }

    fn try_parse(&self, response: &ProviderResponse) -> Option<ThinkingContent> {
        let split = self.split(&response.text());
        if split.spans.is_empty() {
            return None;
        }
        Some(ThinkingContent {
            text: split.spans.join("\n\n"),
            token_count: reasoning_tokens(response, &[]),
            is_summarized: false,
        })
    }

    fn extract_state(&self, _response: &ProviderResponse) -> Option<ReasoningState> {
        None
    }

    fn answer_text(&self, response: &ProviderResponse) -> String {
        self.split(&response.text()).answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str) -> (Vec<String>, String) {
        let s = TaggedFormat::default().split(text);
        (s.spans, s.answer)
    }

    #[test]
    fn strips_leading_span() {
        let (spans, answer) = split("<think>\nLet me see.\n</think>\n\nThe answer is 4.");
        assert_eq!(spans, vec!["Let me see."]);
        assert_eq!(answer, "The answer is 4.");
    }

    #[test]
    fn strips_multiple_spans() {
        let (spans, answer) = split("A <think>one</think> B <think>two</think>C");
        assert_eq!(spans, vec!["one", "two"]);
        assert_eq!(answer, "A B C");
    }

    #[test]
    fn unterminated_span_swallows_rest() {
        let (spans, answer) = split("Intro <think>still going");
        assert_eq!(spans, vec!["still going"]);
        assert_eq!(answer, "Intro ");
    }

    #[test]
    fn missing_start_tag() {
        let (spans, answer) = split("reasoning here</think>Final.");
        assert_eq!(spans, vec!["reasoning here"]);
        assert_eq!(answer, "Final.");
    }

    #[test]
    fn no_tags_is_all_answer() {
        let format = TaggedFormat::default();
        let response = ProviderResponse::new("stop", "Just text.");
        assert!(format.try_parse(&response).is_none());
        assert!(format.extract_state(&response).is_none());
        assert_eq!(format.answer_text(&response), "Just text.");
    }

    #[test]
    fn custom_delimiters() {
        let format = TaggedFormat::new(TagDelimiters {
            start: "[[r]]".into(),
            end: "[[/r]]".into(),
        })
        .unwrap();
        let response = ProviderResponse::new("stop", "[[r]]hmm[[/r]]ok");
        assert_eq!(format.try_parse(&response).unwrap().text, "hmm");
        assert_eq!(format.answer_text(&response), "ok");
    }

    #[test]
    fn empty_delimiters_rejected() {
        let err = TaggedFormat::new(TagDelimiters {
            start: "<t>".into(),
            end: String::new(),
        })
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::EmptyDelimiter {
                start: "<t>".into(),
                end: String::new()
            }
        );
    }
}
