//! The content repairer.

use crate::json;
use crate::scan::{open_fence, outermost_open_bracket};
use serde::{Deserialize, Serialize};

/// Result of repairing a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repair {
    /// The structurally closed text.
    pub repaired_text: String,
    /// Whether anything was appended or dropped.
    pub was_modified: bool,
    /// The last string or value was cut off and filled in, so its content
    /// may be shorter than intended.
    pub possibly_incomplete: bool,
}

impl Repair {
    fn unchanged(text: &str) -> Self {
        Self {
            repaired_text: text.to_string(),
            was_modified: false,
            possibly_incomplete: false,
        }
    }
}

/// Closes what a truncated fragment left open.
///
/// Handles two shapes:
///
/// - JSON-like text: unterminated strings, partial literals, dangling keys
///   and trailing commas are completed or dropped, then open containers are
///   closed innermost first. The value may follow a prose lead-in
///   (`Here is the data:\n{...`); the lead-in is kept as is.
/// - Fenced code: an opening fence with no closing fence gets one. If the
///   fenced body is itself JSON, the body is completed first.
///
/// Anything else is returned unchanged. Repair is idempotent.
///
/// ```
/// use reprise_repair::ContentRepairer;
///
/// let repairer = ContentRepairer::new();
/// let fixed = repairer.repair(r#"{"items": [1, 2, {"name": "wid"#);
/// assert_eq!(fixed.repaired_text, r#"{"items": [1, 2, {"name": "wid"}]}"#);
/// assert!(fixed.was_modified);
/// assert!(fixed.possibly_incomplete);
///
/// let again = repairer.repair(&fixed.repaired_text);
/// assert!(!again.was_modified);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentRepairer;

impl ContentRepairer {
    /// Create a repairer.
    pub fn new() -> Self {
        Self
    }

    /// Repair `fragment`.
    pub fn repair(&self, fragment: &str) -> Repair {
        if let Some(fence) = open_fence(fragment) {
            let body = &fragment[fence.body_start..];
            let mut text = String::with_capacity(fragment.len() + 16);
            let mut possibly_incomplete = false;
            match complete_json_like(body) {
                Some((closed, incomplete)) => {
                    text.push_str(&fragment[..fence.body_start]);
                    text.push_str(&closed);
                    possibly_incomplete = incomplete;
                }
                None => text.push_str(fragment),
            }
            if !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&fence.closing());
            return Repair {
                repaired_text: text,
                was_modified: true,
                possibly_incomplete,
            };
        }

        match complete_embedded_json(fragment) {
            Some((closed, incomplete)) => Repair {
                repaired_text: closed,
                was_modified: true,
                possibly_incomplete: incomplete,
            },
            None => Repair::unchanged(fragment),
        }
    }
}

/// Complete `text` if it looks like JSON and is left open.
fn complete_json_like(text: &str) -> Option<(String, bool)> {
    if !text.trim_start().starts_with(['{', '[']) {
        return None;
    }
    let completion = json::complete(text)?;
    let mut closed = String::with_capacity(completion.keep + completion.suffix.len());
    closed.push_str(&text[..completion.keep]);
    closed.push_str(&completion.suffix);
    Some((closed, completion.incomplete_value))
}

/// Complete the outermost JSON value left open in `text`, keeping any
/// prose before it.
fn complete_embedded_json(text: &str) -> Option<(String, bool)> {
    let start = outermost_open_bracket(text)?;
    let (lead, value) = text.split_at(start);
    if !lead.trim().is_empty() && !opens_json_value(value) {
        return None;
    }
    let (closed, incomplete) = complete_json_like(value)?;
    Some((format!("{lead}{closed}"), incomplete))
}

/// Whether the token after the opener reads as JSON rather than prose,
/// as in `{"key"` versus `{x` or `[sic]`.
fn opens_json_value(value: &str) -> bool {
    let mut chars = value.chars();
    let opener = chars.next();
    let rest = chars.as_str().trim_start();
    match (opener, rest.chars().next()) {
        (_, None) => true,
        (Some('{'), Some(c)) => matches!(c, '"' | '}'),
        (Some('['), Some(c)) if c.is_ascii_alphabetic() => {
            let word_len = rest.find(|c: char| !c.is_ascii_alphabetic());
            let word = &rest[..word_len.unwrap_or(rest.len())];
            ["true", "false", "null"]
                .iter()
                .any(|lit| *lit == word || (word_len.is_none() && lit.starts_with(word)))
        }
        (Some('['), Some(c)) => matches!(c, '"' | '{' | '[' | ']' | '-') || c.is_ascii_digit(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closes_open_fence() {
        let repair = ContentRepairer::new().repair("Here:\n```python\nprint('hi')");
        assert_eq!(repair.repaired_text, "Here:\n```python\nprint('hi')\n```");
        assert!(repair.was_modified);
        assert!(!repair.possibly_incomplete);
    }

    #[test]
    fn closes_fence_with_same_marker_and_length() {
        let repair = ContentRepairer::new().repair("~~~~\nraw text\n");
        assert_eq!(repair.repaired_text, "~~~~\nraw text\n~~~~");
    }

    #[test]
    fn completes_json_inside_open_fence() {
        let repair = ContentRepairer::new().repair("```json\n{\"a\": [1, 2");
        assert_eq!(repair.repaired_text, "```json\n{\"a\": [1, 2]}\n```");
        assert!(repair.possibly_incomplete);
    }

    #[test]
    fn prose_is_left_alone() {
        let repair = ContentRepairer::new().repair("The answer is (probably");
        assert!(!repair.was_modified);
        assert_eq!(repair.repaired_text, "The answer is (probably");
    }

    #[test]
    fn completes_json_after_prose_lead_in() {
        let repairer = ContentRepairer::new();
        let repair = repairer.repair("Here is the data:\n{\"items\": [1, 2");
        assert_eq!(repair.repaired_text, "Here is the data:\n{\"items\": [1, 2]}");
        assert!(repair.was_modified);
        assert!(repair.possibly_incomplete);
        assert!(!repairer.repair(&repair.repaired_text).was_modified);
    }

    #[test]
    fn lead_in_keeps_earlier_closed_values() {
        let text = "First {\"a\": 1}, then [{\"b\": \"tw";
        let repair = ContentRepairer::new().repair(text);
        assert_eq!(repair.repaired_text, "First {\"a\": 1}, then [{\"b\": \"tw\"}]");
    }

    #[test]
    fn bracketed_prose_is_not_json() {
        for text in ["Use the set {x, y", "The quote [sic was", "Sets like {a"] {
            let repair = ContentRepairer::new().repair(text);
            assert!(!repair.was_modified, "{text}");
        }
    }

    #[test]
    fn closed_fence_is_unchanged() {
        let text = "```\ncode\n```\n";
        let repair = ContentRepairer::new().repair(text);
        assert!(!repair.was_modified);
        assert_eq!(repair.repaired_text, text);
    }

    #[test]
    fn empty_is_unchanged() {
        assert!(!ContentRepairer::new().repair("").was_modified);
    }
}
