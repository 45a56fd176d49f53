//! Joining continuation answers.
//!
//! Answers are concatenated in request order. A reopened code fence is
//! dropped when the previous round left the same fence open. A verbatim
//! re-emission of the previous tail is dropped only under
//! [`Overlap::Trim`], since structured output repeats legitimately
//! (records in an array, rows in a table).

use reprise_repair::open_fence;
use serde::{Deserialize, Serialize};

/// Handling of text a continuation repeats from the end of the merged answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overlap {
    /// Concatenate as received.
    #[default]
    Keep,
    /// Drop the longest prefix of at least [`MIN_OVERLAP`] bytes that
    /// already ends the merged text.
    Trim,
}

/// Shortest re-emitted prefix treated as overlap.
pub const MIN_OVERLAP: usize = 20;

/// How far back into the merged text overlap is searched, in bytes.
pub const OVERLAP_WINDOW: usize = 512;

/// Append `next` to `merged`.
///
/// ```
/// use reprise_engine::merge::{Overlap, append_continuation};
///
/// let mut merged = String::from("The quick brown fox jumps over the lazy");
/// append_continuation(&mut merged, "fox jumps over the lazy dog.", Overlap::Trim);
/// assert_eq!(merged, "The quick brown fox jumps over the lazy dog.");
///
/// let mut rows = String::from("| a | 1 |\n| a | 1 |\n");
/// append_continuation(&mut rows, "| a | 1 |\n| b | 2 |\n", Overlap::Keep);
/// assert_eq!(rows.lines().count(), 4);
/// ```
pub fn append_continuation(merged: &mut String, next: &str, policy: Overlap) {
    let next = strip_reopened_fence(merged, next);
    let skip = match policy {
        Overlap::Keep => 0,
        Overlap::Trim => overlap(merged, next),
    };
    merged.push_str(&next[skip..]);
}

fn strip_reopened_fence<'a>(merged: &str, next: &'a str) -> &'a str {
    let Some(fence) = open_fence(merged) else {
        return next;
    };
    let leading = next.len() - next.trim_start_matches(['\n', '\r']).len();
    let body = &next[leading..];
    let first_line = body.split_inclusive('\n').next().unwrap_or_default();
    let line = first_line.trim();
    let run = line.chars().take_while(|&c| c == fence.marker).count();
    // A bare fence line closes the open block; only a repeated info string reopens it.
    if fence.info.is_empty() || run < fence.len || line[run..].trim() != fence.info {
        return next;
    }
    &body[first_line.len()..]
}

/// Bytes at the start of `next` already present at the end of `merged`.
fn overlap(merged: &str, next: &str) -> usize {
    let mut from = merged.len().saturating_sub(OVERLAP_WINDOW);
    while !merged.is_char_boundary(from) {
        from += 1;
    }
    let window = &merged[from..];
    let longest = window.len().min(next.len());
    (MIN_OVERLAP..=longest)
        .rev()
        .find(|&k| next.is_char_boundary(k) && window.ends_with(&next[..k]))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merged_with(policy: Overlap, parts: &[&str]) -> String {
        let mut out = String::new();
        for part in parts {
            append_continuation(&mut out, part, policy);
        }
        out
    }

    fn merged(parts: &[&str]) -> String {
        merged_with(Overlap::Keep, parts)
    }

    #[test]
    fn plain_concatenation() {
        assert_eq!(merged(&["Hello, ", "world."]), "Hello, world.");
    }

    #[test]
    fn repeated_records_survive_by_default() {
        let out = merged(&[
            r#"[{"sku": "A-100", "qty": 1}, "#,
            r#"{"sku": "A-100", "qty": 1}, {"sku": "B"}]"#,
        ]);
        let items: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(items.as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn short_overlap_is_kept() {
        // "the " repeats but is below the threshold.
        assert_eq!(
            merged_with(Overlap::Trim, &["over the ", "the end"]),
            "over the the end"
        );
    }

    #[test]
    fn long_overlap_is_dropped() {
        let first = "Step one: gather every ingredient on the list";
        let second = "gather every ingredient on the list, then preheat.";
        assert_eq!(
            merged_with(Overlap::Trim, &[first, second]),
            "Step one: gather every ingredient on the list, then preheat."
        );
        assert_eq!(merged(&[first, second]), format!("{first}{second}"));
    }

    #[test]
    fn reopened_fence_is_dropped() {
        let out = merged(&["Code:\n```rust\nfn main() {\n", "```rust\n    run();\n}\n```\n"]);
        assert_eq!(out, "Code:\n```rust\nfn main() {\n    run();\n}\n```\n");
    }

    #[test]
    fn bare_fence_after_open_fence_closes_it() {
        let out = merged(&["```rust\nlet x = 1;\n", "```\nThat sets x."]);
        assert_eq!(out, "```rust\nlet x = 1;\n```\nThat sets x.");
    }

    #[test]
    fn different_info_is_kept() {
        let out = merged(&["```rust\nlet x = 1;\n", "```python\nprint(x)\n"]);
        assert!(out.contains("```python"));
    }

    #[test]
    fn fence_text_without_open_fence_is_kept() {
        let out = merged(&["Intro.\n", "```json\n{}\n```"]);
        assert_eq!(out, "Intro.\n```json\n{}\n```");
    }

    #[test]
    fn multibyte_boundaries() {
        let first = "これは長い日本語の文章で、途中で切れてしまいました";
        let second = "途中で切れてしまいました。続きです。";
        let out = merged_with(Overlap::Trim, &[first, second]);
        assert!(out.ends_with("切れてしまいました。続きです。"));
        assert_eq!(out.matches("途中で").count(), 1);
    }
}
