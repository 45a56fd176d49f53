//! Delimiter analysis: open code fences and unbalanced brackets.

use serde::{Deserialize, Serialize};

/// An opening code fence with no closing fence after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fence {
    /// Fence character, `` ` `` or `~`.
    pub marker: char,
    /// Run length of the opening marker (at least 3).
    pub len: usize,
    /// Info string after the marker (`"json"`, `"rust"`, ...).
    pub info: String,
    /// Byte offset of the opening fence line.
    pub start: usize,
    /// Byte offset where the fenced body begins.
    pub body_start: usize,
}

impl Fence {
    /// The closing line for this fence, without a newline.
    pub fn closing(&self) -> String {
        std::iter::repeat_n(self.marker, self.len).collect()
    }
}

/// Leading fence run of a line: marker and run length, if it is a fence line.
fn fence_run(line: &str) -> Option<(char, usize)> {
    let marker = line.chars().next()?;
    if marker != '`' && marker != '~' {
        return None;
    }
    let run = line.chars().take_while(|&c| c == marker).count();
    (run >= 3).then_some((marker, run))
}

/// Whether `line` closes `fence`.
fn closes(fence: &Fence, line: &str) -> bool {
    match fence_run(line) {
        // fence markers are single-byte, so the run length is a byte length
        Some((marker, run)) => {
            marker == fence.marker && run >= fence.len && line[run..].trim().is_empty()
        }
        None => false,
    }
}

/// Walk `text` line by line, reporting each line with its byte offset and
/// whether it lies inside a fenced block. Returns the fence still open at
/// the end.
fn walk_lines(text: &str, mut visit: impl FnMut(&str, usize, bool)) -> Option<Fence> {
    let mut open: Option<Fence> = None;
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        let trimmed = line.trim_start();
        match &open {
            Some(fence) => {
                if closes(fence, trimmed) {
                    open = None;
                } else {
                    visit(line, start, true);
                }
            }
            None => match fence_run(trimmed) {
                Some((marker, len)) => {
                    let info = trimmed[len..].trim();
                    // ``` followed by more backticks on the line is inline code
                    if marker == '`' && info.contains('`') {
                        visit(line, start, false);
                        continue;
                    }
                    open = Some(Fence {
                        marker,
                        len,
                        info: info.to_string(),
                        start,
                        body_start: offset,
                    });
                }
                None => visit(line, start, false),
            },
        }
    }
    open
}

/// The last code fence left open, if any.
///
/// ```
/// use reprise_repair::open_fence;
///
/// assert!(open_fence("```rust\nfn main() {}\n```\n").is_none());
/// let fence = open_fence("text\n```json\n{\"a\": 1").unwrap();
/// assert_eq!(fence.info, "json");
/// ```
pub fn open_fence(text: &str) -> Option<Fence> {
    walk_lines(text, |_, _, _| {})
}

/// Openers (`{` or `[`) left unclosed outside fenced code, in opening order.
///
/// Double-quoted spans are skipped so brackets inside strings do not count.
/// Quote state resets at each line break, since JSON strings cannot span
/// lines and prose quotes should not poison the rest of the text. Stray
/// closers are ignored.
///
/// ```
/// use reprise_repair::unclosed_brackets;
///
/// assert_eq!(unclosed_brackets(r#"{"a": [1, 2"#), vec!['{', '[']);
/// assert!(unclosed_brackets(r#"{"brace": "}{"}"#).is_empty());
/// ```
pub fn unclosed_brackets(text: &str) -> Vec<char> {
    open_brackets(text).into_iter().map(|(c, _)| c).collect()
}

/// Byte offset of the outermost opener still unclosed outside fenced code.
///
/// This is where a truncated JSON value embedded in prose begins.
pub(crate) fn outermost_open_bracket(text: &str) -> Option<usize> {
    open_brackets(text).first().map(|&(_, at)| at)
}

fn open_brackets(text: &str) -> Vec<(char, usize)> {
    let mut stack: Vec<(char, usize)> = Vec::new();
    walk_lines(text, |line, start, in_fence| {
        if in_fence {
            return;
        }
        let mut in_string = false;
        let mut escaped = false;
        for (i, c) in line.char_indices() {
            if in_string {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    in_string = false;
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '{' | '[' => stack.push((c, start + i)),
                '}' | ']' => {
                    let opener = if c == '}' { '{' } else { '[' };
                    if stack.last().is_some_and(|&(open, _)| open == opener) {
                        stack.pop();
                    }
                }
                _ => {}
            }
        }
    });
    stack
}
