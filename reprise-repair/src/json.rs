//! Completion of truncated JSON.
//!
//! A single pass tracks the container stack, the position inside the
//! current object or array, and whether the scan stopped inside a string,
//! an escape, or a bare literal. The completion is then derived from that
//! end state alone.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// After `{` or `,` in an object.
    Key,
    /// After a key.
    Colon,
    /// After `:` or after `[`/`,` in an array.
    Value,
    /// After a complete member or element.
    Next,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    closer: char,
    expect: Expect,
}

/// How to finish a truncated JSON fragment.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Completion {
    /// Keep only `text[..keep]`.
    pub keep: usize,
    /// Then append this.
    pub suffix: String,
    /// The last string or value was cut short and filled in.
    pub incomplete_value: bool,
}

#[derive(Default)]
struct Scanner {
    stack: Vec<Frame>,
    in_string: bool,
    string_is_key: bool,
    /// Byte offset of a pending `\` or `\u` escape inside a string.
    escape_at: Option<usize>,
    /// Hex digits seen so far in a `\u` escape.
    unicode_digits: Option<u8>,
    scalar_start: Option<usize>,
    trailing_comma: Option<usize>,
}

impl Scanner {
    fn value_done(&mut self) {
        if let Some(top) = self.stack.last_mut() {
            if top.expect == Expect::Value {
                top.expect = Expect::Next;
            }
        }
    }

    fn top_expects(&self, expect: Expect) -> bool {
        self.stack.last().is_some_and(|f| f.expect == expect)
    }

    fn set_top(&mut self, expect: Expect) {
        if let Some(top) = self.stack.last_mut() {
            top.expect = expect;
        }
    }

    fn string_char(&mut self, i: usize, c: char) {
        if let Some(digits) = self.unicode_digits {
            if c.is_ascii_hexdigit() && digits < 4 {
                let digits = digits + 1;
                if digits == 4 {
                    self.unicode_digits = None;
                    self.escape_at = None;
                } else {
                    self.unicode_digits = Some(digits);
                }
                return;
            }
            self.unicode_digits = None;
            self.escape_at = None;
        }
        if self.escape_at.is_some() {
            if c == 'u' {
                self.unicode_digits = Some(0);
            } else {
                self.escape_at = None;
            }
            return;
        }
        match c {
            '\\' => self.escape_at = Some(i),
            '"' => {
                self.in_string = false;
                if self.string_is_key {
                    self.set_top(Expect::Colon);
                } else {
                    self.value_done();
                }
            }
            _ => {}
        }
    }

    /// Returns `false` once the root value is closed.
    fn structural_char(&mut self, i: usize, c: char) -> bool {
        if self.scalar_start.is_some() {
            if c.is_whitespace() || matches!(c, ',' | '}' | ']' | ':') {
                self.scalar_start = None;
                self.value_done();
            } else {
                return true;
            }
        }
        match c {
            c if c.is_whitespace() => {}
            '{' | '[' => {
                let (closer, expect) = if c == '{' {
                    ('}', Expect::Key)
                } else {
                    (']', Expect::Value)
                };
                self.stack.push(Frame { closer, expect });
                self.trailing_comma = None;
            }
            '}' | ']' => {
                if self.stack.last().is_some_and(|f| f.closer == c) {
                    self.stack.pop();
                    self.trailing_comma = None;
                    if self.stack.is_empty() {
                        return false;
                    }
                    self.value_done();
                }
            }
            '"' => {
                self.string_is_key = self.top_expects(Expect::Key);
                self.in_string = true;
                self.trailing_comma = None;
            }
            ':' => {
                if self.top_expects(Expect::Colon) {
                    self.set_top(Expect::Value);
                }
            }
            ',' => {
                if let Some(top) = self.stack.last_mut() {
                    if top.expect == Expect::Next {
                        top.expect = if top.closer == '}' {
                            Expect::Key
                        } else {
                            Expect::Value
                        };
                        self.trailing_comma = Some(i);
                    }
                }
            }
            _ => {
                self.scalar_start = Some(i);
                self.trailing_comma = None;
            }
        }
        true
    }
}

/// Finish a literal cut short at end of input.
///
/// Returns the byte length to keep of `lit` and the suffix to append.
fn finish_literal(lit: &str) -> (usize, &'static str) {
    for word in ["true", "false", "null"] {
        if word.starts_with(lit) {
            return (lit.len(), &word[lit.len()..]);
        }
    }
    let numeric = lit
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'));
    if numeric && lit.starts_with(|c: char| c == '-' || c.is_ascii_digit()) {
        if lit.ends_with(['-', '+', '.', 'e', 'E']) {
            return (lit.len(), "0");
        }
        return (lit.len(), "");
    }
    (0, "null")
}

/// Compute the completion for `text`, or `None` if nothing is open.
pub(crate) fn complete(text: &str) -> Option<Completion> {
    let mut scanner = Scanner::default();
    for (i, c) in text.char_indices() {
        if scanner.in_string {
            scanner.string_char(i, c);
        } else if !scanner.structural_char(i, c) {
            return None;
        }
    }
    if scanner.stack.is_empty() {
        return None;
    }

    let mut completion = Completion {
        keep: text.len(),
        ..Default::default()
    };

    if scanner.in_string {
        if let Some(at) = scanner.escape_at {
            completion.keep = at;
        }
        completion.suffix.push('"');
        completion.incomplete_value = true;
        if scanner.string_is_key {
            completion.suffix.push_str(": null");
            scanner.set_top(Expect::Next);
        } else {
            scanner.value_done();
        }
    } else if let Some(start) = scanner.scalar_start {
        // a number may have lost trailing digits even when it parses
        let (keep, suffix) = finish_literal(&text[start..]);
        completion.keep = start + keep;
        completion.suffix.push_str(suffix);
        completion.incomplete_value = true;
        scanner.value_done();
    }

    let top = scanner.stack.last().copied();
    match (top.map(|f| f.expect), scanner.trailing_comma) {
        (Some(Expect::Key | Expect::Value), Some(comma)) => completion.keep = comma,
        (Some(Expect::Colon), _) => {
            completion.suffix.push_str(": null");
            completion.incomplete_value = true;
        }
        (Some(Expect::Value), None) if top.is_some_and(|f| f.closer == '}') => {
            completion.suffix.push_str("null");
            completion.incomplete_value = true;
        }
        _ => {}
    }

    for frame in scanner.stack.iter().rev() {
        completion.suffix.push(frame.closer);
    }
    Some(completion)
}
