//! Recognizer for the `<indent><list marker> [ ]` prefix of a task line.
//!
//! Two modes share one scanner:
//! - strict: exactly `[ ]`, `[x]` or `[X]`, separated from the list marker by
//!   whitespace and followed by whitespace or end of line. Used for task
//!   discovery and completion toggling.
//! - lenient: any whitespace inside the brackets (`[]`, `[  ]`, `[ x ]`) and
//!   no separator required. Used for display titles.

use std::ops::Range;

/// State encoded by the checkbox token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckboxState {
    Open,
    Done,
}

impl CheckboxState {
    pub fn is_done(self) -> bool {
        self == CheckboxState::Done
    }
}

/// Byte layout of a recognized task prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPrefix {
    /// The list marker (`-`, `*`, `+`, or `<digits>.`).
    pub marker: Range<usize>,
    /// The checkbox token including brackets.
    pub checkbox: Range<usize>,
    pub state: CheckboxState,
    /// Offset of the first non-whitespace byte after the checkbox.
    pub body_start: usize,
}

impl TaskPrefix {
    pub fn indent<'a>(&self, line: &'a str) -> &'a str {
        &line[..self.marker.start]
    }

    pub fn body<'a>(&self, line: &'a str) -> &'a str {
        &line[self.body_start..]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Strict,
    Lenient,
}

/// Parse a task prefix in strict mode.
pub fn parse_prefix(line: &str) -> Option<TaskPrefix> {
    parse(line, Mode::Strict)
}

/// Parse a task prefix tolerating irregular checkbox spacing.
pub fn parse_prefix_lenient(line: &str) -> Option<TaskPrefix> {
    parse(line, Mode::Lenient)
}

/// Checkbox state of a task line, if it is one.
pub fn checkbox_state(line: &str) -> Option<CheckboxState> {
    parse_prefix(line).map(|prefix| prefix.state)
}

fn parse(line: &str, mode: Mode) -> Option<TaskPrefix> {
    let marker_start = skip_whitespace(line, 0);
    let marker_end = list_marker_end(line, marker_start)?;

    let box_start = skip_whitespace(line, marker_end);
    if mode == Mode::Strict && box_start == marker_end {
        return None;
    }

    let (box_end, state) = match mode {
        Mode::Strict => strict_checkbox(line, box_start)?,
        Mode::Lenient => lenient_checkbox(line, box_start)?,
    };

    if mode == Mode::Strict {
        if let Some(next) = line[box_end..].chars().next() {
            if !next.is_whitespace() {
                return None;
            }
        }
    }

    Some(TaskPrefix {
        marker: marker_start..marker_end,
        checkbox: box_start..box_end,
        state,
        body_start: skip_whitespace(line, box_end),
    })
}

fn skip_whitespace(line: &str, from: usize) -> usize {
    line[from..]
        .char_indices()
        .find(|(_, ch)| !ch.is_whitespace())
        .map(|(offset, _)| from + offset)
        .unwrap_or(line.len())
}

fn list_marker_end(line: &str, start: usize) -> Option<usize> {
    let rest = &line.as_bytes()[start..];
    match rest.first()? {
        b'-' | b'*' | b'+' => Some(start + 1),
        _ => {
            let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits > 0 && rest.get(digits) == Some(&b'.') {
                Some(start + digits + 1)
            } else {
                None
            }
        }
    }
}

fn strict_checkbox(line: &str, start: usize) -> Option<(usize, CheckboxState)> {
    let token = line.as_bytes().get(start..start + 3)?;
    match token {
        [b'[', b' ', b']'] => Some((start + 3, CheckboxState::Open)),
        [b'[', b'x' | b'X', b']'] => Some((start + 3, CheckboxState::Done)),
        _ => None,
    }
}

fn lenient_checkbox(line: &str, start: usize) -> Option<(usize, CheckboxState)> {
    let rest = line.get(start..)?;
    let inner = rest.strip_prefix('[')?;
    let close = inner.find(']')?;
    let content = inner[..close].trim();
    let state = match content {
        "" => CheckboxState::Open,
        "x" | "X" => CheckboxState::Done,
        _ => return None,
    };
    // '[' + content + ']'
    Some((start + 1 + close + 1, state))
}
