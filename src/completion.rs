//! Completion toggling and the dated markers a task line can carry.
//!
//! A completed task is stamped with `✅ YYYY-MM-DD` at the end of the line.
//! Due dates use `📅 YYYY-MM-DD`; they are read here but never written.

use std::ops::Range;

use chrono::{Local, NaiveDate};

use crate::checkbox;

/// Calendar checkmark that starts a completion stamp.
pub const COMPLETION_MARKER: &str = "\u{2705}";

/// Calendar marker that starts a due date.
pub const DUE_MARKER: &str = "\u{1F4C5}";

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_LEN: usize = 10;

/// Flip the checkbox and add or remove the completion stamp.
///
/// Lines without a `- [ ]` style prefix come back unchanged. Marking a task
/// complete replaces any earlier stamp, so the line only ever carries one.
pub fn set_completion(line: &str, completed: bool, today: NaiveDate) -> String {
    let Some(prefix) = checkbox::parse_prefix(line) else {
        return line.to_string();
    };

    let head = &line[..prefix.checkbox.start];
    let tail = &line[prefix.checkbox.end..];

    if completed {
        let (tail, _) = strip_completion_stamps(tail);
        format!(
            "{head}[x]{tail} {COMPLETION_MARKER} {}",
            today.format(DATE_FORMAT)
        )
    } else {
        let (tail, removed) = strip_completion_stamps(tail);
        let tail = if removed { tail.trim_end() } else { tail.as_str() };
        format!("{head}[ ]{tail}")
    }
}

/// `set_completion` stamped with the local calendar date.
pub fn set_completion_today(line: &str, completed: bool) -> String {
    set_completion(line, completed, Local::now().date_naive())
}

/// Date of the completion stamp, if the line has one.
pub fn completion_date(line: &str) -> Option<NaiveDate> {
    find_dated_marker(line, COMPLETION_MARKER, 0).map(|(_, date)| date)
}

/// Date following the due marker, if the line has one.
pub fn due_date(line: &str) -> Option<NaiveDate> {
    find_dated_marker(line, DUE_MARKER, 0).map(|(_, date)| date)
}

/// Remove every `✅ <date>` stamp together with the whitespace before it.
fn strip_completion_stamps(text: &str) -> (String, bool) {
    let mut out = text.to_string();
    let mut removed = false;
    let mut search_from = 0;

    while let Some((range, _)) = find_dated_marker(&out, COMPLETION_MARKER, search_from) {
        let start = out[..range.start].trim_end().len();
        out.replace_range(start..range.end, "");
        search_from = start;
        removed = true;
    }

    (out, removed)
}

/// Locate `<marker><whitespace><YYYY-MM-DD>` at or after `from`.
///
/// Returns the byte range from the marker through the date.
fn find_dated_marker(text: &str, marker: &str, from: usize) -> Option<(Range<usize>, NaiveDate)> {
    let mut offset = from;
    while let Some(found) = text.get(offset..)?.find(marker) {
        let marker_start = offset + found;
        let after_marker = marker_start + marker.len();
        let rest = &text[after_marker..];
        let date_start = after_marker + (rest.len() - rest.trim_start().len());

        if date_start > after_marker {
            if let Some(date) = parse_date_token(&text[date_start..]) {
                return Some((marker_start..date_start + DATE_LEN, date));
            }
        }
        offset = after_marker;
    }
    None
}

fn parse_date_token(text: &str) -> Option<NaiveDate> {
    let token = text.get(..DATE_LEN)?;
    let shaped = token.bytes().enumerate().all(|(idx, byte)| match idx {
        4 | 7 => byte == b'-',
        _ => byte.is_ascii_digit(),
    });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(token, DATE_FORMAT).ok()
}
