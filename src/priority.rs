//! Priority levels and their emoji markers.
//!
//! A task line carries its priority as a marker emoji somewhere in the line
//! (conventionally at the end). `Normal` has no marker: its absence is the
//! encoding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ordered priority level, lowest first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Priority {
    Lowest,
    Low,
    #[default]
    Normal,
    Medium,
    High,
    Highest,
}

/// Marker lookup in classification precedence order.
const MARKERS: [(Priority, &str); 5] = [
    (Priority::Highest, "\u{1F53A}"),
    (Priority::High, "\u{23EB}"),
    (Priority::Medium, "\u{1F53C}"),
    (Priority::Low, "\u{1F53D}"),
    (Priority::Lowest, "\u{23EC}\u{FE0F}"),
];

impl Priority {
    /// All levels, lowest first.
    pub const ALL: [Priority; 6] = [
        Priority::Lowest,
        Priority::Low,
        Priority::Normal,
        Priority::Medium,
        Priority::High,
        Priority::Highest,
    ];

    /// The marker emoji for this level, or `None` for `Normal`.
    pub fn marker(self) -> Option<&'static str> {
        MARKERS
            .iter()
            .find(|(level, _)| *level == self)
            .map(|(_, marker)| *marker)
    }

    pub fn name(self) -> &'static str {
        match self {
            Priority::Lowest => "Lowest",
            Priority::Low => "Low",
            Priority::Normal => "Normal",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Highest => "Highest",
        }
    }

    /// Parse a level name case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(trimmed))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Priority {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            crate::error::Error::InvalidArgument(format!(
                "unknown priority '{}' (expected lowest|low|normal|medium|high|highest)",
                s.trim()
            ))
        })
    }
}

/// Classify a task line by the first marker found in precedence order.
///
/// Precedence wins over position: a line holding both 🔽 and ⏫ is `High`
/// whichever comes first in the text.
pub fn classify_priority(line: &str) -> Priority {
    MARKERS
        .iter()
        .find(|(_, marker)| line.contains(marker))
        .map(|(level, _)| *level)
        .unwrap_or(Priority::Normal)
}

/// Rewrite the line's priority marker from a level name.
///
/// Names match exactly (`"High"`, not `"high"`). Empty or unrecognized names
/// mean `Normal`, which strips every marker.
pub fn set_priority(line: &str, priority: &str) -> String {
    let level = Priority::ALL
        .into_iter()
        .find(|level| level.name() == priority)
        .unwrap_or_default();
    set_priority_level(line, level)
}

/// Rewrite the line's priority marker.
///
/// Every marker occurrence is removed, the new marker (if any) is appended
/// after a single space, runs of whitespace collapse to one space and the
/// result is trimmed.
pub fn set_priority_level(line: &str, priority: Priority) -> String {
    let mut cleaned = line.to_string();
    for (_, marker) in MARKERS {
        cleaned = cleaned.replace(marker, "");
    }
    let cleaned = cleaned.trim_end();

    let rewritten = match priority.marker() {
        Some(marker) => format!("{cleaned} {marker}"),
        None => cleaned.to_string(),
    };
    collapse_whitespace(&rewritten).trim().to_string()
}

/// `set_priority_level` that keeps the line's leading indentation.
///
/// Used when writing back into a note, where indentation encodes nesting.
pub fn set_priority_keep_indent(line: &str, priority: Priority) -> String {
    let body = line.trim_start();
    let indent = &line[..line.len() - body.len()];
    format!("{indent}{}", set_priority_level(body, priority))
}

/// Replace each run of two or more whitespace characters with one space.
fn collapse_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch.is_whitespace() && chars.peek().is_some_and(|next| next.is_whitespace()) {
            while chars.peek().is_some_and(|next| next.is_whitespace()) {
                chars.next();
            }
            out.push(' ');
        } else {
            out.push(ch);
        }
    }
    out
}
