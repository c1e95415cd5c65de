//! Display titles for task lines.

use crate::checkbox;

/// Strip list and checkbox decoration, keeping the task text.
///
/// Tags, mentions and priority markers are part of the title. Lines without
/// a recognizable prefix are only trimmed.
pub fn clean_title(line: &str) -> String {
    match checkbox::parse_prefix_lenient(line) {
        Some(prefix) => prefix.body(line).trim().to_string(),
        None => line.trim().to_string(),
    }
}
