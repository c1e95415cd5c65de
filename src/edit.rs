//! Read-modify-write of single task lines inside vault notes.
//!
//! Every edit holds the note's exclusive lock for the whole cycle and
//! replaces the file atomically. Lines are addressed by index and verified
//! by content: if the expected text is no longer at the index, a unique
//! exact match elsewhere in the note is edited instead.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::completion::set_completion;
use crate::error::{Error, Result};
use crate::lock::{lock_path_for, write_atomic, FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::output::Report;
use crate::priority::{set_priority_keep_indent, Priority};
use crate::vault::{display_path, TaskItem, Vault};

/// Outcome of one line edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineEdit {
    /// Vault-relative note path.
    pub path: PathBuf,
    /// Zero-based index the edit landed on.
    pub line: usize,
    pub before: String,
    pub after: String,
    /// False when the transform left the line as it was; nothing is written.
    pub changed: bool,
}

impl LineEdit {
    /// `file:line` with a one-based line.
    pub fn location(&self) -> String {
        format!("{}:{}", display_path(&self.path), self.line + 1)
    }

    /// The old and new text as `-`/`+` lines, or nothing when unchanged.
    pub fn diff_lines(&self) -> Vec<String> {
        if !self.changed {
            return Vec::new();
        }
        vec![
            format!("- {}", self.before.trim()),
            format!("+ {}", self.after.trim()),
        ]
    }
}

/// Result of moving a whole priority section.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MoveReport {
    pub from: Priority,
    pub to: Priority,
    pub moved: usize,
    pub unchanged: usize,
    pub edits: Vec<LineEdit>,
}

impl Report for MoveReport {
    fn render(&self) -> String {
        let mut lines = vec![format!("{} -> {}", self.from, self.to)];
        if self.from == self.to {
            lines.push(format!("nothing to move: tasks are already {}", self.to));
            return lines.join("\n");
        }
        lines.push(format!("moved: {}", self.moved));
        if self.unchanged > 0 {
            lines.push(format!("unchanged: {}", self.unchanged));
        }
        for edit in self.edits.iter().filter(|edit| edit.changed) {
            lines.push(format!("  {}  {}", edit.location(), edit.after.trim()));
        }
        lines.join("\n")
    }
}

#[derive(Debug, Clone)]
pub struct LineEditor {
    vault: Vault,
    lock_timeout_ms: u64,
}

impl LineEditor {
    pub fn new(vault: Vault, lock_timeout_ms: u64) -> Self {
        Self {
            vault,
            lock_timeout_ms,
        }
    }

    pub fn with_default_timeout(vault: Vault) -> Self {
        Self::new(vault, DEFAULT_LOCK_TIMEOUT_MS)
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    /// Apply `transform` to one line of a note.
    ///
    /// `transform` sees the line without its `\r`; a CRLF ending is restored
    /// afterwards. With `expected`, the line must still hold that text, or
    /// exactly one other line in the note must.
    pub fn update_line<F>(
        &self,
        path: &Path,
        line: usize,
        expected: Option<&str>,
        transform: F,
    ) -> Result<LineEdit>
    where
        F: FnOnce(&str) -> String,
    {
        let relative = self.vault.relativize(path)?;
        let absolute = self.vault.root().join(&relative);
        let lock = FileLock::acquire(
            lock_path_for(self.vault.root(), &relative),
            self.lock_timeout_ms,
        )?;
        debug!(file = %relative.display(), lock = %lock.path().display(), "note locked");

        let content = fs::read_to_string(&absolute)?;
        let mut lines: Vec<&str> = content.split('\n').collect();
        let line_count = if content.ends_with('\n') {
            lines.len() - 1
        } else {
            lines.len()
        };

        let target = match expected {
            None if line < line_count => line,
            None => {
                return Err(Error::LineOutOfRange {
                    path: relative,
                    line,
                    len: line_count,
                });
            }
            Some(text) => locate(&lines[..line_count], line, text).ok_or_else(|| {
                Error::TaskMoved {
                    path: relative.clone(),
                    expected: text.to_string(),
                }
            })?,
        };
        if target != line {
            info!(
                file = %relative.display(),
                from = line + 1,
                to = target + 1,
                "task found on a different line"
            );
        }

        let current = lines[target];
        let (body, ending) = match current.strip_suffix('\r') {
            Some(body) => (body, "\r"),
            None => (current, ""),
        };
        let after = transform(body);
        let mut edit = LineEdit {
            path: relative,
            line: target,
            before: body.to_string(),
            after,
            changed: false,
        };
        if edit.after == edit.before {
            debug!(location = %edit.location(), "line unchanged, skipping write");
            return Ok(edit);
        }

        let replacement = format!("{}{ending}", edit.after);
        lines[target] = &replacement;
        write_atomic(&absolute, lines.join("\n").as_bytes())?;
        edit.changed = true;

        info!(location = %edit.location(), before = %edit.before, after = %edit.after, "updated task line");
        Ok(edit)
    }

    /// Rewrite the task's priority marker, keeping its indentation.
    pub fn update_task_priority(&self, task: &TaskItem, priority: Priority) -> Result<LineEdit> {
        self.update_line(&task.file, task.line, Some(&task.raw), |body| {
            set_priority_keep_indent(body, priority)
        })
    }

    /// Check or uncheck the task, stamping `today` when completing.
    pub fn update_task_completion(
        &self,
        task: &TaskItem,
        completed: bool,
        today: NaiveDate,
    ) -> Result<LineEdit> {
        self.update_line(&task.file, task.line, Some(&task.raw), |body| {
            set_completion(body, completed, today)
        })
    }

    /// Move every task currently at `from` to `to`.
    ///
    /// Stops at the first failure. Edits already written stay written.
    pub fn move_priority(
        &self,
        tasks: &[TaskItem],
        from: Priority,
        to: Priority,
    ) -> Result<MoveReport> {
        let mut report = MoveReport {
            from,
            to,
            ..MoveReport::default()
        };
        if from == to {
            return Ok(report);
        }

        for task in tasks.iter().filter(|task| task.priority == from) {
            match self.update_task_priority(task, to) {
                Ok(edit) => {
                    if edit.changed {
                        report.moved += 1;
                    } else {
                        report.unchanged += 1;
                    }
                    report.edits.push(edit);
                }
                Err(err) => {
                    warn!(
                        applied = report.moved,
                        failed_at = %task.location(),
                        error = %err,
                        "priority move aborted"
                    );
                    return Err(err);
                }
            }
        }

        info!(from = %from, to = %to, moved = report.moved, "moved priority section");
        Ok(report)
    }
}

/// Index holding `expected`: `hint` if it still matches, otherwise the only
/// line in the note with that exact text.
fn locate(lines: &[&str], hint: usize, expected: &str) -> Option<usize> {
    let matches_expected = |raw: &str| raw.strip_suffix('\r').unwrap_or(raw) == expected;

    if lines.get(hint).is_some_and(|raw| matches_expected(raw)) {
        return Some(hint);
    }

    let mut found = lines
        .iter()
        .enumerate()
        .filter(|(_, raw)| matches_expected(raw))
        .map(|(index, _)| index);
    match (found.next(), found.next()) {
        (Some(index), None) => Some(index),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup(content: &str) -> (TempDir, LineEditor) {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("note.md"), content).expect("write");
        let vault = Vault::open(dir.path()).expect("vault");
        (dir, LineEditor::new(vault, 1000))
    }

    fn read(dir: &TempDir) -> String {
        fs::read_to_string(dir.path().join("note.md")).expect("read")
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    #[test]
    fn sets_priority_in_place() {
        let (dir, editor) = setup("# Tasks\n  - [ ] nested 🔽\n- [ ] other\n");
        let task = editor.vault().task_at(Path::new("note.md"), 1).expect("task");

        let edit = editor
            .update_task_priority(&task, Priority::High)
            .expect("edit");
        assert!(edit.changed);
        assert_eq!(edit.after, "  - [ ] nested ⏫");
        assert_eq!(read(&dir), "# Tasks\n  - [ ] nested ⏫\n- [ ] other\n");
    }

    #[test]
    fn completion_keeps_crlf_endings() {
        let (dir, editor) = setup("- [ ] one\r\n- [ ] two\r\n");
        let task = editor.vault().task_at(Path::new("note.md"), 1).expect("task");

        editor
            .update_task_completion(&task, true, day(2024, 1, 1))
            .expect("edit");
        assert_eq!(read(&dir), "- [ ] one\r\n- [x] two ✅ 2024-01-01\r\n");
    }

    #[test]
    fn follows_a_task_that_shifted() {
        let (dir, editor) = setup("- [ ] alpha\n- [ ] beta\n");
        let task = editor.vault().task_at(Path::new("note.md"), 1).expect("task");
        fs::write(dir.path().join("note.md"), "new heading\n\n- [ ] alpha\n- [ ] beta\n")
            .expect("rewrite");

        let edit = editor
            .update_task_priority(&task, Priority::Highest)
            .expect("edit");
        assert_eq!(edit.line, 3);
        assert_eq!(read(&dir), "new heading\n\n- [ ] alpha\n- [ ] beta 🔺\n");
    }

    #[test]
    fn vanished_or_ambiguous_task_is_stale() {
        let (dir, editor) = setup("- [ ] alpha\n- [ ] beta\n");
        let task = editor.vault().task_at(Path::new("note.md"), 1).expect("task");

        fs::write(dir.path().join("note.md"), "- [ ] alpha\n- [ ] gamma\n").expect("rewrite");
        let err = editor
            .update_task_priority(&task, Priority::High)
            .expect_err("vanished");
        assert!(matches!(err, Error::TaskMoved { .. }));
        assert_eq!(err.exit_code(), 3);

        fs::write(dir.path().join("note.md"), "- [ ] x\n- [ ] beta\n- [ ] beta\n")
            .expect("rewrite");
        let mut shifted = task.clone();
        shifted.line = 0;
        let err = editor
            .update_task_priority(&shifted, Priority::High)
            .expect_err("ambiguous");
        assert!(matches!(err, Error::TaskMoved { .. }));
    }

    #[test]
    fn out_of_range_without_expectation() {
        let (_dir, editor) = setup("- [ ] only\n");
        let err = editor
            .update_line(Path::new("note.md"), 1, None, str::to_string)
            .expect_err("range");
        assert!(matches!(err, Error::LineOutOfRange { len: 1, .. }));
    }

    #[test]
    fn unchanged_line_is_not_rewritten() {
        let (dir, editor) = setup("- [ ] same ⏫");
        let before = fs::metadata(dir.path().join("note.md"))
            .and_then(|meta| meta.modified())
            .expect("mtime");
        let task = editor.vault().task_at(Path::new("note.md"), 0).expect("task");

        let edit = editor
            .update_task_priority(&task, Priority::High)
            .expect("edit");
        assert!(!edit.changed);
        let after = fs::metadata(dir.path().join("note.md"))
            .and_then(|meta| meta.modified())
            .expect("mtime");
        assert_eq!(before, after);
        assert_eq!(read(&dir), "- [ ] same ⏫");
    }

    #[test]
    fn moves_a_whole_section() {
        let (dir, editor) = setup("- [ ] a 🔽\n- [ ] b\n- [ ] c 🔽\n");
        let tasks = crate::vault::parse_tasks(Path::new("note.md"), &read(&dir));

        let report = editor
            .move_priority(&tasks, Priority::Low, Priority::Medium)
            .expect("move");
        assert_eq!(report.moved, 2);
        assert_eq!(read(&dir), "- [ ] a 🔼\n- [ ] b\n- [ ] c 🔼\n");

        let noop = editor
            .move_priority(&tasks, Priority::Low, Priority::Low)
            .expect("noop");
        assert_eq!(noop.moved, 0);
        assert!(noop.edits.is_empty());
    }

    #[test]
    fn move_report_lists_rewritten_lines() {
        let (dir, editor) = setup("- [ ] a 🔽\n- [ ] b\n");
        let tasks = crate::vault::parse_tasks(Path::new("note.md"), &read(&dir));

        let report = editor
            .move_priority(&tasks, Priority::Low, Priority::Highest)
            .expect("move");
        assert_eq!(
            report.render(),
            "Low -> Highest\nmoved: 1\n  note.md:1  - [ ] a 🔺"
        );

        let noop = editor
            .move_priority(&tasks, Priority::High, Priority::High)
            .expect("noop");
        assert_eq!(
            noop.render(),
            "High -> High\nnothing to move: tasks are already High"
        );
    }

    #[test]
    fn diff_lines_only_for_changed_edits() {
        let (_dir, editor) = setup("- [ ] a\n");
        let task = editor.vault().task_at(Path::new("note.md"), 0).expect("task");

        let edit = editor
            .update_task_priority(&task, Priority::Low)
            .expect("edit");
        assert_eq!(edit.diff_lines(), vec!["- - [ ] a", "+ - [ ] a 🔽"]);

        let task = editor.vault().task_at(Path::new("note.md"), 0).expect("task");
        let again = editor
            .update_task_priority(&task, Priority::Low)
            .expect("edit");
        assert!(again.diff_lines().is_empty());
    }

    #[test]
    fn move_stops_at_first_stale_task() {
        let (dir, editor) = setup("- [ ] a 🔽\n- [ ] b 🔽\n");
        let mut tasks = crate::vault::parse_tasks(Path::new("note.md"), &read(&dir));
        tasks[1].raw = "- [ ] vanished 🔽".to_string();

        let err = editor
            .move_priority(&tasks, Priority::Low, Priority::High)
            .expect_err("stale");
        assert!(matches!(err, Error::TaskMoved { .. }));
        assert_eq!(read(&dir), "- [ ] a ⏫\n- [ ] b 🔽\n");
    }

    #[test]
    fn concurrent_edits_to_one_note_all_land() {
        let content: String = (0..8).map(|i| format!("- [ ] task {i}\n")).collect();
        let (dir, editor) = setup(&content);
        let tasks = crate::vault::parse_tasks(Path::new("note.md"), &content);
        let barrier = std::sync::Arc::new(std::sync::Barrier::new(tasks.len()));

        let handles: Vec<_> = tasks
            .into_iter()
            .map(|task| {
                let editor = editor.clone();
                let barrier = std::sync::Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    editor.update_task_priority(&task, Priority::High)
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread").expect("edit");
        }

        let expected: String = (0..8).map(|i| format!("- [ ] task {i} ⏫\n")).collect();
        assert_eq!(read(&dir), expected);
    }

    #[test]
    fn missing_note_is_an_io_error() {
        let (_dir, editor) = setup("");
        let err = editor
            .update_line(Path::new("gone.md"), 0, None, str::to_string)
            .expect_err("missing");
        assert!(matches!(err, Error::Io(_)));
    }
}
