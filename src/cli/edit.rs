//! taskprio set, move, done and undone command implementations
//!
//! Every command re-reads the addressed task from disk and hands its text to
//! the line editor as the expected content, so a note edited since the last
//! board render is caught instead of clobbered.

use std::path::PathBuf;

use chrono::Local;
use serde::Serialize;

use crate::cli::board::resolve_query;
use crate::cli::{parse_date, VaultContext};
use crate::edit::{LineEdit, LineEditor};
use crate::error::{Error, Result};
use crate::output::{emit, OutputOptions, Report};
use crate::priority::Priority;
use crate::vault::{TaskItem, TaskLocation};

/// Options for the set command
pub struct SetOptions {
    pub location: String,
    pub priority: String,
    pub expect: Option<String>,
    pub vault: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

/// Options for the move command
pub struct MoveOptions {
    pub from: String,
    pub to: String,
    pub query: Option<String>,
    pub vault: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

/// Options for the done and undone commands
pub struct CompletionOptions {
    pub location: String,
    pub completed: bool,
    pub date: Option<String>,
    pub vault: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub fn run_set(options: SetOptions) -> Result<()> {
    let priority: Priority = options.priority.parse()?;
    let ctx = VaultContext::open(options.vault)?;
    let task = addressed_task(&ctx, &options.location, options.expect.as_deref())?;

    let editor = LineEditor::new(ctx.vault.clone(), ctx.config.edit.lock_timeout_ms);
    let edit = editor.update_task_priority(&task, priority)?;

    let headline = if edit.changed {
        format!("taskprio set: {} is now {priority}", edit.location())
    } else {
        format!("taskprio set: {} already {priority}", edit.location())
    };
    emit(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "set",
        &EditOutcome {
            edit: &edit,
            headline,
        },
    )
}

pub fn run_completion(options: CompletionOptions) -> Result<()> {
    let today = parse_date(options.date.as_deref())?;
    let ctx = VaultContext::open(options.vault)?;
    let task = addressed_task(&ctx, &options.location, None)?;

    let editor = LineEditor::new(ctx.vault.clone(), ctx.config.edit.lock_timeout_ms);
    let edit = editor.update_task_completion(&task, options.completed, today)?;

    let (command, state) = if options.completed {
        ("done", "complete")
    } else {
        ("undone", "open")
    };
    let headline = if edit.changed {
        format!("taskprio {command}: {} marked {state}", edit.location())
    } else {
        format!("taskprio {command}: {} already {state}", edit.location())
    };
    emit(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        command,
        &EditOutcome {
            edit: &edit,
            headline,
        },
    )
}

pub fn run_move(options: MoveOptions) -> Result<()> {
    let from: Priority = options.from.parse()?;
    let to: Priority = options.to.parse()?;
    let ctx = VaultContext::open(options.vault)?;
    let query = resolve_query(&ctx, options.query.as_deref())?;

    let today = Local::now().date_naive();
    let tasks = query.filter(ctx.vault.scan(&ctx.config.scan_options())?, today);

    let editor = LineEditor::new(ctx.vault.clone(), ctx.config.edit.lock_timeout_ms);
    let report = editor.move_priority(&tasks, from, to)?;

    emit(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "move",
        &report,
    )
}

/// The task at `location`, re-read from disk or taken from `expect`.
fn addressed_task(
    ctx: &VaultContext,
    location: &str,
    expect: Option<&str>,
) -> Result<TaskItem> {
    let location: TaskLocation = location.parse()?;
    let file = ctx.vault.relativize(&location.file)?;
    match expect {
        Some(text) => TaskItem::from_line(file, location.line, text).ok_or_else(|| {
            Error::InvalidArgument(format!("--expect is not a task line: {text:?}"))
        }),
        None => ctx.vault.task_at(&file, location.line),
    }
}

/// A single-line edit with the command's own headline; JSON is the bare edit.
#[derive(Serialize)]
#[serde(transparent)]
struct EditOutcome<'a> {
    edit: &'a LineEdit,
    #[serde(skip)]
    headline: String,
}

impl Report for EditOutcome<'_> {
    fn render(&self) -> String {
        let mut lines = vec![self.headline.clone()];
        lines.extend(self.edit.diff_lines());
        lines.join("\n")
    }
}
