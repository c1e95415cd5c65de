//! taskprio board and list command implementations

use std::path::PathBuf;

use chrono::Local;
use serde::Serialize;

use crate::board::{render_entry, sort_tasks, Board, BoardOptions, SortKey};
use crate::cli::VaultContext;
use crate::error::Result;
use crate::output::{emit, OutputOptions, Report};
use crate::query::{parse_query, QueryExpr};
use crate::vault::TaskItem;
use crate::watch::{self, Trigger};

/// Options for the board command
pub struct BoardCmdOptions {
    pub query: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub watch: bool,
    pub vault: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

/// Options for the list command
pub struct ListOptions {
    pub query: Option<String>,
    pub sort: Option<String>,
    pub vault: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct ListReport {
    sort: SortKey,
    total: usize,
    tasks: Vec<TaskItem>,
}

impl Report for ListReport {
    /// One task per line, priority name first.
    fn render(&self) -> String {
        self.tasks
            .iter()
            .map(|task| format!("{:<7} {}", task.priority.name(), render_entry(task)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn run_board(options: BoardCmdOptions) -> Result<()> {
    let ctx = VaultContext::open(options.vault)?;
    let query = resolve_query(&ctx, options.query.as_deref())?;
    let mut board_options = ctx.config.board_options()?;
    if let Some(sort) = options.sort.as_deref() {
        board_options.sort = sort.parse()?;
    }
    if let Some(order) = options.order.as_deref() {
        board_options.order = order.parse()?;
    }
    let output = OutputOptions {
        json: options.json,
        quiet: options.quiet,
    };

    if !options.watch {
        let board = load_board(&ctx, &query, &board_options)?;
        return emit(output, "board", &board);
    }

    let refresh_interval = ctx.config.board.refresh_interval;
    watch::run(ctx.vault.root(), refresh_interval, |trigger| {
        let board = load_board(&ctx, &query, &board_options)?;
        if output.json {
            return emit(output, "board", &board);
        }
        watch::clear_screen()?;
        if !output.quiet {
            println!("{}\n", watch_status(trigger, refresh_interval));
        }
        emit(output, "board", &board)
    })
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let ctx = VaultContext::open(options.vault)?;
    let query = resolve_query(&ctx, options.query.as_deref())?;
    let sort = match options.sort.as_deref() {
        Some(sort) => sort.parse()?,
        None => ctx.config.sort_key()?,
    };

    let today = Local::now().date_naive();
    let mut tasks = query.filter(ctx.vault.scan(&ctx.config.scan_options())?, today);
    sort_tasks(&mut tasks, sort);

    let report = ListReport {
        sort,
        total: tasks.len(),
        tasks,
    };

    emit(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "list",
        &report,
    )
}

/// Command-line query if given, otherwise the configured default.
pub(crate) fn resolve_query(ctx: &VaultContext, query: Option<&str>) -> Result<QueryExpr> {
    match query {
        Some(text) => Ok(parse_query(text)?),
        None => ctx.config.default_query(),
    }
}

/// Status line shown above each watch-mode render.
fn watch_status(trigger: Trigger, refresh_interval: u64) -> String {
    let at = Local::now().format("%H:%M:%S");
    let cause = match trigger {
        Trigger::Initial => "watching for changes",
        Trigger::FileChange => "note changed",
        Trigger::Interval => "refreshed",
    };
    if refresh_interval == 0 {
        format!("taskprio board: {cause} at {at}")
    } else {
        format!("taskprio board: {cause} at {at} (every {refresh_interval}s)")
    }
}

fn load_board(ctx: &VaultContext, query: &QueryExpr, options: &BoardOptions) -> Result<Board> {
    let today = Local::now().date_naive();
    let tasks = query.filter(ctx.vault.scan(&ctx.config.scan_options())?, today);
    Ok(Board::build(tasks, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_status_names_the_trigger() {
        assert!(watch_status(Trigger::Initial, 0)
            .starts_with("taskprio board: watching for changes at "));
        assert!(watch_status(Trigger::FileChange, 30).contains("note changed"));
        assert!(watch_status(Trigger::Interval, 30).ends_with("(every 30s)"));
        assert!(!watch_status(Trigger::Interval, 0).contains("every"));
    }
}
