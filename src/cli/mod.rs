//! Command-line interface for taskprio
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::vault::Vault;

mod board;
mod edit;
mod init;
mod line;

/// taskprio - priority board for markdown task vaults
///
/// Groups `- [ ]` tasks by their priority emoji and rewrites priorities and
/// completion in place.
#[derive(Parser, Debug)]
#[command(name = "taskprio")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Vault directory (defaults to current directory)
    #[arg(long, global = true, env = "TASKPRIO_VAULT")]
    pub vault: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default .taskprio.toml into the vault
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Show tasks grouped by priority
    Board {
        /// Task query (e.g. "open & above(normal)")
        #[arg(long)]
        query: Option<String>,

        /// Sort within a section: date, file, text
        #[arg(long)]
        sort: Option<String>,

        /// Section order: high-to-low, low-to-high
        #[arg(long)]
        order: Option<String>,

        /// Re-render when notes change
        #[arg(long)]
        watch: bool,
    },

    /// List matching tasks without grouping
    List {
        /// Task query
        #[arg(long)]
        query: Option<String>,

        /// Sort: date, file, text
        #[arg(long)]
        sort: Option<String>,
    },

    /// Set the priority of one task
    Set {
        /// Task location as <file>:<line> (one-based line)
        location: String,

        /// Priority: lowest, low, normal, medium, high, highest
        priority: String,

        /// Exact line text the task must still have
        #[arg(long, allow_hyphen_values = true)]
        expect: Option<String>,
    },

    /// Move every task of one priority to another
    Move {
        /// Current priority
        from: String,

        /// New priority
        to: String,

        /// Restrict the move to tasks matching this query
        #[arg(long)]
        query: Option<String>,
    },

    /// Mark a task complete
    Done {
        /// Task location as <file>:<line>
        location: String,

        /// Completion date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Mark a task incomplete
    Undone {
        /// Task location as <file>:<line>
        location: String,
    },

    /// Apply the line codec to text from arguments or stdin
    #[command(subcommand)]
    Line(LineCommands),
}

/// Pure line transforms; no vault access
#[derive(Subcommand, Debug)]
pub enum LineCommands {
    /// Print the priority of each line
    Classify {
        /// Line text (reads stdin lines when omitted)
        #[arg(allow_hyphen_values = true)]
        text: Option<String>,
    },

    /// Print the clean title of each line
    Title {
        #[arg(allow_hyphen_values = true)]
        text: Option<String>,
    },

    /// Rewrite the priority marker (exact level names; anything else means Normal)
    SetPriority {
        priority: String,
        #[arg(allow_hyphen_values = true)]
        text: Option<String>,
    },

    /// Check the box and stamp the completion date
    Complete {
        #[arg(allow_hyphen_values = true)]
        text: Option<String>,

        /// Completion date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Uncheck the box and drop the completion stamp
    Reopen {
        #[arg(allow_hyphen_values = true)]
        text: Option<String>,
    },
}

/// Vault plus its layered configuration.
pub(crate) struct VaultContext {
    pub vault: Vault,
    pub config: Config,
}

impl VaultContext {
    pub fn open(vault: Option<PathBuf>) -> Result<Self> {
        let root = match vault {
            Some(path) => path,
            None => std::env::current_dir()?,
        };
        let vault = Vault::open(root)?;
        let config = Config::load_for_vault(vault.root())?;
        Ok(Self { vault, config })
    }
}

pub(crate) fn parse_date(value: Option<&str>) -> Result<chrono::NaiveDate> {
    match value {
        Some(raw) => chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
            crate::error::Error::InvalidArgument(format!(
                "invalid date '{raw}' (expected YYYY-MM-DD)"
            ))
        }),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

impl Cli {
    /// Name reported in the JSON envelope, e.g. `board` or `line classify`.
    pub fn command_name(&self) -> &'static str {
        match &self.command {
            Commands::Init { .. } => "init",
            Commands::Board { .. } => "board",
            Commands::List { .. } => "list",
            Commands::Set { .. } => "set",
            Commands::Move { .. } => "move",
            Commands::Done { .. } => "done",
            Commands::Undone { .. } => "undone",
            Commands::Line(LineCommands::Classify { .. }) => "line classify",
            Commands::Line(LineCommands::Title { .. }) => "line title",
            Commands::Line(LineCommands::SetPriority { .. }) => "line set-priority",
            Commands::Line(LineCommands::Complete { .. }) => "line complete",
            Commands::Line(LineCommands::Reopen { .. }) => "line reopen",
        }
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Init { force } => init::run(init::InitOptions {
                vault: self.vault,
                force,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Board {
                query,
                sort,
                order,
                watch,
            } => board::run_board(board::BoardCmdOptions {
                query,
                sort,
                order,
                watch,
                vault: self.vault,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::List { query, sort } => board::run_list(board::ListOptions {
                query,
                sort,
                vault: self.vault,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Set {
                location,
                priority,
                expect,
            } => edit::run_set(edit::SetOptions {
                location,
                priority,
                expect,
                vault: self.vault,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Move { from, to, query } => edit::run_move(edit::MoveOptions {
                from,
                to,
                query,
                vault: self.vault,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Done { location, date } => edit::run_completion(edit::CompletionOptions {
                location,
                completed: true,
                date,
                vault: self.vault,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Undone { location } => edit::run_completion(edit::CompletionOptions {
                location,
                completed: false,
                date: None,
                vault: self.vault,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Line(cmd) => {
                let (action, text) = match cmd {
                    LineCommands::Classify { text } => (line::Action::Classify, text),
                    LineCommands::Title { text } => (line::Action::Title, text),
                    LineCommands::SetPriority { priority, text } => {
                        (line::Action::SetPriority(priority), text)
                    }
                    LineCommands::Complete { text, date } => {
                        (line::Action::Complete(parse_date(date.as_deref())?), text)
                    }
                    LineCommands::Reopen { text } => (line::Action::Reopen, text),
                };
                line::run(line::LineOptions {
                    action,
                    text,
                    json: self.json,
                })
            }
        }
    }
}
