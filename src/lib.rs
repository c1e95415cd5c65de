//! taskprio - priority board for markdown task vaults
//!
//! Tasks are markdown checkbox lines (`- [ ] ...`) whose priority is encoded
//! as a marker emoji. This library reads and rewrites those lines and builds
//! priority boards over a vault of notes.
//!
//! # Core Concepts
//!
//! - **Line codec**: pure functions that classify a line's priority, rewrite
//!   its marker, toggle completion and extract a display title
//! - **Vault**: a directory tree of markdown notes scanned for tasks
//! - **Query**: a small filter language over discovered tasks
//! - **Board**: tasks grouped into one section per priority level
//! - **Line editor**: locked, atomic, content-verified edits of single lines
//!
//! # Module Organization
//!
//! - `priority`: priority levels, markers, classification and rewriting
//! - `completion`: completion toggling and dated markers
//! - `title`: display titles
//! - `checkbox`: list marker and checkbox prefix recognition
//! - `vault`: note discovery and task scanning
//! - `query`: task query parser and evaluator
//! - `board`: grouping, sorting and rendering
//! - `edit`: read-modify-write of task lines
//! - `lock`: file locking and atomic writes
//! - `config`: layered configuration from `.taskprio.toml`
//! - `watch`: re-rendering on vault changes
//! - `output`: human and JSON output envelopes
//! - `cli`: command-line interface using clap

pub mod board;
pub mod checkbox;
pub mod cli;
pub mod completion;
pub mod config;
pub mod edit;
pub mod error;
pub mod lock;
pub mod output;
pub mod priority;
pub mod query;
pub mod title;
pub mod vault;
pub mod watch;

pub use completion::set_completion;
pub use error::{Error, Result};
pub use priority::{classify_priority, set_priority, Priority};
pub use title::clean_title;
