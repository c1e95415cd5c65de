//! taskprio line command implementation
//!
//! Runs the pure line codec over an argument or stdin lines. Output is one
//! result per input line so it composes with other text tools.

use std::io::{self, BufRead};

use chrono::NaiveDate;
use serde::Serialize;

use crate::completion::set_completion;
use crate::error::Result;
use crate::output::{emit, OutputOptions, Report};
use crate::priority::{classify_priority, set_priority};
use crate::title::clean_title;

pub enum Action {
    Classify,
    Title,
    SetPriority(String),
    Complete(NaiveDate),
    Reopen,
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::Classify => "classify",
            Action::Title => "title",
            Action::SetPriority(_) => "set-priority",
            Action::Complete(_) => "complete",
            Action::Reopen => "reopen",
        }
    }

    fn apply(&self, line: &str) -> String {
        match self {
            Action::Classify => classify_priority(line).to_string(),
            Action::Title => clean_title(line),
            Action::SetPriority(priority) => set_priority(line, priority),
            Action::Complete(today) => set_completion(line, true, *today),
            // Reopening never reads the date.
            Action::Reopen => set_completion(line, false, NaiveDate::MIN),
        }
    }
}

pub struct LineOptions {
    pub action: Action,
    pub text: Option<String>,
    pub json: bool,
}

#[derive(Serialize)]
struct LineResult {
    input: String,
    output: String,
}

/// Outputs only, one per line, so the commands compose in pipes.
#[derive(Serialize)]
#[serde(transparent)]
struct LineResults(Vec<LineResult>);

impl Report for LineResults {
    fn render(&self) -> String {
        self.0
            .iter()
            .map(|result| result.output.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn run(options: LineOptions) -> Result<()> {
    let inputs = match options.text {
        Some(text) => vec![text],
        None => io::stdin()
            .lock()
            .lines()
            .map(|line| line.map(|l| l.trim_end_matches('\r').to_string()))
            .collect::<io::Result<Vec<_>>>()?,
    };

    let results = LineResults(
        inputs
            .into_iter()
            .map(|input| LineResult {
                output: options.action.apply(&input),
                input,
            })
            .collect(),
    );

    emit(
        OutputOptions {
            json: options.json,
            quiet: false,
        },
        &format!("line {}", options.action.name()),
        &results,
    )
}
