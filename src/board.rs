//! Priority board: tasks grouped into one section per priority level.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::output::Report;
use crate::priority::Priority;
use crate::vault::TaskItem;

/// Ordering of tasks inside a section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Due date ascending, undated tasks last.
    #[default]
    Date,
    /// Vault path, then line.
    File,
    /// Title, case-insensitive.
    Text,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::File => "file",
            SortKey::Text => "text",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(SortKey::Date),
            "file" => Ok(SortKey::File),
            "text" => Ok(SortKey::Text),
            other => Err(Error::InvalidArgument(format!(
                "unknown sort '{other}' (expected date|file|text)"
            ))),
        }
    }
}

/// Order in which sections are listed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriorityOrder {
    #[default]
    HighToLow,
    LowToHigh,
}

impl PriorityOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            PriorityOrder::HighToLow => "high-to-low",
            PriorityOrder::LowToHigh => "low-to-high",
        }
    }

    /// Every level in display order.
    pub fn levels(self) -> Vec<Priority> {
        let mut levels = Priority::ALL.to_vec();
        if self == PriorityOrder::HighToLow {
            levels.reverse();
        }
        levels
    }
}

impl fmt::Display for PriorityOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriorityOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high-to-low" => Ok(PriorityOrder::HighToLow),
            "low-to-high" => Ok(PriorityOrder::LowToHigh),
            other => Err(Error::InvalidArgument(format!(
                "unknown priority order '{other}' (expected high-to-low|low-to-high)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoardOptions {
    pub sort: SortKey,
    pub order: PriorityOrder,
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub priority: Priority,
    pub count: usize,
    pub tasks: Vec<TaskItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Board {
    pub sort: SortKey,
    pub order: PriorityOrder,
    pub total: usize,
    pub sections: Vec<Section>,
}

impl Board {
    /// Group `tasks` by priority. Every level gets a section, even when empty.
    pub fn build(tasks: Vec<TaskItem>, options: &BoardOptions) -> Self {
        let total = tasks.len();
        let mut sections: Vec<Section> = options
            .order
            .levels()
            .into_iter()
            .map(|priority| Section {
                priority,
                count: 0,
                tasks: Vec::new(),
            })
            .collect();

        for task in tasks {
            if let Some(section) = sections.iter_mut().find(|s| s.priority == task.priority) {
                section.tasks.push(task);
            }
        }
        for section in &mut sections {
            sort_tasks(&mut section.tasks, options.sort);
            section.count = section.tasks.len();
        }

        Self {
            sort: options.sort,
            order: options.order,
            total,
            sections,
        }
    }

    pub fn section(&self, priority: Priority) -> Option<&Section> {
        self.sections.iter().find(|s| s.priority == priority)
    }
}

impl Report for Board {
    /// One block per section.
    fn render(&self) -> String {
        let mut lines = Vec::new();
        for section in &self.sections {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push(format!("Priority {} ({})", section.priority, section.count));
            for task in &section.tasks {
                lines.push(render_entry(task));
            }
        }
        lines.join("\n")
    }
}

/// `- <title>  (<file>:<line>)` with a one-based line.
pub fn render_entry(task: &TaskItem) -> String {
    format!("- {}  ({})", task.title, task.location())
}

/// Stable sort by `key`, with file and line as the final tie-break.
pub fn sort_tasks(tasks: &mut [TaskItem], key: SortKey) {
    tasks.sort_by(|left, right| {
        let primary = match key {
            SortKey::Date => compare_due(left, right),
            SortKey::File => Ordering::Equal,
            SortKey::Text => left.title.to_lowercase().cmp(&right.title.to_lowercase()),
        };
        primary
            .then_with(|| left.file.cmp(&right.file))
            .then_with(|| left.line.cmp(&right.line))
    });
}

fn compare_due(left: &TaskItem, right: &TaskItem) -> Ordering {
    match (left.due, right.due) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
