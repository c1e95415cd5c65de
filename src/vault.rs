//! Vault scanning: discovering checkbox tasks in markdown notes.
//!
//! A vault is a directory tree of markdown files. Every line with a strict
//! task prefix outside fenced code blocks becomes a [`TaskItem`], addressed
//! by its vault-relative path and zero-based line index.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::checkbox;
use crate::completion::{completion_date, due_date};
use crate::error::{Error, Result};
use crate::priority::{classify_priority, Priority};
use crate::title::clean_title;

/// A task discovered in a vault note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskItem {
    /// Path relative to the vault root.
    pub file: PathBuf,
    /// Zero-based line index at discovery time.
    pub line: usize,
    /// Line text at discovery time, without any trailing `\r`.
    pub raw: String,
    pub title: String,
    pub priority: Priority,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<NaiveDate>,
}

impl TaskItem {
    /// Build a task from one line, or `None` if the line is not a task.
    pub fn from_line(file: impl Into<PathBuf>, line: usize, raw: &str) -> Option<Self> {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let prefix = checkbox::parse_prefix(raw)?;
        Some(Self {
            file: file.into(),
            line,
            raw: raw.to_string(),
            title: clean_title(raw),
            priority: classify_priority(raw),
            completed: prefix.state.is_done(),
            due: due_date(raw),
            done: completion_date(raw),
        })
    }

    /// `file:line` with a one-based line number.
    pub fn location(&self) -> String {
        format!("{}:{}", display_path(&self.file), self.line + 1)
    }
}

/// A `file:line` reference as typed on the command line (one-based line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLocation {
    pub file: PathBuf,
    /// Zero-based line index.
    pub line: usize,
}

impl FromStr for TaskLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (file, line) = s.trim().rsplit_once(':').ok_or_else(|| {
            Error::InvalidArgument(format!("expected <file>:<line>, got '{s}'"))
        })?;
        if file.is_empty() {
            return Err(Error::InvalidArgument(format!("missing file in '{s}'")));
        }
        let line: usize = line.parse().map_err(|_| {
            Error::InvalidArgument(format!("invalid line number '{line}' in '{s}'"))
        })?;
        if line == 0 {
            return Err(Error::InvalidArgument(
                "line numbers start at 1".to_string(),
            ));
        }
        Ok(Self {
            file: PathBuf::from(file),
            line: line - 1,
        })
    }
}

/// Which files a scan visits.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Glob patterns relative to the vault root.
    pub include: Vec<String>,
    /// Glob patterns relative to the vault root; matches are skipped.
    pub exclude: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            include: vec!["**/*.md".to_string()],
            exclude: vec![".obsidian/**".to_string(), ".trash/**".to_string()],
        }
    }
}

/// Handle on a vault directory.
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    /// Open a vault rooted at `root`, which must be an existing directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::VaultNotFound(root));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a vault-relative file.
    ///
    /// Rejects paths that would escape the vault.
    pub fn resolve(&self, file: &Path) -> Result<PathBuf> {
        let relative = self.relativize(file)?;
        Ok(self.root.join(relative))
    }

    /// Vault-relative form of `file`, accepting absolute paths inside the vault.
    pub fn relativize(&self, file: &Path) -> Result<PathBuf> {
        let relative = if file.is_absolute() {
            file.strip_prefix(&self.root)
                .map_err(|_| {
                    Error::InvalidArgument(format!(
                        "{} is outside the vault {}",
                        file.display(),
                        self.root.display()
                    ))
                })?
                .to_path_buf()
        } else {
            file.to_path_buf()
        };

        if relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir))
        {
            return Err(Error::InvalidArgument(format!(
                "{} is not a path inside the vault",
                file.display()
            )));
        }
        Ok(relative)
    }

    /// Vault-relative markdown files selected by `options`, sorted.
    pub fn markdown_files(&self, options: &ScanOptions) -> Result<Vec<PathBuf>> {
        let excludes = options
            .exclude
            .iter()
            .map(|pattern| glob::Pattern::new(pattern))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let root_pattern = glob::Pattern::escape(&self.root.to_string_lossy());
        let mut files = Vec::new();
        for include in &options.include {
            let pattern = format!("{root_pattern}/{include}");
            let entries = glob::glob(&pattern)?;
            for entry in entries {
                let path = match entry {
                    Ok(path) => path,
                    Err(err) => {
                        warn!(error = %err, "skipping unreadable vault entry");
                        continue;
                    }
                };
                if !path.is_file() {
                    continue;
                }
                let Ok(relative) = path.strip_prefix(&self.root) else {
                    continue;
                };
                if excludes.iter().any(|pattern| pattern.matches_path(relative)) {
                    continue;
                }
                files.push(relative.to_path_buf());
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Discover every task in the vault.
    pub fn scan(&self, options: &ScanOptions) -> Result<Vec<TaskItem>> {
        let mut tasks = Vec::new();
        for file in self.markdown_files(options)? {
            let content = match fs::read(self.root.join(&file)) {
                Ok(bytes) => match String::from_utf8(bytes) {
                    Ok(content) => content,
                    Err(_) => {
                        warn!(file = %file.display(), "skipping non-UTF-8 note");
                        continue;
                    }
                },
                Err(err) => {
                    warn!(file = %file.display(), error = %err, "skipping unreadable note");
                    continue;
                }
            };
            let found = parse_tasks(&file, &content);
            debug!(file = %file.display(), tasks = found.len(), "scanned note");
            tasks.extend(found);
        }
        Ok(tasks)
    }

    /// Re-read one task from disk.
    pub fn task_at(&self, file: &Path, line: usize) -> Result<TaskItem> {
        let relative = self.relativize(file)?;
        let content = fs::read_to_string(self.root.join(&relative))?;
        content
            .split('\n')
            .nth(line)
            .and_then(|raw| TaskItem::from_line(relative.clone(), line, raw))
            .ok_or(Error::TaskNotFound {
                path: relative,
                line,
            })
    }
}

/// Extract tasks from note content, skipping fenced code blocks.
pub fn parse_tasks(file: &Path, content: &str) -> Vec<TaskItem> {
    let mut tasks = Vec::new();
    let mut fence: Option<&str> = None;

    for (index, raw) in content.split('\n').enumerate() {
        let trimmed = raw.trim_start();
        let opener = ["```", "~~~"]
            .into_iter()
            .find(|token| trimmed.starts_with(token));

        match (fence, opener) {
            (None, Some(token)) => {
                fence = Some(token);
                continue;
            }
            (Some(open), Some(token)) if open == token => {
                fence = None;
                continue;
            }
            (Some(_), _) => continue,
            (None, None) => {}
        }

        if let Some(task) = TaskItem::from_line(file, index, raw) {
            tasks.push(task);
        }
    }
    tasks
}

/// Path with forward slashes, for stable display across platforms.
pub fn display_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
