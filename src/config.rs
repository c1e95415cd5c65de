//! Configuration loading and management
//!
//! Settings are layered: built-in defaults, then the user config file
//! (`<config dir>/taskprio/config.toml`), then the vault's `.taskprio.toml`.
//! Command-line flags override the result at the call site.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::{BoardOptions, PriorityOrder, SortKey};
use crate::error::{Error, Result};
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::query::{parse_query, QueryExpr, DEFAULT_QUERY};
use crate::vault::ScanOptions;

/// File name of the per-vault config.
pub const VAULT_CONFIG_FILE: &str = ".taskprio.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub board: BoardConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub edit: EditConfig,
}

/// Board rendering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Sort inside a section: date, file or text
    #[serde(default = "default_sort")]
    pub default_sort: String,

    /// Section order: high-to-low or low-to-high
    #[serde(default = "default_priority_order")]
    pub priority_order: String,

    /// Seconds between timed refreshes in watch mode; 0 disables
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
}

fn default_sort() -> String {
    SortKey::Date.to_string()
}

fn default_priority_order() -> String {
    PriorityOrder::HighToLow.to_string()
}

fn default_refresh_interval() -> u64 {
    30
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            default_sort: default_sort(),
            priority_order: default_priority_order(),
            refresh_interval: default_refresh_interval(),
        }
    }
}

/// Task selection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Query applied when none is given on the command line
    #[serde(default = "default_query")]
    pub default: String,

    /// Globs of notes to scan, relative to the vault root
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Globs of notes to skip
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

fn default_query() -> String {
    DEFAULT_QUERY.to_string()
}

fn default_include() -> Vec<String> {
    ScanOptions::default().include
}

fn default_exclude() -> Vec<String> {
    ScanOptions::default().exclude
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default: default_query(),
            include: default_include(),
            exclude: default_exclude(),
        }
    }
}

/// Note editing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditConfig {
    /// How long to wait for another writer's lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a single TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load defaults, then `user` (if any), then the vault's own file.
    ///
    /// Later layers override earlier ones key by key, so a vault file that
    /// only sets `board.default_sort` keeps the user's other settings.
    pub fn load_layered(user: Option<&Path>, vault_root: &Path) -> Result<Self> {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        let vault_file = vault_root.join(VAULT_CONFIG_FILE);

        for path in user.into_iter().chain(std::iter::once(vault_file.as_path())) {
            if !path.is_file() {
                continue;
            }
            debug!(path = %path.display(), "loading config layer");
            let content = std::fs::read_to_string(path)?;
            let layer: toml::Value = toml::from_str(&content)?;
            merge_values(&mut merged, layer);
        }

        let config: Config = merged.try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Layered load using the platform user config location.
    pub fn load_for_vault(vault_root: &Path) -> Result<Self> {
        let user = user_config_path();
        Self::load_layered(user.as_deref(), vault_root)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.board.validate()?;
        self.query.validate()?;
        if self.edit.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "edit.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn sort_key(&self) -> Result<SortKey> {
        self.board
            .default_sort
            .parse()
            .map_err(|_| invalid_value("board.default_sort", &self.board.default_sort))
    }

    pub fn priority_order(&self) -> Result<PriorityOrder> {
        self.board
            .priority_order
            .parse()
            .map_err(|_| invalid_value("board.priority_order", &self.board.priority_order))
    }

    pub fn board_options(&self) -> Result<BoardOptions> {
        Ok(BoardOptions {
            sort: self.sort_key()?,
            order: self.priority_order()?,
        })
    }

    pub fn default_query(&self) -> Result<QueryExpr> {
        Ok(parse_query(&self.query.default)?)
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            include: self.query.include.clone(),
            exclude: self.query.exclude.clone(),
        }
    }
}

impl BoardConfig {
    fn validate(&self) -> Result<()> {
        self.default_sort
            .parse::<SortKey>()
            .map_err(|_| invalid_value("board.default_sort", &self.default_sort))?;
        self.priority_order
            .parse::<PriorityOrder>()
            .map_err(|_| invalid_value("board.priority_order", &self.priority_order))?;

        if self.refresh_interval != 0 && !(5..=120).contains(&self.refresh_interval) {
            return Err(Error::InvalidConfig(format!(
                "board.refresh_interval must be 0 or between 5 and 120 seconds, got {}",
                self.refresh_interval
            )));
        }
        Ok(())
    }
}

impl QueryConfig {
    fn validate(&self) -> Result<()> {
        parse_query(&self.default).map_err(|err| {
            Error::InvalidConfig(format!("query.default: {} at {}", err.message, err.position))
        })?;

        if self.include.is_empty() {
            return Err(Error::InvalidConfig(
                "query.include cannot be empty".to_string(),
            ));
        }
        for pattern in self.include.iter().chain(&self.exclude) {
            glob::Pattern::new(pattern).map_err(|err| {
                Error::InvalidConfig(format!("invalid glob '{pattern}': {err}"))
            })?;
        }
        Ok(())
    }
}

fn invalid_value(key: &str, value: &str) -> Error {
    Error::InvalidConfig(format!("{key} has unknown value '{value}'"))
}

/// Per-user config file, when the platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "taskprio")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Recursive table merge; non-table values in `overlay` replace `base`.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
