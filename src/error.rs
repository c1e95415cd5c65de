//! Error types for taskprio
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, missing vault, bad query)
//! - 3: Stale task (the addressed line no longer holds the expected text)
//! - 4: Operation failed (I/O, lock contention, watcher failure)
//!
//! The line codec itself never fails; every variant here originates at the
//! vault or file boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the taskprio CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const STALE_TASK: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for taskprio operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Vault not found: {0}")]
    VaultNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid query: {message} at {position}")]
    InvalidQuery { message: String, position: usize },

    #[error("No task at {}:{}", .path.display(), .line + 1)]
    TaskNotFound { path: PathBuf, line: usize },

    #[error("Line {} is out of range for {} ({} lines)", .line + 1, .path.display(), .len)]
    LineOutOfRange {
        path: PathBuf,
        line: usize,
        len: usize,
    },

    // Stale addressing (exit code 3)
    #[error("Task moved or changed in {path}: expected {expected:?}")]
    TaskMoved { path: PathBuf, expected: String },

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Glob error: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::VaultNotFound(_)
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::InvalidQuery { .. }
            | Error::TaskNotFound { .. }
            | Error::LineOutOfRange { .. } => exit_codes::USER_ERROR,

            // Stale addressing
            Error::TaskMoved { .. } => exit_codes::STALE_TASK,

            // Operation failures
            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::Glob(_)
            | Error::Watch(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output, when the variant has any.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::InvalidQuery { position, .. } => {
                Some(serde_json::json!({ "position": position }))
            }
            Error::TaskNotFound { path, line } => Some(serde_json::json!({
                "path": path,
                "line": line + 1,
            })),
            Error::LineOutOfRange { path, line, len } => Some(serde_json::json!({
                "path": path,
                "line": line + 1,
                "len": len,
            })),
            Error::TaskMoved { path, expected } => Some(serde_json::json!({
                "path": path,
                "expected": expected,
            })),
            _ => None,
        }
    }
}

impl From<crate::query::QueryError> for Error {
    fn from(err: crate::query::QueryError) -> Self {
        Error::InvalidQuery {
            message: err.message,
            position: err.position,
        }
    }
}

/// Result type alias for taskprio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
