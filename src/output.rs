//! Where command results go.
//!
//! Every command produces a report value. With `--json` it is wrapped in the
//! `taskprio.v1` envelope; otherwise the report renders itself as plain text
//! through [`Report`]. Errors go to stderr as `error:` / `hint:` lines, or
//! into the same envelope with `status: "error"`.

use serde::Serialize;

use crate::error::{exit_codes, Error, Result};

pub const SCHEMA_VERSION: &str = "taskprio.v1";

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// A command result with a plain-text form.
pub trait Report: Serialize {
    fn render(&self) -> String;
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
enum Status {
    Success,
    Error,
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    schema_version: &'static str,
    command: &'a str,
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

/// The success envelope for `data`, pretty-printed.
pub fn success_json<T: Serialize>(command: &str, data: &T) -> Result<String> {
    let envelope = Envelope {
        schema_version: SCHEMA_VERSION,
        command,
        status: Status::Success,
        data: Some(data),
        error: None,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// The error envelope for `err`, pretty-printed.
pub fn error_json(command: &str, err: &Error) -> Result<String> {
    let envelope: Envelope<'_, ()> = Envelope {
        schema_version: SCHEMA_VERSION,
        command,
        status: Status::Error,
        data: None,
        error: Some(ErrorBody {
            message: err.to_string(),
            code: err.exit_code(),
            kind: error_kind(err),
            hint: error_hint(err),
            details: err.details(),
        }),
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

pub fn emit<R: Report>(options: OutputOptions, command: &str, report: &R) -> Result<()> {
    if options.json {
        println!("{}", success_json(command, report)?);
        return Ok(());
    }
    if options.quiet {
        return Ok(());
    }
    let text = report.render();
    if !text.is_empty() {
        println!("{text}");
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    if json {
        println!("{}", error_json(command, err)?);
        return Ok(());
    }
    eprintln!("error: {err}");
    if let Some(hint) = error_hint(err) {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        exit_codes::USER_ERROR => "user_error",
        exit_codes::STALE_TASK => "stale_task",
        _ => "operation_failed",
    }
}

/// What to try next, for the errors a user can act on.
pub fn error_hint(err: &Error) -> Option<&'static str> {
    match err {
        Error::TaskMoved { .. } | Error::TaskNotFound { .. } => {
            Some("run `taskprio list --query all` to find the task's current line")
        }
        Error::LineOutOfRange { .. } => Some("line numbers are one-based"),
        Error::VaultNotFound(_) => Some("pass --vault <dir> or set TASKPRIO_VAULT"),
        Error::InvalidConfig(_) => Some("fix .taskprio.toml then retry"),
        Error::InvalidQuery { .. } => {
            Some("queries combine terms like open, above(normal), path~\"dir/\" with | & ~")
        }
        Error::LockFailed(_) => Some("another edit holds the note; retry shortly"),
        _ => None,
    }
}
