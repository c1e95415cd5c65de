use std::path::PathBuf;

use serde_json::Value;
use taskprio::error::{exit_codes, Error, JsonError};
use taskprio::query::parse_query;

#[test]
fn exit_code_user_error() {
    let err = Error::InvalidArgument("bad input".to_string());
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
}

#[test]
fn exit_code_stale_task() {
    let err = Error::TaskMoved {
        path: PathBuf::from("notes/a.md"),
        expected: "- [ ] gone".to_string(),
    };
    assert_eq!(err.exit_code(), exit_codes::STALE_TASK);
}

#[test]
fn exit_code_operation_failed() {
    let err = Error::OperationFailed("boom".to_string());
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
    let err = Error::LockFailed(PathBuf::from(".taskprio/locks/a.md.lock"));
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn messages_use_one_based_lines() {
    let err = Error::LineOutOfRange {
        path: PathBuf::from("a.md"),
        line: 4,
        len: 3,
    };
    assert_eq!(err.to_string(), "Line 5 is out of range for a.md (3 lines)");

    let details = err.details().expect("details");
    assert_eq!(details["line"], 5);
    assert_eq!(details["len"], 3);
}

#[test]
fn query_errors_convert_with_position() {
    let err: Error = parse_query("open | ?").expect_err("bad query").into();
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    let details = err.details().expect("details");
    assert_eq!(details["position"], 7);
}

#[test]
fn json_error_includes_details() {
    let err = Error::TaskNotFound {
        path: PathBuf::from("notes/a.md"),
        line: 0,
    };
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::USER_ERROR);
    assert_eq!(json.error, "No task at notes/a.md:1");
    let details = json.details.expect("details");
    assert_eq!(details["path"], Value::String("notes/a.md".to_string()));
    assert_eq!(details["line"], 1);
}

#[test]
fn json_error_without_details() {
    let json = JsonError::from(&Error::InvalidConfig("bad config".to_string()));
    assert_eq!(json.code, exit_codes::USER_ERROR);
    assert!(json.details.is_none());
}
