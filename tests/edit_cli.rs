mod support;

use predicates::str::contains;
use support::{parse_json, TestVault};

const NOTE: &str = "# Work
- [ ] Ship release ⏫
- [ ] Write notes
  - [x] Old thing ⏫ ✅ 2024-01-01
";

fn vault() -> TestVault {
    let vault = TestVault::new();
    vault.write_note("work.md", NOTE);
    vault
}

#[test]
fn set_rewrites_one_line() {
    let vault = vault();
    vault
        .cmd()
        .args(["set", "work.md:3", "highest"])
        .assert()
        .success()
        .stdout(contains("work.md:3 is now Highest"));

    assert_eq!(
        vault.read_note("work.md"),
        "# Work\n- [ ] Ship release ⏫\n- [ ] Write notes 🔺\n  - [x] Old thing ⏫ ✅ 2024-01-01\n"
    );
}

#[test]
fn set_keeps_indentation() {
    let vault = vault();
    vault
        .cmd()
        .args(["set", "work.md:4", "low"])
        .assert()
        .success();
    vault
        .cmd()
        .args(["set", "work.md:2", "normal"])
        .assert()
        .success();

    assert_eq!(
        vault.read_note("work.md"),
        "# Work\n- [ ] Ship release\n- [ ] Write notes\n  - [x] Old thing ✅ 2024-01-01 🔽\n"
    );
}

#[test]
fn set_json_reports_the_edit() {
    let vault = vault();
    let output = vault
        .cmd()
        .args(["--json", "set", "work.md:2", "low"])
        .output()
        .expect("run set");
    assert!(output.status.success());

    let json = parse_json(&output.stdout);
    assert_eq!(json["command"], "set");
    assert_eq!(json["data"]["line"], 1);
    assert_eq!(json["data"]["before"], "- [ ] Ship release ⏫");
    assert_eq!(json["data"]["after"], "- [ ] Ship release 🔽");
    assert_eq!(json["data"]["changed"], true);
}

#[test]
fn set_rejects_non_tasks_and_unknown_priorities() {
    let vault = vault();
    vault
        .cmd()
        .args(["set", "work.md:1", "high"])
        .assert()
        .code(2)
        .stderr(contains("No task at work.md:1"));

    vault
        .cmd()
        .args(["set", "work.md:2", "urgent"])
        .assert()
        .code(2)
        .stderr(contains("unknown priority"));

    vault
        .cmd()
        .args(["set", "work.md", "high"])
        .assert()
        .code(2);

    assert_eq!(vault.read_note("work.md"), NOTE);
}

#[test]
fn stale_expectation_exits_with_code_three() {
    let vault = vault();
    let output = vault
        .cmd()
        .args(["--json", "set", "work.md:2", "high", "--expect", "- [ ] Something else"])
        .output()
        .expect("run set");
    assert_eq!(output.status.code(), Some(3));

    let json = parse_json(&output.stdout);
    assert_eq!(json["error"]["kind"], "stale_task");
    assert_eq!(json["error"]["details"]["expected"], "- [ ] Something else");
    assert_eq!(vault.read_note("work.md"), NOTE);
}

#[test]
fn expectation_follows_a_shifted_task() {
    let vault = vault();
    vault
        .cmd()
        .args(["set", "work.md:2", "medium", "--expect", "- [ ] Write notes"])
        .assert()
        .success()
        .stdout(contains("work.md:3"));

    assert!(vault.read_note("work.md").contains("\n- [ ] Write notes 🔼\n"));
}

#[test]
fn done_and_undone_toggle_completion() {
    let vault = vault();
    vault
        .cmd()
        .args(["done", "work.md:2", "--date", "2024-06-01"])
        .assert()
        .success()
        .stdout(contains("marked complete"));
    vault
        .cmd()
        .args(["undone", "work.md:4"])
        .assert()
        .success();

    assert_eq!(
        vault.read_note("work.md"),
        "# Work\n- [x] Ship release ⏫ ✅ 2024-06-01\n- [ ] Write notes\n  - [ ] Old thing ⏫\n"
    );

    vault
        .cmd()
        .args(["undone", "work.md:3"])
        .assert()
        .success()
        .stdout(contains("already open"));
}

#[test]
fn done_rejects_bad_dates() {
    vault()
        .cmd()
        .args(["done", "work.md:2", "--date", "June 1st"])
        .assert()
        .code(2)
        .stderr(contains("invalid date"));
}

#[test]
fn crlf_endings_survive_edits() {
    let vault = TestVault::new();
    vault.write_note("crlf.md", "- [ ] one\r\n- [ ] two ⏫\r\n");

    vault
        .cmd()
        .args(["set", "crlf.md:2", "low"])
        .assert()
        .success();
    vault
        .cmd()
        .args(["done", "crlf.md:1", "--date", "2024-01-01"])
        .assert()
        .success();

    assert_eq!(
        vault.read_note("crlf.md"),
        "- [x] one ✅ 2024-01-01\r\n- [ ] two 🔽\r\n"
    );
}

#[test]
fn move_respects_the_query() {
    let vault = vault();
    vault.write_note("other.md", "- [ ] Elsewhere ⏫\n");

    vault
        .cmd()
        .args(["move", "high", "medium"])
        .assert()
        .success()
        .stdout(contains("moved: 2"));

    assert!(vault.read_note("other.md").contains("Elsewhere 🔼"));
    let work = vault.read_note("work.md");
    assert!(work.contains("- [ ] Ship release 🔼"));
    assert!(work.contains("Old thing ⏫ ✅ 2024-01-01"));

    let output = vault
        .cmd()
        .args(["--json", "move", "high", "lowest", "--query", "all"])
        .output()
        .expect("run move");
    assert!(output.status.success());
    let json = parse_json(&output.stdout);
    assert_eq!(json["data"]["moved"], 1);
    assert_eq!(json["data"]["from"], "High");
    assert_eq!(json["data"]["to"], "Lowest");
    assert!(vault
        .read_note("work.md")
        .contains("  - [x] Old thing ✅ 2024-01-01 ⏬️"));
}

#[test]
fn lock_files_stay_out_of_the_notes() {
    let vault = vault();
    vault
        .cmd()
        .args(["set", "work.md:2", "high"])
        .assert()
        .success();

    assert!(vault.exists(".taskprio/locks/work.md.lock"));
    vault
        .cmd()
        .args(["--json", "list", "--query", "all"])
        .assert()
        .success()
        .stdout(contains("\"total\": 3"));
}
