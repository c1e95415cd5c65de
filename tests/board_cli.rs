mod support;

use predicates::str::contains;
use predicates::prelude::*;
use serde_json::Value;
use support::{parse_json, TestVault};

const WORK: &str = "# Work
- [ ] Ship release ⏫ 📅 2024-05-01
- [ ] Write notes
- [x] Old thing ⏫ ✅ 2024-01-01
```
- [ ] example in code 🔺
```
";

fn vault() -> TestVault {
    let vault = TestVault::new();
    vault.write_note("notes/work.md", WORK);
    vault.write_note("home.md", "- [ ] Water plants 🔽 #home\n- [ ] Fix sink 🔺 #home\n");
    vault.write_note(".obsidian/workspace.md", "- [ ] ignored ⏫\n");
    vault
}

#[test]
fn board_groups_open_tasks_high_to_low() {
    let vault = vault();
    let output = vault.cmd().arg("board").output().expect("run board");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let highest = stdout.find("Priority Highest (1)").expect("highest header");
    let high = stdout.find("Priority High (1)").expect("high header");
    let lowest = stdout.find("Priority Lowest (0)").expect("lowest header");
    assert!(highest < high && high < lowest);

    assert!(stdout.contains("- Fix sink 🔺 #home  (home.md:2)"));
    assert!(stdout.contains("- Ship release ⏫ 📅 2024-05-01  (notes/work.md:2)"));
    assert!(stdout.contains("- Write notes  (notes/work.md:3)"));
    assert!(!stdout.contains("Old thing"));
    assert!(!stdout.contains("example in code"));
    assert!(!stdout.contains("ignored"));
}

#[test]
fn board_json_envelope() {
    let vault = vault();
    let output = vault
        .cmd()
        .args(["--json", "board", "--order", "low-to-high"])
        .output()
        .expect("run board");
    assert!(output.status.success());

    let json = parse_json(&output.stdout);
    assert_eq!(json["schema_version"], "taskprio.v1");
    assert_eq!(json["command"], "board");
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["total"], 4);
    assert_eq!(json["data"]["order"], "low-to-high");

    let sections = json["data"]["sections"].as_array().expect("sections");
    assert_eq!(sections.len(), 6);
    assert_eq!(sections[0]["priority"], "Lowest");
    assert_eq!(sections[1]["priority"], "Low");
    assert_eq!(sections[1]["count"], 1);
    assert_eq!(sections[1]["tasks"][0]["file"], "home.md");
    assert_eq!(sections[1]["tasks"][0]["line"], 0);
    assert_eq!(sections[5]["priority"], "Highest");
}

#[test]
fn board_query_filters_tasks() {
    let vault = vault();
    let output = vault
        .cmd()
        .args(["--json", "board", "--query", "all & tag(\"#home\") | done"])
        .output()
        .expect("run board");
    assert!(output.status.success());

    let json = parse_json(&output.stdout);
    assert_eq!(json["data"]["total"], 3);
    let high = json["data"]["sections"]
        .as_array()
        .expect("sections")
        .iter()
        .find(|section| section["priority"] == "High")
        .cloned()
        .unwrap_or(Value::Null);
    assert_eq!(high["tasks"][0]["completed"], true);
}

#[test]
fn list_sorts_by_text() {
    let vault = vault();
    vault
        .cmd()
        .args(["list", "--sort", "text"])
        .assert()
        .success()
        .stdout(contains("Highest - Fix sink 🔺 #home  (home.md:2)"))
        .stdout(contains("Normal  - Write notes  (notes/work.md:3)"));

    let output = vault
        .cmd()
        .args(["--json", "list", "--sort", "text"])
        .output()
        .expect("run list");
    let json = parse_json(&output.stdout);
    let titles: Vec<&str> = json["data"]["tasks"]
        .as_array()
        .expect("tasks")
        .iter()
        .filter_map(|task| task["title"].as_str())
        .collect();
    assert_eq!(
        titles,
        vec![
            "Fix sink 🔺 #home",
            "Ship release ⏫ 📅 2024-05-01",
            "Water plants 🔽 #home",
            "Write notes",
        ]
    );
}

#[test]
fn invalid_query_reports_position() {
    let vault = vault();
    vault
        .cmd()
        .args(["board", "--query", "open &"])
        .assert()
        .code(2)
        .stderr(contains("Invalid query"));

    let output = vault
        .cmd()
        .args(["--json", "board", "--query", "open & bogus"])
        .output()
        .expect("run board");
    assert_eq!(output.status.code(), Some(2));
    let json = parse_json(&output.stdout);
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["kind"], "user_error");
    assert_eq!(json["error"]["details"]["position"], 7);
}

#[test]
fn invalid_sort_is_rejected() {
    vault()
        .cmd()
        .args(["board", "--sort", "random"])
        .assert()
        .code(2)
        .stderr(contains("unknown sort"));
}

#[test]
fn quiet_board_prints_nothing() {
    vault()
        .cmd()
        .args(["-q", "board"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
