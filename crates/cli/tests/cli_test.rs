//! End-to-end tests for the vitest-explorer binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::cargo_bin("vitest-explorer").unwrap()
}

const TRANSCRIPT: &str = r#"// one file, one passing and one failing test
{"event": "collected", "files": [{"id": "f1", "filepath": "/repo/src/math.test.ts", "tasks": [{"id": "f1_0", "name": "adds", "type": "test"}, {"id": "f1_1", "name": "subtracts", "type": "test"}]}]}
{"event": "watcher_rerun", "files": ["/repo/src/math.test.ts"]}
{"event": "task_update", "packs": [["f1_0", {"state": "pass", "duration": 3}], ["f1_1", {"state": "fail", "errors": [{"message": "expected 1 to be 2", "actual": "1", "expected": "2"}]}]]}
{"event": "console_log", "content": "hello\n", "task_id": "f1_0"}
{"event": "finished", "files": [{"id": "f1", "filepath": "/repo/src/math.test.ts", "result": {"state": "pass"}}]}
"#;

#[test]
fn test_resolve_joins_case_patterns() {
    let temp = TempDir::new().unwrap();
    let selection = temp.path().join("selection.json");
    fs::write(
        &selection,
        serde_json::json!({
            "include": [
                {"id": "a", "label": "adds numbers", "type": "case", "file": "/repo/math.test.ts", "kind": "test", "pattern": "adds numbers"},
                {"id": "b", "label": "subtracts numbers", "type": "case", "file": "/repo/math.test.ts", "kind": "test", "pattern": "subtracts numbers"}
            ]
        })
        .to_string(),
    )
    .unwrap();

    cmd()
        .arg("resolve")
        .arg(&selection)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 target(s)"))
        .stdout(predicate::str::contains(
            "Pattern: adds numbers|subtracts numbers",
        ));
}

#[test]
fn test_resolve_json_omits_pattern_for_files() {
    let temp = TempDir::new().unwrap();
    let selection = temp.path().join("selection.json");
    fs::write(
        &selection,
        r#"{"include": [{"id": "/repo/src/", "label": "src", "type": "folder", "path": "/repo/src"}]}"#,
    )
    .unwrap();

    cmd()
        .args(["resolve", "--json"])
        .arg(&selection)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"files\""))
        .stdout(predicate::str::contains("pattern").not());
}

#[test]
fn test_resolve_missing_file_fails() {
    cmd()
        .args(["resolve", "/definitely/not/here.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_replay_prints_reports_and_summary() {
    let temp = TempDir::new().unwrap();
    let events = temp.path().join("events.jsonl");
    fs::write(&events, TRANSCRIPT).unwrap();

    cmd()
        .arg("replay")
        .arg(&events)
        .args(["--root", "/repo"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("📂 src/math.test.ts"))
        .stdout(predicate::str::contains("✅ adds (3ms)"))
        .stdout(predicate::str::contains("❌ subtracts"))
        .stdout(predicate::str::contains("- expected: 2"))
        .stdout(predicate::str::contains("[adds] hello"))
        .stdout(predicate::str::contains(
            "1 runs: 2 passed, 1 failed, 0 errored, 0 skipped",
        ));
}

#[test]
fn test_replay_rejects_bad_transcript() {
    let temp = TempDir::new().unwrap();
    let events = temp.path().join("events.jsonl");
    fs::write(&events, "{\"event\": \"finished\"}\n{\"event\": \"bogus\"}\n").unwrap();

    cmd()
        .arg("replay")
        .arg(&events)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_replay_coverage_profile_without_directory_reports_error() {
    let temp = TempDir::new().unwrap();
    let events = temp.path().join("events.jsonl");
    let selection = temp.path().join("selection.json");
    fs::write(&events, TRANSCRIPT).unwrap();
    fs::write(&selection, r#"{"profile": "coverage"}"#).unwrap();

    cmd()
        .arg("replay")
        .arg(&events)
        .arg("--selection")
        .arg(&selection)
        .args(["--root", "/repo"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Failed to enable coverage"))
        .stdout(predicate::str::contains("📂").not());
}

#[test]
fn test_replay_debug_profile_needs_live_runner() {
    let temp = TempDir::new().unwrap();
    let events = temp.path().join("events.jsonl");
    let selection = temp.path().join("selection.json");
    fs::write(&events, TRANSCRIPT).unwrap();
    fs::write(&selection, r#"{"profile": "debug"}"#).unwrap();

    cmd()
        .arg("replay")
        .arg(&events)
        .arg("--selection")
        .arg(&selection)
        .args(["--root", "/repo"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("debugging is not available"));
}

#[test]
fn test_init_writes_default_config() {
    let temp = TempDir::new().unwrap();

    cmd()
        .args(["init", "--cwd"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config"));

    let written = fs::read_to_string(temp.path().join(".vitest-explorer.json")).unwrap();
    assert!(written.contains("\"timeout_ms\": 5000"));

    cmd()
        .args(["init", "--cwd"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}
