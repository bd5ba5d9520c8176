//! CLI integration tests for scavenger commands.
//!
//! These tests focus on exit codes and observable behavior through the
//! binary, not on exact output formatting.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{fs, path::Path};

use assert_cmd::{Command, assert::Assert};
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// Helper to create a temp directory for tests.
fn temp_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Helper to get a scavenger command.
fn scavenger() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("scavenger").unwrap()
}

/// Runs `scavenger` inside `dir` with HOME set to `home` and the index under `dir/idx`.
fn scavenger_with_home(dir: &Path, home: &Path) -> Command {
    let mut cmd = scavenger();
    cmd.env("HOME", home)
        .env_remove("RUST_LOG")
        .current_dir(dir)
        .arg("--index")
        .arg(dir.join("idx"));
    cmd
}

/// Runs `scavenger` inside `dir` with an isolated HOME under `dir/.home`.
fn scavenger_in(dir: &Path) -> Command {
    let home = dir.join(".home");
    fs::create_dir_all(&home).unwrap();
    scavenger_with_home(dir, &home)
}

/// Strips ANSI escape sequences from a string.
fn strip_ansi(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            output.push(ch);
        }
    }
    output
}

/// Submits a JSON request through stdin.
fn submit(dir: &Path, json: &str) -> Assert {
    scavenger_in(dir).arg("submit").write_stdin(json).assert()
}

/// Runs a JSON search and returns the parsed response.
fn search_json(dir: &Path, args: &[&str]) -> Value {
    let output = scavenger_in(dir)
        .arg("search")
        .args(args)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Request for the `/a.py` document.
const DIJKSTRA: &str = r#"{"key": "/a.py", "name": "", "description": "",
    "data": "def dijkstra(): pass", "fileExtension": "py", "dataSource": "disk"}"#;

mod init {
    use super::*;

    #[test]
    fn creates_commented_config() {
        let dir = temp_dir();
        scavenger_in(dir.path()).arg("init").assert().success();

        let contents = fs::read_to_string(dir.path().join(".scavenger.toml")).unwrap();
        assert!(contents.contains("# [index]"));
        assert!(contents.contains("# [search]"));
    }

    #[test]
    fn fails_if_config_exists() {
        let dir = temp_dir();
        fs::write(dir.path().join(".scavenger.toml"), "existing").unwrap();
        scavenger_in(dir.path())
            .arg("init")
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));
    }

    #[test]
    fn force_overwrites_existing() {
        let dir = temp_dir();
        fs::write(dir.path().join(".scavenger.toml"), "old content").unwrap();
        scavenger_in(dir.path())
            .args(["init", "--force"])
            .assert()
            .success();
        let contents = fs::read_to_string(dir.path().join(".scavenger.toml")).unwrap();
        assert!(!contents.contains("old content"));
    }

    #[test]
    fn updates_gitignore_once() {
        let dir = temp_dir();
        fs::write(dir.path().join(".gitignore"), "*.log").unwrap();
        scavenger_in(dir.path()).arg("init").assert().success();
        scavenger_in(dir.path())
            .args(["init", "--force"])
            .assert()
            .success();

        let gitignore = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(gitignore, "*.log\n.scavenger/\n");
    }

    #[test]
    fn home_directory_gets_global_template() {
        let dir = temp_dir();
        fs::write(dir.path().join(".gitignore"), "*.log").unwrap();
        scavenger_with_home(dir.path(), dir.path())
            .arg("init")
            .assert()
            .success();

        let contents = fs::read_to_string(dir.path().join(".scavenger.toml")).unwrap();
        assert!(contents.contains("Global scavenger configuration"));
        assert!(contents.contains("# [highlight]"));
        let gitignore = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(gitignore, "*.log");
    }

    #[test]
    fn global_flag_writes_to_home() {
        let dir = temp_dir();
        scavenger_in(dir.path())
            .args(["init", "--global"])
            .assert()
            .success();
        assert!(dir.path().join(".home/.scavenger.toml").exists());
        assert!(!dir.path().join(".scavenger.toml").exists());
    }
}

mod submit {
    use super::*;

    #[test]
    fn upsert_search_delete_scenario() {
        let dir = temp_dir();
        submit(dir.path(), DIJKSTRA)
            .success()
            .stdout(predicate::eq("0\n"));

        let response = search_json(dir.path(), &["dijkstra", "--field", "data"]);
        assert_eq!(response["totalHits"], 1);
        assert_eq!(response["documents"][0]["key"], "/a.py");
        assert!(response["documents"][0].get("data").is_none());

        scavenger_in(dir.path())
            .args(["delete", "/a.py"])
            .assert()
            .success();
        let response = search_json(dir.path(), &["dijkstra", "--field", "data"]);
        assert_eq!(response["totalHits"], 0);
    }

    #[test]
    fn validation_failure_prints_code_two() {
        let dir = temp_dir();
        submit(dir.path(), r#"{"key": "/a.py"}"#)
            .failure()
            .stdout(predicate::eq("2\n"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = temp_dir();
        submit(dir.path(), "{not json")
            .failure()
            .stderr(predicate::str::contains("error: invalid request JSON"));
    }

    #[test]
    fn reads_request_from_file() {
        let dir = temp_dir();
        let file = dir.path().join("request.json");
        fs::write(&file, DIJKSTRA).unwrap();
        scavenger_in(dir.path())
            .arg("submit")
            .arg(&file)
            .assert()
            .success();
        assert_eq!(search_json(dir.path(), &["dijkstra"])["totalHits"], 1);
    }

    #[test]
    fn no_commit_leaves_nothing_visible() {
        let dir = temp_dir();
        scavenger_in(dir.path())
            .args(["submit", "--no-commit"])
            .write_stdin(DIJKSTRA)
            .assert()
            .success();
        assert_eq!(search_json(dir.path(), &["dijkstra"])["totalHits"], 0);
    }
}

mod search {
    use super::*;

    fn seed(dir: &Path) {
        for (key, data) in [("/c.rs", "fn foobar() { baz }"), ("/d.rs", "fn foo() { qux }")] {
            let json = format!(
                r#"{{"key": "{key}", "name": "", "description": "", "data": "{data}",
                    "fileExtension": "rs", "dataSource": "disk"}}"#
            );
            submit(dir, &json).success();
        }
    }

    #[test]
    fn literal_flag_disables_wildcards() {
        let dir = temp_dir();
        seed(dir.path());

        let literal = search_json(dir.path(), &["foo*", "--field", "data", "--literal"]);
        assert_eq!(literal["totalHits"], 1);
        assert_eq!(literal["documents"][0]["key"], "/d.rs");

        let wildcard = search_json(dir.path(), &["foo*", "--field", "data"]);
        assert_eq!(wildcard["totalHits"], 2);
    }

    #[test]
    fn highlights_and_data_in_json() {
        let dir = temp_dir();
        submit(dir.path(), DIJKSTRA).success();

        let response = search_json(dir.path(), &["dijkstra", "--data"]);
        let hit = &response["documents"][0];
        assert_eq!(hit["data"], "def dijkstra(): pass");
        assert_eq!(hit["highlights"][0], "def <b>dijkstra</b>(): pass");
    }

    #[test]
    fn text_output_renders_markers_as_color() {
        let dir = temp_dir();
        submit(dir.path(), DIJKSTRA).success();

        let output = scavenger_in(dir.path())
            .args(["search", "dijkstra"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout).unwrap();
        assert!(!stdout.contains("<b>"));
        let plain = strip_ansi(&stdout);
        assert!(plain.contains("/a.py"));
        assert!(plain.contains("def dijkstra(): pass"));
    }

    #[test]
    fn limit_truncates_but_counts_all() {
        let dir = temp_dir();
        seed(dir.path());
        let response = search_json(dir.path(), &["fn", "-n", "1"]);
        assert_eq!(response["totalHits"], 2);
        assert_eq!(response["documents"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn syntax_error_fails() {
        let dir = temp_dir();
        scavenger_in(dir.path())
            .args(["search", "\"unbalanced"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("error: search failed"));
    }

    #[test]
    fn unknown_field_fails() {
        let dir = temp_dir();
        scavenger_in(dir.path())
            .args(["search", "x", "--field", "body"])
            .assert()
            .failure();
    }

    #[test]
    fn empty_index_reports_no_results() {
        let dir = temp_dir();
        let output = scavenger_in(dir.path())
            .args(["search", "anything"])
            .output()
            .unwrap();
        assert!(output.status.success());
        assert!(strip_ansi(&String::from_utf8_lossy(&output.stdout)).contains("No results found."));
    }
}

mod index {
    use super::*;

    #[test]
    fn ingests_whitelisted_files() {
        let dir = temp_dir();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("graph.py"), "# Title - Graphs;\ndef dijkstra(): pass").unwrap();
        fs::write(src.join("notes.txt"), "dijkstra notes").unwrap();

        scavenger_in(dir.path())
            .args(["index", "src", "--source", "laptop"])
            .assert()
            .success()
            .stderr(predicate::str::contains("1 of 1 files indexed"));

        let response = search_json(dir.path(), &["dijkstra"]);
        assert_eq!(response["totalHits"], 1);
        let hit = &response["documents"][0];
        assert_eq!(hit["name"], "Graphs");
        assert_eq!(hit["dataSource"], "laptop");
        assert_eq!(hit["fileExtension"], "py");

        let key = fs::canonicalize(src.join("graph.py")).unwrap();
        assert_eq!(hit["key"], key.to_string_lossy().as_ref());
    }

    #[test]
    fn missing_path_fails() {
        let dir = temp_dir();
        scavenger_in(dir.path())
            .args(["index", "does-not-exist"])
            .assert()
            .failure();
    }

    #[test]
    fn recent_reports_freshly_indexed_directories() {
        let dir = temp_dir();
        let src = dir.path().join("repo");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("main.rs"), "fn main() {}").unwrap();
        scavenger_in(dir.path())
            .args(["index", "repo"])
            .assert()
            .success();

        let root = fs::canonicalize(&src).unwrap();
        scavenger_in(dir.path())
            .arg("recent")
            .arg(&root)
            .assert()
            .success()
            .stdout(predicate::eq("true\n"));
        scavenger_in(dir.path())
            .args(["recent", "/elsewhere/repo"])
            .assert()
            .success()
            .stdout(predicate::eq("false\n"));
    }
}

mod get {
    use super::*;

    #[test]
    fn by_key_and_by_id() {
        let dir = temp_dir();
        submit(dir.path(), DIJKSTRA).success();

        let output = scavenger_in(dir.path())
            .args(["get", "/a.py", "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let doc: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(doc["data"], "def dijkstra(): pass");
        assert!(doc["modifiedEpochTime"].as_i64().unwrap() > 0);

        let id = doc["id"].as_str().unwrap().to_string();
        scavenger_in(dir.path())
            .args(["get", &id])
            .assert()
            .success()
            .stdout(predicate::str::contains("def dijkstra(): pass"));
    }

    #[test]
    fn missing_document_fails() {
        let dir = temp_dir();
        scavenger_in(dir.path())
            .args(["get", "/nope.py"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not found"));
    }
}

mod status {
    use super::*;

    #[test]
    fn shows_document_count() {
        let dir = temp_dir();
        submit(dir.path(), DIJKSTRA).success();

        let output = scavenger_in(dir.path()).arg("status").output().unwrap();
        assert!(output.status.success(), "{output:?}");
        let stdout = strip_ansi(&String::from_utf8_lossy(&output.stdout));
        assert!(stdout.contains("documents"));
        assert!(stdout.contains("indexed in last 24h"));
        assert!(stdout.contains("idx"));
    }

    #[test]
    fn config_prints_effective_settings() {
        let dir = temp_dir();
        fs::write(dir.path().join(".scavenger.toml"), "[search]\nlimit = 7\n").unwrap();
        let output = scavenger_in(dir.path()).arg("config").output().unwrap();
        assert!(output.status.success());
        let stdout = strip_ansi(&String::from_utf8_lossy(&output.stdout));
        assert!(stdout.contains("limit = 7"));
        assert!(stdout.contains("pre_tag"));
    }
}

mod help {
    use super::*;

    #[test]
    fn lists_every_command() {
        let output = scavenger().arg("--help").output().unwrap();
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        for command in [
            "init", "index", "submit", "delete", "search", "get", "recent", "status", "config",
        ] {
            assert!(stdout.contains(command), "missing {command}");
        }
    }
}
