//! Command-line behaviour of the `pcb-validator` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn validator() -> Command {
    let mut cmd = cargo_bin_cmd!("pcb-validator");
    // Keep the user's real config out of the way.
    cmd.env("HOME", env!("CARGO_TARGET_TMPDIR"));
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Writes a board with a dangling trace and returns its path.
fn write_dangling_board(dir: &TempDir) -> PathBuf {
    let mut board: Value =
        serde_json::from_str(&fs::read_to_string(fixture("valid_board.json")).unwrap()).unwrap();
    board["traces"]["t1"]["net_name"] = json!("NC_42");
    let path = dir.path().join("dangling.json");
    fs::write(&path, board.to_string()).unwrap();
    path
}

#[test]
fn help_and_version() {
    validator()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--export-json"));

    validator()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn valid_board_succeeds() {
    validator()
        .arg(fixture("valid_board.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Board is valid"));
}

#[test]
fn quiet_suppresses_summary() {
    validator()
        .arg("-q")
        .arg(fixture("valid_board.json"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn validation_errors_fail_with_defect_lines() {
    let dir = TempDir::new().unwrap();
    let board = write_dangling_board(&dir);

    validator()
        .arg(&board)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "[ERROR] DANGLING_TRACE: Trace t1 references unknown net NC_42 at $.traces.t1.net_name",
        ));
}

#[test]
fn permissive_flag_accepts_validation_errors() {
    let dir = TempDir::new().unwrap();
    let board = write_dangling_board(&dir);

    validator()
        .arg("--permissive")
        .arg(&board)
        .assert()
        .success()
        .stderr(predicate::str::contains("DANGLING_TRACE"))
        .stdout(predicate::str::contains("permissive"));
}

#[test]
fn permissive_from_config_file() {
    let dir = TempDir::new().unwrap();
    let board = write_dangling_board(&dir);
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"validation": {"permissive": true}}"#).unwrap();

    validator()
        .arg("--config")
        .arg(&config)
        .arg(&board)
        .assert()
        .success();
}

#[test]
fn missing_config_file_is_an_error() {
    validator()
        .args(["-c", "/no/such/config.json"])
        .arg(fixture("valid_board.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn missing_board_reports_file_io_error() {
    validator()
        .arg("/no/such/board.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("FILE_IO_ERROR"));
}

#[test]
fn malformed_json_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{\"metadata\": ").unwrap();

    validator()
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("MALFORMED_JSON"));
}

#[test]
fn stats_are_printed_as_json() {
    let output = validator()
        .args(["-q", "--stats"])
        .arg(fixture("valid_board.json"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let stats: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["num_components"], 2);
    assert_eq!(stats["layer_count"], 3);
}

#[test]
fn export_json_is_written() {
    let dir = TempDir::new().unwrap();
    let board = write_dangling_board(&dir);
    let export = dir.path().join("out").join("result.json");

    validator()
        .arg("--export-json")
        .arg(&export)
        .arg(&board)
        .assert()
        .failure();

    let payload: Value = serde_json::from_str(&fs::read_to_string(&export).unwrap()).unwrap();
    assert_eq!(payload["schema_version"], "1.0");
    assert_eq!(payload["parse_result"]["success"], true);
    assert_eq!(payload["validation_result"]["valid"], false);
    assert_eq!(payload["validation_result"]["error_count"], 1);
    assert_eq!(
        payload["validation_result"]["errors"][0]["code"],
        "DANGLING_TRACE"
    );
}
