//! End-to-end tests driving the `vela` binary as a subprocess.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

fn vela_cmd() -> Command {
    Command::cargo_bin("vela").unwrap()
}

fn vela_source_file() -> NamedTempFile {
    Builder::new().suffix(".vela").tempfile().unwrap()
}

#[test]
fn check_reports_success_on_a_clean_file() {
    let mut file = vela_source_file();
    writeln!(file, "let x = 1;").unwrap();

    vela_cmd()
        .arg("check")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No errors found"));
}

#[test]
fn check_fails_on_the_fatal_marker() {
    let mut file = vela_source_file();
    write!(file, "@@fail").unwrap();

    vela_cmd().arg("check").arg(file.path()).assert().failure();
}

#[test]
fn check_json_emits_a_json_array() {
    let mut file = vela_source_file();
    write!(file, "@@fail").unwrap();

    let output = vela_cmd()
        .arg("check")
        .arg(file.path())
        .arg("--json")
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert!(parsed.is_array());
}

#[test]
fn check_reports_missing_file() {
    vela_cmd()
        .arg("check")
        .arg("definitely-missing.vela")
        .assert()
        .failure();
}

#[test]
fn check_alias_c_behaves_like_check() {
    let mut file = vela_source_file();
    writeln!(file, "let x = 1;").unwrap();

    vela_cmd().arg("c").arg(file.path()).assert().success();
}

#[test]
fn lsp_help_lists_tcp_flags() {
    vela_cmd()
        .arg("lsp")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--tcp"))
        .stdout(predicate::str::contains("--port"));
}

#[test]
fn root_help_lists_subcommands() {
    vela_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("lsp"));
}
