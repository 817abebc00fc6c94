//! CLI-level tests for the manifest-editing commands.
//!
//! These exercise argument parsing, manifest persistence, and error output
//! through the real binary; nothing here touches the network.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn skm(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("skm").unwrap();
    cmd.current_dir(dir.path());
    cmd
}

#[test]
fn init_creates_manifest_with_default_target() {
    let dir = TempDir::new().unwrap();

    skm(&dir).arg("init").assert().success().stdout(predicate::str::contains("Created"));

    let content = std::fs::read_to_string(dir.path().join("skm.toml")).unwrap();
    assert!(content.contains(".claude/skills"));
}

#[test]
fn init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    skm(&dir).arg("init").assert().success();

    skm(&dir)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn add_skill_then_list_shows_it() {
    let dir = TempDir::new().unwrap();
    skm(&dir).arg("init").assert().success();

    skm(&dir)
        .args([
            "add",
            "skill",
            "code-review",
            "--url",
            "https://github.com/example/code-review.git",
            "--version",
            "v1.0.0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added"));

    skm(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("code-review"))
        .stdout(predicate::str::contains("v1.0.0"));
}

#[test]
fn add_duplicate_skill_fails() {
    let dir = TempDir::new().unwrap();
    skm(&dir).arg("init").assert().success();
    skm(&dir)
        .args(["add", "skill", "demo", "--url", "https://example.com/demo.git"])
        .assert()
        .success();

    skm(&dir)
        .args(["add", "skill", "demo", "--url", "https://example.com/other.git"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn add_unknown_kind_fails_with_supported_list() {
    let dir = TempDir::new().unwrap();
    skm(&dir).arg("init").assert().success();

    skm(&dir)
        .args(["add", "skill", "demo", "--kind", "ftp", "--url", "ftp://example.com/demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("supported kinds"));
}

#[test]
fn remove_unknown_skill_reports_not_found() {
    let dir = TempDir::new().unwrap();
    skm(&dir).arg("init").assert().success();

    skm(&dir)
        .args(["remove", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn install_without_targets_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    skm(&dir).args(["init", "--bare"]).assert().success();
    skm(&dir)
        .args(["add", "skill", "demo", "--url", "https://example.com/demo.git"])
        .assert()
        .success();

    skm(&dir)
        .arg("install")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no install targets"));
}

#[test]
fn update_unknown_names_are_aggregated() {
    let dir = TempDir::new().unwrap();
    skm(&dir).arg("init").assert().success();

    skm(&dir)
        .args(["update", "ghost", "phantom", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost").and(predicate::str::contains("phantom")));
}

#[test]
fn verify_empty_manifest_reports_zero_counts() {
    let dir = TempDir::new().unwrap();
    skm(&dir).args(["init", "--bare"]).assert().success();

    skm(&dir)
        .arg("verify")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 skill(s), 0 ok, 0 failed"));
}

#[test]
fn commands_without_manifest_hint_at_init() {
    let dir = TempDir::new().unwrap();

    skm(&dir)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("skm init"));
}
