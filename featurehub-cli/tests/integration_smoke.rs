//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

fn featurehub() -> Command {
    let mut cmd = Command::cargo_bin("featurehub").unwrap();
    cmd.env("FEATUREHUB_QUIET", "1");
    cmd
}

#[test]
fn test_top_level_help_lists_commands() {
    featurehub()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("setup"))
        .stdout(predicate::str::contains("bulk-create-problems"))
        .stdout(predicate::str::contains("features"));
}

#[test]
fn test_setup_help() {
    featurehub()
        .arg("setup")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Drop the database first"));
}

#[test]
fn test_create_problem_help() {
    featurehub()
        .arg("create-problem")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("exactly one problem document"));
}

#[test]
fn test_bulk_create_help() {
    featurehub()
        .arg("bulk-create-problems")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("delimited problem documents"));
}

#[test]
fn test_features_help() {
    featurehub()
        .arg("features")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Only features contributed by this user"));
}

#[test]
fn test_features_requires_problem() {
    featurehub()
        .env_remove("FEATUREHUB_PROBLEM")
        .arg("features")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--problem"));
}

#[test]
fn test_create_problem_requires_file() {
    featurehub()
        .arg("create-problem")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--file"));
}

#[test]
fn test_completions_bash() {
    featurehub()
        .arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("featurehub"));
}
