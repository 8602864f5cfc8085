//! Runs the built binary against throw-away repositories.

mod common;

use common::Fixture;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_git-vendors"))
        .args(args)
        .output()
        .expect("start git-vendors")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn sample_repo() -> Fixture {
    let fixture = Fixture::new("widget");
    fixture.commit("a.txt", "one\n", "Alice", "alice@acme.com", 1_705_312_800);
    fixture.commit("b.txt", "two\n", "Carol", "carol@gmail.com", 1_708_423_200);
    fixture
}

#[test]
fn bad_date_aborts_before_any_report() {
    let fixture = sample_repo();
    let output = run(&[fixture.path.to_str().unwrap(), "--since", "01/02/2024", "--no-color"]);

    assert!(!output.status.success());
    assert!(stdout(&output).is_empty(), "unexpected stdout: {}", stdout(&output));
    assert!(stderr(&output).contains("error: invalid date"));
}

#[test]
fn bad_config_aborts_before_any_report() {
    let fixture = sample_repo();
    let config = fixture.path.join("vendors.yaml");
    std::fs::write(&config, "vendors:\n  community:\n    domains: [acme.com]\n").unwrap();

    let output = run(&[fixture.path.to_str().unwrap(), "-c", config.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(stdout(&output).is_empty(), "unexpected stdout: {}", stdout(&output));
    assert!(stderr(&output).contains("error: invalid config"));
}

#[test]
fn missing_repository_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let output = run(&[dir.path().join("nope").to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(!stdout(&output).contains("Repository:"));
    assert!(stderr(&output).contains("error: git error"));
}

#[test]
fn zero_top_is_a_usage_error() {
    let fixture = sample_repo();
    let output = run(&[fixture.path.to_str().unwrap(), "--top", "0"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).is_empty());
}

#[test]
fn prints_repository_report() {
    let fixture = sample_repo();
    let config = fixture.path.join("vendors.yaml");
    std::fs::write(&config, "vendors:\n  acme:\n    domains: [acme.com]\n").unwrap();

    let output = run(&[fixture.path.to_str().unwrap(), "-c", config.to_str().unwrap(), "--no-color"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Loaded vendor config: acme"));
    assert!(out.contains("Repository: widget"));
    assert!(out.contains("Found 2 unique contributors"));
    assert!(out.contains("Vendor/Community Breakdown"));
}

#[test]
fn empty_date_range_exits_cleanly() {
    let fixture = sample_repo();
    let output = run(&[fixture.path.to_str().unwrap(), "--since", "2030-01-01", "-b", "month"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("No commits found in the specified date range"));
    assert!(!out.contains("Timeline Breakdown"));
}
