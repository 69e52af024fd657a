// tests/integration_tests.rs
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_run_help() {
    let mut cmd = Command::cargo_bin("tomasim").unwrap();
    cmd.arg("run").arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Run a program through the scheduling simulator"));
}

#[test]
fn test_run_with_sample_program() {
    let mut cmd = Command::cargo_bin("tomasim").unwrap();
    cmd.arg("run");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("fadd f1, f2, f3"))
        .stdout(predicate::str::contains("Completed in"));
}

#[test]
fn test_run_with_scoreboard_algorithm() {
    let mut cmd = Command::cargo_bin("tomasim").unwrap();
    cmd.arg("run").arg("--algorithm").arg("scoreboard");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Scoreboard"));
}

#[test]
fn test_run_rejects_unknown_algorithm() {
    let mut cmd = Command::cargo_bin("tomasim").unwrap();
    cmd.arg("run").arg("--algorithm").arg("oracle");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown scheduling algorithm"));
}

#[test]
fn test_run_with_program_file_and_csv_output() {
    let temp_dir = tempdir().unwrap();
    let program_path = temp_dir.path().join("program.s");
    fs::write(&program_path, "fadd f1, f2, f3\nfsub f4, f1, f3\n").unwrap();

    let mut cmd = Command::cargo_bin("tomasim").unwrap();
    cmd.arg("run")
        .arg("--input")
        .arg(&program_path)
        .arg("--format")
        .arg("csv");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Instruction,1,2"))
        .stdout(predicate::str::contains("\"fadd f1, f2, f3\",I,E1,E2,E3,W"));
}

#[test]
fn test_run_with_json_config_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.json");
    fs::write(
        &config_path,
        r#"{"algorithm": "scoreboard", "add_sub_latency": 2}"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("tomasim").unwrap();
    cmd.arg("run").arg("--config").arg(&config_path);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Scoreboard"));
}

#[test]
fn test_assemble_reports_pass() {
    let mut cmd = Command::cargo_bin("tomasim").unwrap();
    cmd.arg("assemble");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Pass"))
        .stdout(predicate::str::contains("5 instructions"));
}

#[test]
fn test_assemble_reports_offending_line() {
    let temp_dir = tempdir().unwrap();
    let program_path = temp_dir.path().join("broken.s");
    fs::write(&program_path, "fadd f1, f2, f3\nfadd f1, f2\n").unwrap();

    let mut cmd = Command::cargo_bin("tomasim").unwrap();
    cmd.arg("assemble").arg("--input").arg(&program_path);
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("Assembly error at line 2"));
}

#[test]
fn test_run_fails_on_unreadable_input() {
    let mut cmd = Command::cargo_bin("tomasim").unwrap();
    cmd.arg("run").arg("--input").arg("no/such/file.s");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}
