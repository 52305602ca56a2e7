// CLI integration tests for `varstore apply`.
use std::io::Write;
use std::process::{Command, Stdio};

use serde_json::Value;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_varstore");
    Command::new(exe)
}

fn parse_json_lines(output: &[u8]) -> Vec<Value> {
    let text = std::str::from_utf8(output).expect("utf8");
    text.lines()
        .map(|line| serde_json::from_str(line).expect("valid json"))
        .collect()
}

fn write_script(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("script.vars");
    std::fs::write(&path, contents).expect("write script");
    path
}

#[test]
fn apply_file_reports_each_command() {
    let temp = tempfile::tempdir().expect("tempdir");
    let script = write_script(
        &temp,
        "# scenario\n\
         make score dynamic number 120.5\n\
         get score\n\
         mod score number 999.0\n\
         get score\n\
         \n\
         make player_name const string Alice Smith\n\
         mod player_name string Bob\n\
         remove player_name\n\
         type ghost\n",
    );

    let output = cmd()
        .args(["apply", script.to_str().unwrap()])
        .output()
        .expect("apply");
    assert_eq!(output.status.code(), Some(3), "last failure is NotFound");

    let lines = parse_json_lines(&output.stdout);
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[0]["op"], "make");
    assert_eq!(lines[0]["line"], 2);
    assert_eq!(lines[0]["ok"], true);
    assert_eq!(lines[1]["value"], "120.5");
    assert_eq!(lines[1]["type"], "number");
    assert_eq!(lines[3]["value"], "999.0");
    assert_eq!(lines[4]["ok"], true);
    assert_eq!(lines[5]["error"]["kind"], "ConstViolation");
    assert_eq!(lines[6]["error"]["kind"], "ConstViolation");
    assert_eq!(lines[7]["error"]["kind"], "NotFound");
    assert_eq!(lines[7]["error"]["code"], -1);
}

#[test]
fn apply_reads_stdin_and_succeeds() {
    let mut child = cmd()
        .args(["apply", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"make cfg dynamic object {\"b\": 1, \"a\": [true]}\nget cfg\nlist\n")
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");
    assert!(output.status.success());

    let lines = parse_json_lines(&output.stdout);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1]["type"], "object");
    assert_eq!(lines[1]["value"], "{\"b\":1.0,\"a\":[true]}");
    assert_eq!(lines[2]["names"], serde_json::json!(["cfg"]));
}

#[test]
fn stop_on_error_halts_batch() {
    let temp = tempfile::tempdir().expect("tempdir");
    let script = write_script(
        &temp,
        "make x dynamic number nope\nmake y dynamic number 1\n",
    );

    let output = cmd()
        .args(["apply", "--stop-on-error", script.to_str().unwrap()])
        .output()
        .expect("apply");
    assert_eq!(output.status.code(), Some(6), "ParseError exit code");
    let lines = parse_json_lines(&output.stdout);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["error"]["kind"], "ParseError");
}

#[test]
fn malformed_command_is_usage_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let script = write_script(&temp, "make lonely\n");

    let output = cmd()
        .args(["apply", script.to_str().unwrap()])
        .output()
        .expect("apply");
    assert_eq!(output.status.code(), Some(2));
    let lines = parse_json_lines(&output.stdout);
    assert_eq!(lines[0]["error"]["kind"], "Usage");
}

#[test]
fn missing_file_is_io_error_on_stderr() {
    let temp = tempfile::tempdir().expect("tempdir");
    let missing = temp.path().join("nope.vars");

    let output = cmd()
        .args(["apply", missing.to_str().unwrap()])
        .output()
        .expect("apply");
    assert_eq!(output.status.code(), Some(11));
    assert!(output.stdout.is_empty());
    let err = parse_json_lines(&output.stderr);
    assert_eq!(err[0]["error"]["kind"], "Io");
    assert!(err[0]["error"]["causes"].is_array());
}

#[test]
fn unknown_subcommand_is_usage_error() {
    let output = cmd().arg("frobnicate").output().expect("run");
    assert_eq!(output.status.code(), Some(2));
    let err = parse_json_lines(&output.stderr);
    assert_eq!(err[0]["error"]["kind"], "Usage");
}

#[test]
fn name_errors_win_over_bad_tags() {
    let temp = tempfile::tempdir().expect("tempdir");
    let script = write_script(
        &temp,
        "make limit const number 10
         mod limit integer 1
         mod ghost integer 1
         make limit sometimes number 1
",
    );

    let output = cmd()
        .args(["apply", script.to_str().unwrap()])
        .output()
        .expect("apply");
    assert_eq!(output.status.code(), Some(4), "last failure is DuplicateName");
    let lines = parse_json_lines(&output.stdout);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1]["error"]["kind"], "ConstViolation");
    assert_eq!(lines[2]["error"]["kind"], "NotFound");
    assert_eq!(lines[3]["error"]["kind"], "DuplicateName");
}
