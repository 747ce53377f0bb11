//! Tests for the blockpaste binary.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::NamedTempFile;

fn blockpaste(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_blockpaste"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start blockpaste");
    let mut pipe = child.stdin.take().expect("stdin is piped");
    pipe.write_all(stdin.as_bytes()).expect("Failed to write stdin");
    drop(pipe);
    child.wait_with_output().expect("Failed to wait for blockpaste")
}

fn temp_file(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content).expect("Failed to write temp file");
    file
}

fn stdout_json(output: &Output) -> Value {
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn test_html_file_to_blocks() {
    let file = temp_file(b"<h2>Title</h2><p>Body</p>");
    let path = file.path().to_str().unwrap();

    let json = stdout_json(&blockpaste(&[path], ""));
    assert_eq!(json[0]["name"], "core/heading");
    assert_eq!(json[0]["attributes"]["level"], 2);
    assert_eq!(json[1]["attributes"]["content"], "Body");
}

#[test]
fn test_stdin_inline_mode() {
    let output = blockpaste(&["--mode", "inline"], "<p>one</p><p>two</p>");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "one<br>two\n");
}

#[test]
fn test_plain_text_markdown() {
    let file = temp_file(b"## Heading\n\nText");
    let path = file.path().to_str().unwrap();

    let json = stdout_json(&blockpaste(&["--plain", path, "--compact"], ""));
    assert_eq!(json.as_array().map(Vec::len), Some(2));
    assert_eq!(json[0]["attributes"]["level"], 2);
}

#[test]
fn test_compact_output_is_one_line() {
    let output = blockpaste(&["--compact", "--mode", "blocks"], "<hr>");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.contains("\"core/separator\""));
}

#[test]
fn test_windows_1252_input_decoded() {
    let file = temp_file(b"<p>caf\xe9</p>");
    let path = file.path().to_str().unwrap();

    let json = stdout_json(&blockpaste(&[path], ""));
    assert_eq!(json[0]["attributes"]["content"], "caf\u{e9}");
}

#[test]
fn test_invalid_mode_rejected() {
    let output = blockpaste(&["--mode", "sideways"], "");
    assert!(!output.status.success());
}

#[test]
fn test_missing_input_file() {
    let output = blockpaste(&["/nonexistent/paste.html"], "");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("error:"));
}
