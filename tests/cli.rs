use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

const REPORT: &str = "# Spark Report: Example\n\n## Seed: Ava\n\n### Idea\n\nParagraph.\n";

fn spark_report_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_spark-report"))
}

#[test]
fn cli_file_input_writes_output() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let input = dir.path().join("input.md");
    let output = dir.path().join("report.html");

    fs::write(&input, REPORT).expect("write input");

    let status = Command::new(spark_report_bin())
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .status()
        .expect("run spark-report");

    assert!(status.success());
    let html = fs::read_to_string(output).expect("read output");
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Spark Report: Example</title>"));
    assert!(html.contains("<h1>Example</h1>"));
}

#[test]
fn cli_stdin_input_writes_stdout() {
    let mut child = Command::new(spark_report_bin())
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn spark-report");

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        stdin.write_all(REPORT.as_bytes()).expect("write stdin");
    }

    let output = child.wait_with_output().expect("wait");
    assert!(output.status.success());
    let html = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(html.contains("persona-section persona-teal"));
    assert!(html.trim_end().ends_with("</html>"));
}

#[test]
fn cli_missing_file_fails() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let output = Command::new(spark_report_bin())
        .arg(dir.path().join("absent.md"))
        .output()
        .expect("run spark-report");

    assert!(!output.status.success());
    assert!(!output.stderr.is_empty());
}
