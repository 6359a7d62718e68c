//! CLI tests for `cmdtree repl` reading command lines from stdin.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use assert_cmd::cargo;

fn cmdtree_cmd() -> Command {
    Command::new(cargo::cargo_bin!("cmdtree"))
}

fn run_with_stdin(args: &[&str], stdin_body: &str) -> Output {
    let mut child = cmdtree_cmd()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn cmdtree command");

    {
        let stdin = child.stdin.as_mut().expect("stdin handle");
        stdin
            .write_all(stdin_body.as_bytes())
            .expect("write stdin body");
    }

    child.wait_with_output().expect("wait for output")
}

fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("valid json line"))
        .collect()
}

#[test]
fn repl_executes_each_line() {
    let output = run_with_stdin(
        &["repl", "--output", "json"],
        "give stone 3\n# a comment\n\ntime query\n",
    );
    assert!(output.status.success());
    let lines = json_lines(&output);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["result"], 3);
    assert_eq!(lines[1]["result"], 6000);
}

#[test]
fn repl_keeps_going_after_a_failure() {
    let output = run_with_stdin(
        &["repl", "--output", "json"],
        "foo\r\ngive stone 3\r\n",
    );
    assert_eq!(output.status.code(), Some(1));
    let lines = json_lines(&output);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["error"], "CMD2003");
    assert_eq!(lines[1]["result"], 3);
}
