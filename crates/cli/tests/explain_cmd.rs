//! `cmdtree explain` against the codes the dispatcher actually reports.

use std::process::Command;

use assert_cmd::cargo;
use serde_json::Value;

const DISPATCHER_CODES: [&str; 6] = ["CMD2001", "CMD2002", "CMD2003", "CMD2004", "CMD2005", "CMD2006"];

fn cmdtree(args: &[&str]) -> (bool, String) {
    let output = Command::new(cargo::cargo_bin!("cmdtree"))
        .args(args)
        .output()
        .expect("run cmdtree");
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
    )
}

fn explanation(id: &str) -> Value {
    let (ok, stdout) = cmdtree(&["explain", id, "--output", "json"]);
    assert!(ok, "explain {id} failed");
    let json: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["id"], id);
    json["explanation"].clone()
}

/// Error code `exec` reports for `input` in JSON mode.
fn failing_code(input: &str) -> String {
    let (ok, stdout) = cmdtree(&["exec", input, "--output", "json"]);
    assert!(!ok, "{input} unexpectedly succeeded");
    let json: Value = serde_json::from_str(&stdout).expect("valid json");
    json["error"].as_str().expect("error code").to_string()
}

#[test]
fn every_dispatcher_code_is_explained() {
    for id in DISPATCHER_CODES {
        let text = explanation(id);
        let text = text.as_str().unwrap_or_default();
        assert!(!text.trim().is_empty(), "{id} has no explanation");
    }
}

#[test]
fn codes_reported_by_exec_can_be_explained() {
    let cases = [
        ("nosuchcommand", "CMD2003"),
        ("time", "CMD2005"),
        ("gamemode flying", "CMD1106"),
        ("give diamond 100", "CMD1102"),
    ];
    for (input, expected) in cases {
        let code = failing_code(input);
        assert_eq!(code, expected, "{input}");
        assert!(explanation(&code).is_string(), "{code} reported but not explained");
    }
}

#[test]
fn unknown_code_has_no_explanation() {
    assert!(explanation("CMD9999").is_null());

    let (ok, stdout) = cmdtree(&["explain", "CMD9999", "--output", "pretty"]);
    assert!(ok);
    assert_eq!(stdout.trim(), "CMD9999: (no explanation available)");
}
