//! CLI tests for `cmdtree usage`, `paths` and `commands`.

use std::process::Command;

use assert_cmd::cargo;

fn cmdtree_cmd() -> Command {
    Command::new(cargo::cargo_bin!("cmdtree"))
}

fn json_of(args: &[&str]) -> serde_json::Value {
    let output = cmdtree_cmd()
        .args(args)
        .args(["--output", "json"])
        .output()
        .expect("run cmdtree");
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("valid json")
}

fn strings(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .expect("array")
        .iter()
        .map(|v| v.as_str().expect("string").to_string())
        .collect()
}

#[test]
fn usage_hides_commands_without_permission() {
    let lines = strings(&json_of(&["usage"]));
    assert!(lines.contains(&"give <item> [<amount>]".to_string()), "{lines:?}");
    assert!(lines.contains(&"msg -> tell".to_string()), "{lines:?}");
    assert!(!lines.iter().any(|l| l.starts_with("teleport")), "{lines:?}");

    let lines = strings(&json_of(&["usage", "--op"]));
    assert!(lines.contains(&"teleport <target>".to_string()), "{lines:?}");
    assert!(lines.contains(&"tp -> teleport".to_string()), "{lines:?}");
}

#[test]
fn help_for_one_alias() {
    let help = json_of(&["usage", "give"]);
    assert_eq!(help["mapping"]["owner"], "demo");
    assert_eq!(help["mapping"]["description"], "Give an item");
    assert_eq!(
        help["mapping"]["extended_description"],
        "Amount defaults to 1 and may be at most 64."
    );
    assert_eq!(help["usage"], serde_json::json!(["give <item> [<amount>]"]));

    let help = json_of(&["usage", "msg"]);
    assert_eq!(help["mapping"]["primary_alias"], "tell");
    assert_eq!(help["mapping"]["all_aliases"], serde_json::json!(["tell", "msg"]));
}

#[test]
fn paths_lists_executable_paths() {
    let paths = strings(&json_of(&["paths"]));
    assert!(paths.contains(&"give <item>".to_string()), "{paths:?}");
    assert!(paths.contains(&"give <item> <amount>".to_string()), "{paths:?}");
    assert!(paths.contains(&"time set <value>".to_string()), "{paths:?}");
}

#[test]
fn commands_lists_mappings() {
    let mappings = json_of(&["commands"]);
    let mappings = mappings.as_array().expect("array");
    let time = mappings
        .iter()
        .find(|m| m["primary_alias"] == "admin.time")
        .expect("namespaced mapping");
    assert_eq!(time["owner"], "admin");
    assert!(mappings.iter().any(|m| m["primary_alias"] == "teleport"));
}
