//! Integration tests for `cicada-build version`.

use std::process::Command;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-p", "cicada-cli", "--bin", "cicada-build", "--"]);
    cmd
}

#[test]
fn test_version_prints_name_and_version() {
    let output = cargo_bin()
        .arg("version")
        .output()
        .expect("Failed to run version command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("cicada-build "), "unexpected output: {stdout}");
}

#[test]
fn test_version_json() {
    let output = cargo_bin()
        .args(["version", "--json"])
        .output()
        .expect("Failed to run version command");

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
    assert_eq!(json["ok"], true);
    assert!(json["version"].is_string());
}
