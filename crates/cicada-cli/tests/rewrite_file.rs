//! Integration tests for `cicada-build rewrite`.

use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-p", "cicada-cli", "--bin", "cicada-build", "--"]);
    cmd
}

#[test]
fn test_rewrite_prints_rewritten_source() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("package.json"), r#"{"name": "demo", "version": "1.0.0"}"#).unwrap();
    fs::create_dir_all(root.join("src/lib")).unwrap();
    fs::write(
        root.join("src/tsconfig.json"),
        r#"{"compilerOptions": {"baseUrl": ".", "paths": {"@lib/*": ["lib/*"]}}}"#,
    )
    .unwrap();
    fs::write(root.join("src/lib/math.ts"), "export const add = 1;\n").unwrap();
    fs::write(
        root.join("src/main.ts"),
        "import { add } from \"@lib/math\";\nimport \"@host/api\";\n",
    )
    .unwrap();

    let output = cargo_bin()
        .args([
            "rewrite",
            "src/main.ts",
            "--dest",
            "dist/build/main.js",
            "--reserved-prefix",
            "@host/",
            "--cwd",
        ])
        .arg(root)
        .output()
        .expect("Failed to run rewrite command");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout,
        "import { add } from \"./lib/math.js\";\nimport \"@host/api\";\n"
    );
}

#[test]
fn test_rewrite_unresolved_alias_fails() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("package.json"), r#"{"name": "demo", "version": "1.0.0"}"#).unwrap();
    fs::write(root.join("main.js"), "import x from \"nowhere\";\n").unwrap();

    let output = cargo_bin()
        .args(["rewrite", "main.js", "--dest", "out/main.js", "--json", "--cwd"])
        .arg(root)
        .output()
        .expect("Failed to run rewrite command");

    assert!(!output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
    assert_eq!(json["error"]["code"], "IMPORT_UNRESOLVED");
}
