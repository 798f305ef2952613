//! Integration test: Verify binary prints correct version

use std::process::Command;

#[test]
fn binary_prints_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_dragorder"))
        .arg("--version")
        .output()
        .expect("Failed to execute binary");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(
        stdout.contains("0.1.0"),
        "Expected output to contain version '0.1.0', but got: {}",
        stdout
    );
}

#[test]
fn missing_list_file_fails_before_touching_terminal() {
    let scratch = std::env::temp_dir().join(format!("dragorder_version_{}", std::process::id()));
    let output = Command::new(env!("CARGO_BIN_EXE_dragorder"))
        .arg("/nonexistent/dragorder/list.json")
        .env("DRAGORDER_CONFIG", scratch.join("absent.toml"))
        .env("RUST_LOG", "off")
        .env("XDG_STATE_HOME", &scratch)
        .env("HOME", &scratch)
        .output()
        .expect("Failed to execute binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("list.json"), "unexpected stderr: {stderr}");
    let _ = std::fs::remove_dir_all(scratch);
}
