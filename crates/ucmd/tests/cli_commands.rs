#![cfg(all(unix, feature = "cli"))]

use std::path::PathBuf;
use std::process::{Command, Output};

fn missing_port(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/ucmd-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir.join("ttyNOPE")
}

fn ucmd(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ucmd"))
        .env_remove("UCMD_PORT")
        .env_remove("UCMD_BAUD")
        .arg("--log-level")
        .arg("error")
        .args(args)
        .output()
        .expect("ucmd should run")
}

#[test]
fn version_prints_package_version() {
    let output = ucmd(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("ucmd {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn extended_version_lists_type_codes() {
    let output = ucmd(&["version", "--extended"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("type codes: cbBhHiIlLf"), "{stdout}");
    assert!(stdout.contains("request 0xFF"), "{stdout}");
}

#[test]
fn discover_without_port_is_a_usage_error() {
    let output = ucmd(&["discover"]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no serial port given"), "{stderr}");
}

#[test]
fn run_without_port_is_a_usage_error() {
    let output = ucmd(&["run", "blink", "1"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn bad_parameter_is_rejected_before_opening_the_port() {
    let port = missing_port("bad-param");
    let port = port.to_string_lossy();
    let output = ucmd(&["--port", port.as_ref(), "run", "move", "x=fast"]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid parameter"), "{stderr}");
}

#[test]
fn bad_wait_is_rejected() {
    let output = ucmd(&["--port", "/dev/null", "run", "ping", "--wait", "soon"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn discover_on_missing_port_is_a_transport_error() {
    let port = missing_port("discover");
    let port = port.to_string_lossy();
    let output = ucmd(&["--port", port.as_ref(), "discover"]);
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("discovery failed"), "{stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn port_can_come_from_the_environment() {
    let port = missing_port("env");
    let output = Command::new(env!("CARGO_BIN_EXE_ucmd"))
        .env("UCMD_PORT", &port)
        .arg("--log-level")
        .arg("off")
        .arg("discover")
        .output()
        .expect("ucmd should run");
    assert_eq!(output.status.code(), Some(3));
}
