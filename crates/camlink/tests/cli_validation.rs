#![cfg(feature = "cli")]

use std::process::{Command, Output};

fn camlink(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_camlink"))
        .env_remove("CAMLINK_PORT")
        .env_remove("CAMLINK_BAUD")
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("camlink should run")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn version_prints_package_version() {
    let output = camlink(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("camlink {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn extended_version_lists_build_details() {
    let output = camlink(&["version", "--extended"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name: camlink"));
    assert!(stdout.contains("max_package_data: 1024"));
}

#[test]
fn long_osd_text_is_rejected_before_opening_port() {
    let text = "x".repeat(256);
    let output = camlink(&["--port", "/dev/camlink-never-opened", "osd", &text]);
    assert_eq!(output.status.code(), Some(60));
    let err = stderr(&output);
    assert!(err.contains("text_length"), "stderr: {err}");
    assert!(!err.contains("open failed"), "stderr: {err}");
}

#[test]
fn out_of_range_package_time_is_usage_error() {
    let output = camlink(&["--port", "/dev/camlink-never-opened", "package", "24:00", "1"]);
    assert_eq!(output.status.code(), Some(64));
    let err = stderr(&output);
    assert!(err.contains("HH:MM"), "stderr: {err}");
    assert!(!err.contains("open failed"), "stderr: {err}");
}

#[test]
fn impossible_date_is_rejected_before_opening_port() {
    for date in ["2024-02-31", "2023-04-31"] {
        let output = camlink(&["--port", "/dev/camlink-never-opened", "next", date, "14:20"]);
        assert_eq!(output.status.code(), Some(64), "date {date}");
        let err = stderr(&output);
        assert!(err.contains("YYYY-MM-DD"), "stderr: {err}");
        assert!(!err.contains("open failed"), "stderr: {err}");
    }
}

#[test]
fn package_number_above_255_is_data_error() {
    let output = camlink(&["package", "12:00", "256"]);
    assert_eq!(output.status.code(), Some(60));
    assert!(stderr(&output).contains("package_number"));
}

#[test]
fn unsupported_baud_rate_is_data_error() {
    let output = camlink(&["baud", "12345"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn malformed_date_is_usage_error() {
    let output = camlink(&["next", "11/09/2024", "14:20"]);
    assert_eq!(output.status.code(), Some(64));
    assert!(stderr(&output).contains("YYYY-MM-DD"));
}

#[test]
fn missing_port_is_usage_error() {
    let output = camlink(&["osd", "hello"]);
    assert_eq!(output.status.code(), Some(64));
    assert!(stderr(&output).contains("CAMLINK_PORT"));
}

#[test]
fn nonexistent_port_fails_to_open() {
    let output = camlink(&["--port", "/dev/camlink-does-not-exist", "rtc", "--unix", "0"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("open failed"));
}
