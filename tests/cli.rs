//! Integration tests for the profreport binary.

mod common;

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn run_profreport(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_profreport"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run profreport")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("non UTF-8 temp path")
}

#[test]
fn test_missing_input_exits_99() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.csv");
    let out_dir = dir.path().join("out");

    let output = run_profreport(&["-i", path_arg(&missing), "-o", path_arg(&out_dir)]);

    assert_eq!(output.status.code(), Some(99));
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not exist"));
    assert!(!out_dir.exists());
}

#[test]
fn test_json_summary_lists_artifacts() {
    let dir = TempDir::new().unwrap();
    let input = common::write_capture(dir.path());
    let out_dir = dir.path().join("nested").join("charts");

    let output = run_profreport(&[
        "--input",
        path_arg(&input),
        "--output",
        path_arg(&out_dir),
        "--width",
        "640",
        "--height",
        "480",
        "--barh-type",
        "plain",
        "--json",
    ]);
    assert!(
        output.status.success(),
        "profreport failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(summary["process_rows"], 12);
    assert_eq!(summary["cgroup_rows"], 6);

    let artifacts = summary["artifacts"].as_array().unwrap();
    assert_eq!(artifacts.len(), 15);
    for (artifact, title) in artifacts.iter().zip(common::REPORT_TITLES) {
        let path = Path::new(artifact.as_str().unwrap());
        assert!(path.exists(), "{} was not written", path.display());
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some(format!("{}.svg", title.replace(' ', "_")).as_str())
        );
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Plotting CPU Usage (Sum)"));
    assert!(stderr.contains("Plotting IO Distribution"));
}

#[test]
fn test_malformed_input_fails() {
    let dir = TempDir::new().unwrap();
    let input = common::write_lines(dir.path(), "bad.csv", &["no-second-field".to_string()]);

    let output = run_profreport(&["-i", path_arg(&input), "-o", path_arg(&dir.path().join("out"))]);

    assert!(!output.status.success());
    assert_ne!(output.status.code(), Some(99));
    assert!(String::from_utf8_lossy(&output.stderr).contains("line 1"));
}

#[test]
fn test_rejects_unknown_barh_type() {
    let dir = TempDir::new().unwrap();
    let input = common::write_capture(dir.path());
    let output = run_profreport(&["-i", path_arg(&input), "--barh-type", "mem"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown barh type"));
}

#[test]
fn test_rejects_out_of_range_tick_interval() {
    let dir = TempDir::new().unwrap();
    let input = common::write_capture(dir.path());
    let out_dir = dir.path().join("out");

    for value in ["0", "9223372036854775807"] {
        let output = run_profreport(&[
            "-i",
            path_arg(&input),
            "-o",
            path_arg(&out_dir),
            "--tick-interval",
            value,
        ]);
        assert_eq!(output.status.code(), Some(2), "accepted --tick-interval {value}");
        assert!(String::from_utf8_lossy(&output.stderr).contains("--tick-interval"));
    }
    assert!(!out_dir.exists());
}

#[test]
fn test_version_flag() {
    for flag in ["-v", "--version"] {
        let output = run_profreport(&[flag]);
        assert!(output.status.success());
        assert_eq!(
            String::from_utf8_lossy(&output.stdout).trim(),
            format!("profreport {}", env!("CARGO_PKG_VERSION"))
        );
    }

    let verbose = run_profreport(&["--verbose", "-i", "/nonexistent/profile.csv"]);
    assert_eq!(verbose.status.code(), Some(99));
}
