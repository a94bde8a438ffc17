//! CLI integration tests

use std::io::Write;
use std::process::{Command, Output};

const RUNTIME: &str =
    r#"[{"mem": 1000, "cpu": 1, "epm": 0, "rpm": 100, "apdex": 0, "endpoints": 10, "_appname": "orders"}]"#;

/// Run the built binary isolated from the caller's config and environment
fn mswyw(args: &[&str]) -> Output {
    let home = tempfile::tempdir().expect("Failed to create temp home");
    let mut command = Command::new(env!("CARGO_BIN_EXE_mswyw"));
    for (key, _) in std::env::vars() {
        if key.starts_with("MSWYW_") {
            command.env_remove(key);
        }
    }
    command
        .args(args)
        .env("HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = mswyw(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("--codeInfoProvider"), "Should show code info flag");
    assert!(stdout.contains("--runtimeProvider"), "Should show runtime flag");
    assert!(stdout.contains("--providerParams"), "Should show params flag");
    assert!(stdout.contains("--coefficients"), "Should show coefficients flag");
    assert!(stdout.contains("--defaultMetricValue"), "Should show default flag");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = mswyw(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("mswyw"), "Should show binary name");
}

#[test]
fn test_missing_code_info_provider_is_usage_error() {
    let output = mswyw(&[]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--codeInfoProvider"));
}

#[test]
fn test_json_report_from_literal_runtime() {
    let output = mswyw(&[
        "--codeInfoProvider",
        r#"{"service": "orders"}"#,
        "--runtimeProvider",
        RUNTIME,
        "--format",
        "json",
    ]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be a JSON report");

    assert_eq!(report["score"]["cost"], 2000.0);
    assert_eq!(report["score"]["value"], 101000.0);
    assert_eq!(report["score"]["score"], 50500.0);
    assert_eq!(report["instances"][0]["_appname"], "orders");
    assert_eq!(report["code_info"]["service"], "orders");
    assert_eq!(report["averages"]["rpm_avg"], 100.0);
}

#[test]
fn test_table_report() {
    let output = mswyw(&["--codeInfoProvider", "{}", "--runtimeProvider", RUNTIME]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Instances"));
    assert!(stdout.contains("orders"));
    assert!(stdout.contains("Started:"));
    assert!(stdout.contains("Finished:"));
    assert!(stdout.contains("mswyw score:"));
    assert!(stdout.contains("50500.00"));
}

#[test]
fn test_runtime_from_file_with_overrides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", RUNTIME).unwrap();

    let output = mswyw(&[
        "--codeInfoProvider",
        "{}",
        "--runtimeProvider",
        file.path().to_str().unwrap(),
        "--overrides",
        r#"{"apdex": 2}"#,
        "--format",
        "json",
    ]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["score"]["value"], 103000.0);
}

#[test]
fn test_invalid_coefficient_exits_with_problem() {
    let output = mswyw(&[
        "--codeInfoProvider",
        "{}",
        "--runtimeProvider",
        "[]",
        "--coefficients",
        r#"{"total": 1, "apdex": 1, "rpm": 1, "endpoints": 1, "mem": 1, "cpu": "lots", "epm": 1}"#,
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(255));
    assert!(stderr.contains("Problem:"));
    assert!(stderr.contains("cpu is set to"));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_kibana_without_apps_exits_with_problem() {
    let output = mswyw(&[
        "--codeInfoProvider",
        "{}",
        "--providerParams",
        r#"{"kibana.URL": "http://127.0.0.1:1", "kibana.APPS": ""}"#,
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(255));
    assert!(stderr.contains("Problem:"));
    assert!(stderr.contains("no apps found"));
}

#[test]
fn test_metrics_file_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mswyw.prom");

    let output = mswyw(&[
        "--codeInfoProvider",
        "{}",
        "--runtimeProvider",
        RUNTIME,
        "--format",
        "json",
        "--metrics-file",
        path.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("mswyw_instances 1"));
    assert!(text.contains("mswyw_score 50500"));
}

#[test]
fn test_config_file_sets_default_format() {
    let mut config = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(config, r#"{{"default_format": "json"}}"#).unwrap();

    let output = mswyw(&[
        "--codeInfoProvider",
        "{}",
        "--runtimeProvider",
        "[]",
        "--config",
        config.path().to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["score"]["score"], 0.0);
    assert!(report["averages"].is_null());
}
