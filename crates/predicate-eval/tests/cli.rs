//! End-to-end tests for the `predicate-eval` binary.

#![expect(clippy::expect_used, reason = "tests fail loudly on setup errors")]

use std::fs;
use std::str;

use assert_cmd::Command;
use rstest::rstest;
use tempfile::TempDir;

fn predicate_eval() -> Command {
    let mut cmd = Command::cargo_bin("predicate-eval").expect("binary exists");
    cmd.env_remove("PREDICATE_EVAL_LOG_LEVEL")
        .env_remove("PREDICATE_EVAL_STOP_TOKEN");
    cmd
}

#[rstest]
#[case(&["eval", "weight >= 1 && weight <= 2", "--bind", "weight=1.25"], 0, "true\n")]
#[case(&["eval", "processor != i5", "--bind", "processor=i5"], 1, "false\n")]
#[case(&["eval", "win_version = null"], 0, "true\n")]
#[case(&["variables", "(processor == i5 OR weight >= 1.5) && ports = audio"], 0, "processor\nweight\nports\n")]
#[case(&["explain", "NOT a = 1 | b ~= 'usb\\d'"], 0, "NOT a == 1 OR b ~= usb\\d\n")]
fn exits_with_outcome(#[case] args: &[&str], #[case] code: i32, #[case] stdout: &str) {
    let output = predicate_eval().args(args).output().expect("runs");
    assert_eq!(output.status.code(), Some(code));
    assert_eq!(str::from_utf8(&output.stdout).expect("utf8"), stdout);
}

#[rstest]
#[case(&["eval", "x < null"], "'null' can only be compared with '==' or '!='")]
#[case(&["eval", "weight == 1 AND $$$"], "unknown symbol: $$$")]
#[case(&["eval", "price > 2", "--allow", "weight"], "unknown variable price")]
#[case(&["eval", "a == 1", "--bind", "novalue"], "invalid binding 'novalue'")]
#[case(&["eval", "a == 1", "--log-level", "chatty"], "unknown log level 'chatty'")]
fn reports_errors_with_exit_code_two(#[case] args: &[&str], #[case] message: &str) {
    let output = predicate_eval().args(args).output().expect("runs");
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    let stderr = str::from_utf8(&output.stderr).expect("utf8");
    assert!(stderr.contains(message), "{stderr}");
}

#[test]
fn reads_bindings_file_and_merges_options() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("bindings.json");
    fs::write(
        &path,
        r#"{"processor": "i7", "ports": ["usb3"], "price": "2.795,00 €"}"#,
    )
    .expect("write bindings");

    let output = predicate_eval()
        .arg("eval")
        .arg("processor == i7 AND ports = audio AND price > '2.000,00 €'")
        .arg("--bindings")
        .arg(&path)
        .args(["--bind", "ports=audio"])
        .output()
        .expect("runs");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn reports_missing_bindings_file() {
    let dir = TempDir::new().expect("temp dir");
    let output = predicate_eval()
        .args(["eval", "a == 1", "--bindings"])
        .arg(dir.path().join("missing.json"))
        .output()
        .expect("runs");
    assert_eq!(output.status.code(), Some(2));
    let stderr = str::from_utf8(&output.stderr).expect("utf8");
    assert!(stderr.contains("failed to read bindings file"), "{stderr}");
}

#[test]
fn emits_json_report() {
    let output = predicate_eval()
        .args(["eval", "ports != audio", "--json"])
        .args(["--bind", "ports=usb3", "--bind", "ports=audio"])
        .output()
        .expect("runs");
    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout holds JSON");
    assert_eq!(report.get("result"), Some(&serde_json::json!(false)));
    assert_eq!(report.get("variables"), Some(&serde_json::json!(["ports"])));
    assert_eq!(report.get("expression"), Some(&serde_json::json!("ports != audio")));
}

#[test]
fn stop_token_comes_from_environment() {
    let output = predicate_eval()
        .env("PREDICATE_EVAL_STOP_TOKEN", "{")
        .args(["eval", "weight <= 2 { Hello World }", "--bind", "weight=1.25"])
        .output()
        .expect("runs");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn empty_stop_token_option_overrides_environment() {
    let output = predicate_eval()
        .env("PREDICATE_EVAL_STOP_TOKEN", "{")
        .args(["explain", "a == 1 { b", "--stop-token", ""])
        .output()
        .expect("runs");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn debug_logging_goes_to_stderr() {
    let output = predicate_eval()
        .args(["--log-level", "debug", "eval", "a == 1", "--bind", "a=1"])
        .output()
        .expect("runs");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(str::from_utf8(&output.stdout).expect("utf8"), "true\n");
    let stderr = str::from_utf8(&output.stderr).expect("utf8");
    assert!(stderr.contains("parsed predicate"), "{stderr}");
}
