use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../test-fixtures/plans")
        .join(name)
}

fn dtc_check(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dtc-check"))
        .args(args)
        .output()
        .expect("failed to run dtc-check")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn read_json(path: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("reading {}: {e}", path.display()));
    serde_json::from_str(&text).unwrap()
}

#[test]
fn test_run_passing_plan_writes_reports() {
    let out = TempDir::new().unwrap();
    let plan = fixture("body-ecu.yml");
    let output = dtc_check(&[
        "run",
        plan.to_str().unwrap(),
        "-o",
        out.path().to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let text = stdout(&output);
    assert!(text.contains("PASS  Body ECU smoke: Session control"));
    assert!(text.contains("overall PASS"));

    let case = read_json(&out.path().join("body-ecu/DTC_memory_after_ignition_cycle.json"));
    assert_eq!(case["status"], "PASS");
    assert_eq!(case["tables"][1]["name"], "DTC Comprehensive Evaluation");
    assert_eq!(case["requirements"][0], "REQ-DIAG-001");
    assert_eq!(case["dut"]["ecu"], "BCM");

    let suite = read_json(&out.path().join("body-ecu/suite.json"));
    assert_eq!(suite["stats"]["total"], 2);
    assert_eq!(suite["test_cases"]["Session_control"]["status"], "PASS");
}

#[test]
fn test_run_failing_plan_exits_nonzero() {
    let out = TempDir::new().unwrap();
    let plan = fixture("failing.yml");
    let output = dtc_check(&["run", plan.to_str().unwrap(), "-o", out.path().to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("overall FAIL"));

    let case = read_json(&out.path().join("failing/Unexpected_DTC.json"));
    assert_eq!(case["status"], "FAIL");
}

#[test]
fn test_missing_response_marks_case_error() {
    let out = TempDir::new().unwrap();
    let plan = fixture("missing-response.yml");
    let output = dtc_check(&["run", plan.to_str().unwrap(), "-o", out.path().to_str().unwrap()]);
    assert!(!output.status.success());

    let case = read_json(&out.path().join("missing-response/No_answer.json"));
    assert_eq!(case["status"], "ERROR");
    let comment = case["lines"][0]["comment"].as_str().unwrap();
    assert!(comment.starts_with("case aborted:"), "comment: {comment}");
}

#[test]
fn test_run_rejects_plans_sharing_a_file_stem() {
    let plans = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let first = plans.path().join("a/body-ecu.yml");
    let second = plans.path().join("b/body-ecu.yml");
    for copy in [&first, &second] {
        std::fs::create_dir_all(copy.parent().unwrap()).unwrap();
        std::fs::copy(fixture("body-ecu.yml"), copy).unwrap();
    }

    let output = dtc_check(&[
        "run",
        first.to_str().unwrap(),
        second.to_str().unwrap(),
        "-o",
        out.path().to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("would both write reports to 'body-ecu'"), "stderr: {stderr}");
    assert!(!out.path().join("body-ecu").exists());
}

#[test]
fn test_run_rejects_plan_with_semantic_errors() {
    let out = TempDir::new().unwrap();
    let plan = fixture("semantic-issues.yml");
    let output = dtc_check(&["run", plan.to_str().unwrap(), "-o", out.path().to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("FAILED"));
    assert!(!out.path().join("semantic-issues").exists());
}

#[test]
fn test_validate_valid_plan() {
    let plan = fixture("body-ecu.yml");
    let output = dtc_check(&["validate", plan.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stdout(&output).contains(": valid"));
}

#[test]
fn test_validate_summary_counts_errors() {
    let plan = fixture("semantic-issues.yml");
    let output = dtc_check(&["validate", plan.to_str().unwrap(), "--summary"]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("3 validation errors"));
}

#[test]
fn test_validate_quiet_prints_nothing() {
    let plan = fixture("invalid-schema.yml");
    let output = dtc_check(&["validate", plan.to_str().unwrap(), "-q"]);
    assert!(!output.status.success());
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_check_response_prints_verdict() {
    let output = dtc_check(&[
        "check-response",
        "--request",
        "0x22 0xF1 0x90",
        "--actual",
        "0x62 0xF1 0x90 0x57 0x30",
        "--expected",
        "ln(2)",
    ]);
    assert!(output.status.success());
    let verdict: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(verdict["result"], "PASS");
    assert_eq!(verdict["responsetype"], "ln");
}

#[test]
fn test_check_response_failure_exits_nonzero() {
    let output = dtc_check(&[
        "check-response",
        "--request",
        "0x10 0x03",
        "--actual",
        "0x7F 0x10 0x12",
        "--expected",
        "positive",
    ]);
    assert!(!output.status.success());
    let verdict: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(verdict["result"], "FAIL");
}

#[test]
fn test_decode_status() {
    let output = dtc_check(&["decode-status", "0x09"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Status:      0x09"));
    let test_failed = text.lines().find(|l| l.contains("TestFailed ")).unwrap();
    assert!(test_failed.trim_end().ends_with('1'));
    let pending = text.lines().find(|l| l.contains("pendingDTC")).unwrap();
    assert!(pending.trim_end().ends_with('0'));
}

#[test]
fn test_decode_status_out_of_range() {
    let output = dtc_check(&["decode-status", "0x1FF"]);
    assert!(!output.status.success());
}
