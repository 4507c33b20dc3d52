use diag_report::{
    Status, SuiteReport, SuiteStatus, TestReport, case_key, write_json, write_json_file,
    write_suite_json, write_suite_json_file,
};
use pretty_assertions::assert_eq;

fn finished(name: &str, status: Status) -> TestReport {
    let mut report = TestReport::new(name);
    report.add_step(status, "done");
    report
}

#[test]
fn test_case_json_shape() {
    let mut report = TestReport::new("Read DTCs");
    report.goal = Some("no unexpected DTCs".into());
    report.dut.insert("ecu".into(), "BCM".into());
    report.condition(false, "ignition on", "KL15");

    let json: serde_json::Value = serde_json::from_str(&write_json(&report).unwrap()).unwrap();
    assert_eq!(json["name"], "Read DTCs");
    assert_eq!(json["status"], "FAIL");
    assert_eq!(json["dut"]["ecu"], "BCM");
    assert_eq!(json["condition"], "ignition on");
    assert_eq!(json["conditionComment"], "KL15");
    assert_eq!(json["lines"][0]["category"], "STEP");
    assert!(json.get("open_groups").is_none());
}

#[test]
fn test_write_json_file_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan").join("case.json");
    write_json_file(&finished("case", Status::Pass), &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("\"status\": \"PASS\""));
}

#[test]
fn test_suite_json_indexes_cases() {
    let mut suite = SuiteReport::new("nightly");
    suite.push(finished("Read DTCs", Status::Pass));
    suite.push(finished("Session", Status::Fail));
    assert_eq!(suite.stats().overall, SuiteStatus::Fail);

    let json: serde_json::Value =
        serde_json::from_str(&write_suite_json(&suite).unwrap()).unwrap();
    assert_eq!(json["name"], "nightly");
    assert_eq!(json["stats"]["total"], 2);
    assert_eq!(json["stats"]["overall"], "FAIL");
    assert_eq!(json["test_cases"]["Read_DTCs"]["status"], "PASS");
    assert_eq!(json["test_cases"]["Session"]["name"], "Session");
}

#[test]
fn test_suite_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("suite.json");
    let mut suite = SuiteReport::new("s");
    suite.push(finished("a", Status::None));
    write_suite_json_file(&suite, &path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["stats"]["overall"], "NONE");
}

#[test]
fn test_case_key() {
    assert_eq!(case_key("Read all DTCs"), "Read_all_DTCs");
}
