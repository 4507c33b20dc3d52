//! JSON export of case and suite reports.

use crate::report::TestReport;
use crate::suite::{SuiteReport, SuiteStats};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ReportWriteError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Serialize)]
struct SuiteDocument<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<&'a str>,
    stats: SuiteStats,
    test_cases: BTreeMap<String, CaseSummary<'a>>,
}

#[derive(Serialize)]
struct CaseSummary<'a> {
    name: &'a str,
    status: crate::Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    goal: Option<&'a str>,
}

/// Key under which a case is stored: spaces become underscores.
pub fn case_key(name: &str) -> String {
    name.replace(' ', "_")
}

/// Pretty-printed JSON for one case.
pub fn write_json(report: &TestReport) -> Result<String, ReportWriteError> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn write_json_file(report: &TestReport, path: &Path) -> Result<(), ReportWriteError> {
    let json = write_json(report)?;
    write_file(path, &json)
}

/// Pretty-printed suite index: statistics plus one summary per case.
pub fn write_suite_json(suite: &SuiteReport) -> Result<String, ReportWriteError> {
    let test_cases = suite
        .cases()
        .iter()
        .map(|case| {
            (
                case_key(&case.name),
                CaseSummary {
                    name: &case.name,
                    status: case.status(),
                    goal: case.goal.as_deref(),
                },
            )
        })
        .collect();
    let doc = SuiteDocument {
        name: &suite.name,
        project: suite.project.as_deref(),
        stats: suite.stats(),
        test_cases,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

fn write_file(path: &Path, contents: &str) -> Result<(), ReportWriteError> {
    let io_err = |source| ReportWriteError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    std::fs::write(path, contents).map_err(io_err)?;
    log::debug!("wrote {}", path.display());
    Ok(())
}

pub fn write_suite_json_file(suite: &SuiteReport, path: &Path) -> Result<(), ReportWriteError> {
    let json = write_suite_json(suite)?;
    write_file(path, &json)
}
