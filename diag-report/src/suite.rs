//! Suite-level aggregation over finished test cases.

use crate::report::TestReport;
use crate::status::Status;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SuiteStatus {
    Pass,
    Fail,
    Error,
    None,
    /// Some cases passed and others produced no verdict.
    Partial,
}

impl SuiteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SuiteStatus::Pass => "PASS",
            SuiteStatus::Fail => "FAIL",
            SuiteStatus::Error => "ERROR",
            SuiteStatus::None => "NONE",
            SuiteStatus::Partial => "PARTIAL",
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(self, SuiteStatus::Fail | SuiteStatus::Error)
    }
}

impl fmt::Display for SuiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuiteStats {
    pub total: usize,
    pub pass: usize,
    pub fail: usize,
    pub error: usize,
    pub none: usize,
    pub overall: SuiteStatus,
}

impl SuiteStats {
    pub fn from_statuses(statuses: impl IntoIterator<Item = Status>) -> Self {
        let (mut total, mut pass, mut fail, mut error, mut none) = (0, 0, 0, 0, 0);
        for status in statuses {
            total += 1;
            match status {
                Status::Pass => pass += 1,
                Status::Fail => fail += 1,
                Status::Error => error += 1,
                Status::None => none += 1,
                Status::Info => {}
            }
        }
        let runnable = pass + fail + error;

        let overall = if error > 0 {
            SuiteStatus::Error
        } else if fail > 0 {
            SuiteStatus::Fail
        } else if pass > 0 && pass == runnable {
            SuiteStatus::Pass
        } else if none == total {
            SuiteStatus::None
        } else {
            SuiteStatus::Partial
        };

        Self {
            total,
            pass,
            fail,
            error,
            none,
            overall,
        }
    }

    /// Whole-number share of `count` in the suite, rounded down.
    pub fn percent(&self, count: usize) -> usize {
        if self.total == 0 {
            0
        } else {
            count * 100 / self.total
        }
    }
}

impl fmt::Display for SuiteStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "all {} {}% | pass {} {}% | fail {} {}% | error {} {}% | none {} | overall {}",
            self.total,
            self.percent(self.total),
            self.pass,
            self.percent(self.pass),
            self.fail,
            self.percent(self.fail),
            self.error,
            self.percent(self.error),
            self.none,
            self.overall,
        )
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SuiteReport {
    pub name: String,
    pub project: Option<String>,
    cases: Vec<TestReport>,
}

impl SuiteReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project: None,
            cases: Vec::new(),
        }
    }

    pub fn push(&mut self, report: TestReport) {
        log::debug!("case '{}' finished with {}", report.name, report.status());
        self.cases.push(report);
    }

    pub fn cases(&self) -> &[TestReport] {
        &self.cases
    }

    pub fn stats(&self) -> SuiteStats {
        SuiteStats::from_statuses(self.cases.iter().map(TestReport::status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overall_precedence() {
        let overall = |s: &[Status]| SuiteStats::from_statuses(s.iter().copied()).overall;
        let (pass, fail, error, none) = (Status::Pass, Status::Fail, Status::Error, Status::None);
        assert_eq!(overall(&[pass, fail, error]), SuiteStatus::Error);
        assert_eq!(overall(&[pass, fail]), SuiteStatus::Fail);
        assert_eq!(overall(&[pass, pass]), SuiteStatus::Pass);
        assert_eq!(overall(&[pass, none]), SuiteStatus::Pass);
        assert_eq!(overall(&[none, none]), SuiteStatus::None);
        assert_eq!(overall(&[]), SuiteStatus::None);
        assert_eq!(overall(&[Status::Info]), SuiteStatus::Partial);
    }

    #[test]
    fn test_percent_rounds_down() {
        let stats = SuiteStats::from_statuses([Status::Pass, Status::Fail, Status::Fail]);
        assert_eq!(stats.percent(stats.pass), 33);
        assert_eq!(stats.percent(stats.fail), 66);
        assert_eq!(SuiteStats::from_statuses(Vec::new()).percent(0), 0);
    }
}
