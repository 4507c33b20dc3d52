//! Status roll-up for tables, groups and whole test cases.

use crate::report::Entry;
use diag_eval::{Table, Verdict};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Pass,
    Fail,
    Error,
    Info,
    #[default]
    None,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Fail => "FAIL",
            Status::Error => "ERROR",
            Status::Info => "INFO",
            Status::None => "NONE",
        }
    }

    /// Case-insensitive parse of a status word.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PASS" => Some(Status::Pass),
            "FAIL" => Some(Status::Fail),
            "ERROR" => Some(Status::Error),
            "INFO" => Some(Status::Info),
            "NONE" => Some(Status::None),
            _ => None,
        }
    }

    /// Weight used when folding children into a group status.
    fn priority(self) -> u8 {
        match self {
            Status::Error => 3,
            Status::Fail => 2,
            Status::Pass => 1,
            Status::Info | Status::None => 0,
        }
    }
}

impl From<Verdict> for Status {
    fn from(v: Verdict) -> Self {
        match v {
            Verdict::Pass => Status::Pass,
            Verdict::Fail => Status::Fail,
            Verdict::None => Status::None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn row_rank(cell: Option<&String>) -> u8 {
    match cell.and_then(|c| Status::parse(c)) {
        Some(Status::Fail) => 0,
        Some(Status::Pass) => 1,
        Some(Status::None) => 2,
        _ => 3,
    }
}

fn fold_cells<'a>(cells: impl Iterator<Item = &'a String>) -> Status {
    let mut has_pass = false;
    for cell in cells {
        match Status::parse(cell) {
            Some(Status::Fail) => return Status::Fail,
            Some(Status::Pass) => has_pass = true,
            _ => {}
        }
    }
    if has_pass { Status::Pass } else { Status::None }
}

/// Status of a table.
///
/// With a `Result` column, rows are reordered failing-first and only that
/// column counts; otherwise every cell is inspected.
pub fn table_status(table: &mut Table) -> Status {
    let result_idx = table
        .column_header
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("result"));

    match result_idx {
        Some(idx) => {
            table.data.sort_by_key(|row| row_rank(row.get(idx)));
            fold_cells(table.data.iter().filter_map(|row| row.get(idx)))
        }
        None => fold_cells(table.data.iter().flatten()),
    }
}

/// Highest-priority status among `children`.
pub fn group_status(children: &[Entry]) -> Status {
    children.iter().fold(Status::None, |acc, child| {
        let s = child.status();
        if s.priority() > acc.priority() { s } else { acc }
    })
}

fn collect_statuses(entries: &[Entry], out: &mut Vec<Status>) {
    for entry in entries {
        match entry {
            Entry::Group {
                status, children, ..
            } if *status != Status::None => {
                out.push(*status);
                collect_statuses(children, out);
            }
            Entry::Step { status, .. } | Entry::Table { status, .. } => out.push(*status),
            _ => {}
        }
    }
}

/// Status of a whole test case: `ERROR`, then `FAIL`, then `PASS`, else `NONE`.
pub fn case_status(lines: &[Entry]) -> Status {
    let mut statuses = Vec::new();
    collect_statuses(lines, &mut statuses);
    [Status::Error, Status::Fail, Status::Pass]
        .into_iter()
        .find(|s| statuses.contains(s))
        .unwrap_or(Status::None)
}
