//! The narrow interface through which evaluation results reach a test report.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
    /// Evaluated but neither passing nor failing (e.g. a muted DTC).
    None,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
            Verdict::None => "NONE",
        }
    }

    /// Lower-case form used in table cells.
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Fail => "fail",
            Verdict::None => "none",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub column_header: Vec<String>,
    pub data: Vec<Vec<String>>,
    /// Whether a viewer shows the table unfolded.
    pub expanded: bool,
}

impl Table {
    pub fn new(name: impl Into<String>, column_header: &[&str], expanded: bool) -> Self {
        Self {
            name: name.into(),
            column_header: column_header.iter().map(|h| (*h).to_string()).collect(),
            data: Vec::new(),
            expanded,
        }
    }
}

/// One request/response exchange as shown in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticGroup {
    pub name: String,
    pub tx: String,
    pub rx: String,
    pub expected: String,
    pub status: Verdict,
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("no active report")]
    NoActiveReport,
    #[error("report rejected entry: {0}")]
    Rejected(String),
}

pub trait ReportSink {
    fn emit_table(&mut self, table: Table) -> Result<(), SinkError>;

    fn emit_step(&mut self, status: Verdict, message: &str) -> Result<(), SinkError>;

    fn emit_diagnostic_group(&mut self, group: DiagnosticGroup) -> Result<(), SinkError>;
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn emit_table(&mut self, table: Table) -> Result<(), SinkError> {
        (**self).emit_table(table)
    }

    fn emit_step(&mut self, status: Verdict, message: &str) -> Result<(), SinkError> {
        (**self).emit_step(status, message)
    }

    fn emit_diagnostic_group(&mut self, group: DiagnosticGroup) -> Result<(), SinkError> {
        (**self).emit_diagnostic_group(group)
    }
}

/// Sink that accepts and drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn emit_table(&mut self, _table: Table) -> Result<(), SinkError> {
        Ok(())
    }

    fn emit_step(&mut self, _status: Verdict, _message: &str) -> Result<(), SinkError> {
        Ok(())
    }

    fn emit_diagnostic_group(&mut self, _group: DiagnosticGroup) -> Result<(), SinkError> {
        Ok(())
    }
}
