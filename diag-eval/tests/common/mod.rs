#![allow(dead_code)]

use diag_eval::{DiagnosticGroup, ReportSink, SinkError, Table, Verdict};

/// Sink that keeps everything it is given.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub tables: Vec<Table>,
    pub steps: Vec<(Verdict, String)>,
    pub groups: Vec<DiagnosticGroup>,
}

impl ReportSink for RecordingSink {
    fn emit_table(&mut self, table: Table) -> Result<(), SinkError> {
        self.tables.push(table);
        Ok(())
    }

    fn emit_step(&mut self, status: Verdict, message: &str) -> Result<(), SinkError> {
        self.steps.push((status, message.to_string()));
        Ok(())
    }

    fn emit_diagnostic_group(&mut self, group: DiagnosticGroup) -> Result<(), SinkError> {
        self.groups.push(group);
        Ok(())
    }
}

/// Sink that refuses diagnostic groups but records the fallback.
#[derive(Debug, Default)]
pub struct NoGroupSink {
    pub inner: RecordingSink,
}

impl ReportSink for NoGroupSink {
    fn emit_table(&mut self, table: Table) -> Result<(), SinkError> {
        self.inner.emit_table(table)
    }

    fn emit_step(&mut self, status: Verdict, message: &str) -> Result<(), SinkError> {
        self.inner.emit_step(status, message)
    }

    fn emit_diagnostic_group(&mut self, _group: DiagnosticGroup) -> Result<(), SinkError> {
        Err(SinkError::Rejected("groups not supported".into()))
    }
}

/// Sink that rejects everything.
#[derive(Debug, Default)]
pub struct BrokenSink;

impl ReportSink for BrokenSink {
    fn emit_table(&mut self, _table: Table) -> Result<(), SinkError> {
        Err(SinkError::NoActiveReport)
    }

    fn emit_step(&mut self, _status: Verdict, _message: &str) -> Result<(), SinkError> {
        Err(SinkError::NoActiveReport)
    }

    fn emit_diagnostic_group(&mut self, _group: DiagnosticGroup) -> Result<(), SinkError> {
        Err(SinkError::NoActiveReport)
    }
}
