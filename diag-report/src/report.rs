//! In-memory test report: a tree of steps, tables and groups for one test
//! case, with the case status kept up to date as entries are added.

use crate::status::{Status, case_status, group_status, table_status};
use diag_eval::{DiagnosticGroup, ReportSink, SinkError, Table, Verdict};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawBytes {
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpectedBytes {
    pub response: String,
}

/// One line of the report timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "category", rename_all = "UPPERCASE")]
pub enum Entry {
    Step {
        status: Status,
        comment: String,
    },
    Table {
        status: Status,
        comment: String,
        table_idx: usize,
    },
    Group {
        title: String,
        comment: Option<String>,
        status: Status,
        children: Vec<Entry>,
    },
    Diagnostic {
        tx: RawBytes,
        rx: RawBytes,
        expected: ExpectedBytes,
        status: Status,
    },
}

impl Entry {
    pub fn status(&self) -> Status {
        match self {
            Entry::Step { status, .. }
            | Entry::Table { status, .. }
            | Entry::Group { status, .. }
            | Entry::Diagnostic { status, .. } => *status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionRecord {
    pub description: String,
    pub comment: String,
    pub status: Status,
}

#[derive(Debug, Clone)]
struct OpenGroup {
    title: String,
    comment: Option<String>,
    children: Vec<Entry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestReport {
    pub name: String,
    pub goal: Option<String>,
    pub requirements: Vec<String>,
    pub project: Option<String>,
    pub dut: BTreeMap<String, String>,
    lines: Vec<Entry>,
    tables: Vec<Table>,
    status: Status,
    condition: Option<String>,
    #[serde(rename = "conditionComment")]
    condition_comment: Option<String>,
    conditions: Vec<ConditionRecord>,
    #[serde(skip)]
    open_groups: Vec<OpenGroup>,
}

impl TestReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            goal: None,
            requirements: Vec::new(),
            project: None,
            dut: BTreeMap::new(),
            lines: Vec::new(),
            tables: Vec::new(),
            status: Status::None,
            condition: None,
            condition_comment: None,
            conditions: Vec::new(),
            open_groups: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[Entry] {
        &self.lines
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn conditions(&self) -> &[ConditionRecord] {
        &self.conditions
    }

    /// Case status. Entries inside a group that is still open are counted
    /// once the group closes.
    pub fn status(&self) -> Status {
        self.status
    }

    fn push(&mut self, entry: Entry) {
        match self.open_groups.last_mut() {
            Some(group) => group.children.push(entry),
            None => self.lines.push(entry),
        }
        self.status = case_status(&self.lines);
    }

    /// Run `f` with every entry it adds nested under a new group.
    pub fn with_group<R>(
        &mut self,
        title: &str,
        comment: Option<&str>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.open_groups.push(OpenGroup {
            title: title.to_string(),
            comment: comment.map(str::to_string),
            children: Vec::new(),
        });
        let out = f(self);
        if let Some(group) = self.open_groups.pop() {
            let status = group_status(&group.children);
            self.push(Entry::Group {
                title: group.title,
                comment: group.comment,
                status,
                children: group.children,
            });
        }
        out
    }

    pub fn add_step(&mut self, status: Status, comment: &str) {
        self.push(Entry::Step {
            status,
            comment: comment.to_string(),
        });
    }

    /// Store a table and add a timeline entry pointing at it. Returns the
    /// table's status.
    pub fn add_table(&mut self, mut table: Table) -> Status {
        let idx = self.tables.len();
        let status = table_status(&mut table);
        let comment = if table.name.is_empty() {
            format!("Table: Table {}", idx + 1)
        } else {
            format!("Table: {}", table.name)
        };
        self.tables.push(table);
        self.push(Entry::Table {
            status,
            comment,
            table_idx: idx,
        });
        status
    }

    pub fn add_diagnostic_group(&mut self, group: DiagnosticGroup) {
        let status = Status::from(group.status);
        let diagnostic = Entry::Diagnostic {
            tx: RawBytes { raw: group.tx },
            rx: RawBytes { raw: group.rx },
            expected: ExpectedBytes {
                response: group.expected,
            },
            status,
        };
        self.push(Entry::Group {
            title: format!("send diagnostic request {}", group.name),
            comment: None,
            status,
            children: vec![diagnostic],
        });
    }

    /// Record a pass/fail condition as a step and as the report's headline
    /// condition.
    pub fn condition(&mut self, cond: bool, description: &str, comment: &str) {
        let status = if cond { Status::Pass } else { Status::Fail };
        let message = if comment.is_empty() {
            description.to_string()
        } else {
            format!("{description} | Comment: {comment}")
        };
        self.add_step(status, &message);

        self.condition = Some(description.to_string());
        self.condition_comment = Some(comment.to_string());
        self.conditions.push(ConditionRecord {
            description: description.to_string(),
            comment: comment.to_string(),
            status,
        });
    }

    /// `condition` with a `name(actual) == expected` description.
    pub fn expect_equal<T>(&mut self, actual: &T, expected: &T, name: Option<&str>, comment: &str)
    where
        T: PartialEq + Display + ?Sized,
    {
        let description = format!("{}({actual}) == {expected}", name.unwrap_or("value"));
        self.condition(actual == expected, &description, comment);
    }
}

impl ReportSink for TestReport {
    fn emit_table(&mut self, table: Table) -> Result<(), SinkError> {
        self.add_table(table);
        Ok(())
    }

    fn emit_step(&mut self, status: Verdict, message: &str) -> Result<(), SinkError> {
        self.add_step(status.into(), message);
        Ok(())
    }

    fn emit_diagnostic_group(&mut self, group: DiagnosticGroup) -> Result<(), SinkError> {
        self.add_diagnostic_group(group);
        Ok(())
    }
}
