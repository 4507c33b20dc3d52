pub mod report;
pub mod status;
pub mod suite;
pub mod writer;

pub use report::{ConditionRecord, Entry, TestReport};
pub use status::{Status, case_status, group_status, table_status};
pub use suite::{SuiteReport, SuiteStats, SuiteStatus};
pub use writer::{
    ReportWriteError, case_key, write_json, write_json_file, write_suite_json, write_suite_json_file,
};
