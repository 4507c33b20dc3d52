pub mod parser;
pub mod plan_model;
pub mod runner;
pub mod semantic_validator;
pub mod validator;

pub use parser::{PlanParseError, parse_plan};
pub use plan_model::{DtcCheck, DtcEntry, MutedTroubles, PlanCase, PlanDocument, ResponseCheck};
pub use runner::{CaseOutcome, RunError, run_case};
pub use semantic_validator::{SemanticIssue, Severity, validate_semantics};
pub use validator::{SchemaError, validate_plan_schema};
