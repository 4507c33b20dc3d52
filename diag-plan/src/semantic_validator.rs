use crate::plan_model::{DtcEntry, PlanCase, PlanDocument};
use diag_eval::{DtcRecord, ResponseSpec, decode_code, decode_status};
use std::collections::{BTreeMap, BTreeSet};

const READ_DATA_BY_IDENTIFIER: u8 = 0x22;

/// Severity of a semantic validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A semantic validation finding.
#[derive(Debug, Clone)]
pub struct SemanticIssue {
    pub severity: Severity,
    pub path: String,
    pub message: String,
}

impl SemanticIssue {
    fn error(path: String, message: String) -> Self {
        Self {
            severity: Severity::Error,
            path,
            message,
        }
    }

    fn warning(path: String, message: String) -> Self {
        Self {
            severity: Severity::Warning,
            path,
            message,
        }
    }
}

impl std::fmt::Display for SemanticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        if self.path.is_empty() {
            write!(f, "{prefix}: {}", self.message)
        } else {
            write!(f, "{prefix}: {}: {}", self.path, self.message)
        }
    }
}

/// Run all semantic validations on a parsed plan.
///
/// Returns a list of issues (errors and warnings). Empty means valid.
pub fn validate_semantics(doc: &PlanDocument) -> Vec<SemanticIssue> {
    let mut issues = Vec::new();

    validate_case_name_uniqueness(doc, &mut issues);
    validate_muted_codes(doc, &mut issues);
    for case in &doc.cases {
        let path = format!("cases/{}", case.name);
        if case.is_empty() {
            issues.push(SemanticIssue::warning(
                path.clone(),
                "case has neither a DTC check nor response checks".into(),
            ));
        }
        validate_dtc_check(case, &path, &mut issues);
        validate_responses(case, &path, &mut issues);
    }

    issues
}

fn validate_case_name_uniqueness(doc: &PlanDocument, issues: &mut Vec<SemanticIssue>) {
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for (idx, case) in doc.cases.iter().enumerate() {
        if let Some(prev) = seen.get(case.name.as_str()) {
            issues.push(SemanticIssue::error(
                format!("cases/{idx}/name"),
                format!("duplicate case name '{}' (already used by case {prev})", case.name),
            ));
        } else {
            seen.insert(&case.name, idx);
        }
    }
}

fn validate_muted_codes(doc: &PlanDocument, issues: &mut Vec<SemanticIssue>) {
    let Some(muted) = &doc.muted_troubles else {
        return;
    };
    for (idx, raw) in muted.dtc.iter().enumerate() {
        if let Err(e) = decode_code(raw) {
            issues.push(SemanticIssue::error(
                format!("muted_troubles/DTC/{idx}"),
                e.to_string(),
            ));
        }
    }
}

fn validate_dtc_check(case: &PlanCase, path: &str, issues: &mut Vec<SemanticIssue>) {
    let Some(check) = &case.dtc_check else {
        return;
    };

    for (idx, entry) in check.observed.iter().enumerate() {
        let entry_path = format!("{path}/dtc_check/observed/{idx}");
        if let Err(e) = decode_code(&entry.dtc) {
            issues.push(SemanticIssue::error(entry_path.clone(), e.to_string()));
        }
        match decode_status(&entry.status) {
            Ok(status) if status.is_any() => issues.push(SemanticIssue::error(
                entry_path,
                "observed status must be a concrete value, not 'any'".into(),
            )),
            Ok(_) => {}
            Err(e) => issues.push(SemanticIssue::error(entry_path, e.to_string())),
        }
    }

    let allowed = rule_codes(&check.allowed, &format!("{path}/dtc_check/allowed"), issues);
    let expected = rule_codes(&check.expected, &format!("{path}/dtc_check/expected"), issues);

    for code in allowed.intersection(&expected) {
        issues.push(SemanticIssue::warning(
            format!("{path}/dtc_check"),
            format!(
                "DTC {} is both allowed and expected; the allowed rule shadows the expected one",
                diag_eval::codec::format_code_value(*code)
            ),
        ));
    }
}

/// Decode each rule entry, reporting failures, and return the decoded codes.
fn rule_codes(entries: &[DtcEntry], path: &str, issues: &mut Vec<SemanticIssue>) -> BTreeSet<u32> {
    let mut codes = BTreeSet::new();
    for (idx, entry) in entries.iter().enumerate() {
        match DtcRecord::rule(&entry.dtc, &entry.status) {
            Ok(record) => {
                codes.insert(record.code().value());
            }
            Err(e) => issues.push(SemanticIssue::error(format!("{path}/{idx}"), e.to_string())),
        }
    }
    codes
}

fn validate_responses(case: &PlanCase, path: &str, issues: &mut Vec<SemanticIssue>) {
    for (idx, check) in case.responses.iter().enumerate() {
        let check_path = format!("{path}/responses/{idx}");

        let request = match check.request.to_bytes() {
            Ok(bytes) if bytes.is_empty() => {
                issues.push(SemanticIssue::error(
                    format!("{check_path}/request"),
                    "request is empty".into(),
                ));
                None
            }
            Ok(bytes) => Some(bytes),
            Err(e) => {
                issues.push(SemanticIssue::error(format!("{check_path}/request"), e.to_string()));
                None
            }
        };
        if let Err(e) = check.response.to_bytes() {
            issues.push(SemanticIssue::error(format!("{check_path}/response"), e.to_string()));
        }

        match check.expected_spec() {
            ResponseSpec::Unrecognized(text) => issues.push(SemanticIssue::warning(
                format!("{check_path}/expected"),
                format!("unrecognized expected response '{text}' always fails"),
            )),
            ResponseSpec::InvalidLength(text) => issues.push(SemanticIssue::warning(
                format!("{check_path}/expected"),
                format!("'{text}' is not a valid ln(N) length and always fails"),
            )),
            ResponseSpec::LengthCheck(_) => {
                if let Some(first) = request.as_deref().and_then(<[u8]>::first) {
                    if *first != READ_DATA_BY_IDENTIFIER {
                        issues.push(SemanticIssue::warning(
                            format!("{check_path}/expected"),
                            format!(
                                "ln(N) only applies to 0x22 requests, request starts with 0x{first:02x}"
                            ),
                        ));
                    }
                }
            }
            _ => {}
        }
    }
}
