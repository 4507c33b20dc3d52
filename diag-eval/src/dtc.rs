//! DTC rule matching.
//!
//! Every observed DTC is looked up in the allowed, muted and expected rules
//! (in that order, first matching rule wins) and its status is compared with
//! the rule status. Expected rules that no observed DTC satisfied produce an
//! extra failing row.

use crate::codec::{
    CodecError, DtcCode, NumericToken, RawValue, decode_numeric, format_status_hex,
};
use crate::sink::{ReportSink, SinkError, Table, Verdict};
use crate::status::{StatusBitfield, decode_status};
use serde::Serialize;
use std::fmt;

pub const RULE_SUMMARY_TABLE: &str = "DTC Rule Summary";
pub const RULE_SUMMARY_COLUMNS: [&str; 3] = ["Type", "DTC", "Status"];
pub const COMPREHENSIVE_TABLE: &str = "DTC Comprehensive Evaluation";
pub const COMPREHENSIVE_COLUMNS: [&str; 6] = [
    "DTC",
    "Status",
    "Present/Not present",
    "Type",
    "DTC+Status",
    "Result",
];

#[derive(Debug, thiserror::Error)]
pub enum DtcEvalError {
    #[error("report sink failed: {0}")]
    Sink(#[from] SinkError),
}

/// A status as used for matching, with its display form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusValue {
    token: NumericToken,
    text: String,
}

impl StatusValue {
    pub fn any() -> Self {
        Self {
            token: NumericToken::Any,
            text: crate::codec::ANY.to_string(),
        }
    }

    pub fn token(&self) -> &NumericToken {
        &self.token
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for StatusValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A DTC code with a status, either observed on the DUT or declared as a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DtcRecord {
    code: DtcCode,
    status: StatusValue,
}

impl DtcRecord {
    /// A DTC read from the DUT. The status must be a concrete byte or `any`.
    pub fn observed(code: &RawValue, status: &RawValue) -> Result<Self, CodecError> {
        let bitfield = decode_status(status)?;
        let token = match bitfield.value() {
            Some(b) => NumericToken::Exact(u32::from(b)),
            None => NumericToken::Any,
        };
        Ok(Self {
            code: DtcCode::parse(code)?,
            status: StatusValue {
                token,
                text: bitfield.to_string(),
            },
        })
    }

    /// A DTC as delivered by telemetry.
    pub fn from_telemetry(code: u32, status: u8) -> Self {
        Self {
            code: DtcCode::from_value(code),
            status: StatusValue {
                token: NumericToken::Exact(u32::from(status)),
                text: format!("0x{status:02x}"),
            },
        }
    }

    /// A configured rule. The status may be exact, `any` or a bit pattern.
    pub fn rule(code: &RawValue, status: &RawValue) -> Result<Self, CodecError> {
        Ok(Self {
            code: DtcCode::parse(code)?,
            status: StatusValue {
                token: decode_numeric(status)?,
                text: format_status_hex(status)?,
            },
        })
    }

    /// A muted rule: code only, any status.
    pub fn muted(code: &RawValue) -> Result<Self, CodecError> {
        Ok(Self {
            code: DtcCode::parse(code)?,
            status: StatusValue::any(),
        })
    }

    pub fn code(&self) -> &DtcCode {
        &self.code
    }

    pub fn status(&self) -> &StatusValue {
        &self.status
    }

    /// `code+status` as shown in the comprehensive table.
    pub fn label(&self) -> String {
        format!("{}+{}", self.code, self.status)
    }
}

impl fmt::Display for DtcRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DTC(code={}, status={})", self.code, self.status)
    }
}

/// Source of the DTCs muted by configuration.
pub trait MutedDtcSource {
    fn muted_dtcs(&self) -> Vec<DtcRecord>;
}

impl MutedDtcSource for [DtcRecord] {
    fn muted_dtcs(&self) -> Vec<DtcRecord> {
        self.to_vec()
    }
}

impl MutedDtcSource for Vec<DtcRecord> {
    fn muted_dtcs(&self) -> Vec<DtcRecord> {
        self.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RuleKind {
    Allowed,
    Muted,
    Expected,
}

impl RuleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::Allowed => "Allowed",
            RuleKind::Muted => "Muted",
            RuleKind::Expected => "Expected",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    pub allowed: Vec<DtcRecord>,
    pub muted: Vec<DtcRecord>,
    pub expected: Vec<DtcRecord>,
}

impl RuleSet {
    pub fn new(allowed: Vec<DtcRecord>, expected: Vec<DtcRecord>) -> Self {
        Self {
            allowed,
            muted: Vec::new(),
            expected,
        }
    }

    pub fn with_muted(mut self, muted: Vec<DtcRecord>) -> Self {
        self.muted = muted;
        self
    }

    /// Rule categories in lookup order.
    pub fn categories(&self) -> [(RuleKind, &[DtcRecord]); 3] {
        [
            (RuleKind::Allowed, self.allowed.as_slice()),
            (RuleKind::Muted, self.muted.as_slice()),
            (RuleKind::Expected, self.expected.as_slice()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Presence {
    Present,
    NotPresent,
}

impl Presence {
    pub fn as_str(self) -> &'static str {
        match self {
            Presence::Present => "Present",
            Presence::NotPresent => "Not Present",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowType {
    Allowed,
    Muted,
    Expected,
    Unexpected,
}

impl RowType {
    pub fn as_str(self) -> &'static str {
        match self {
            RowType::Allowed => "Allowed",
            RowType::Muted => "Muted",
            RowType::Expected => "Expected",
            RowType::Unexpected => "Unexpected",
        }
    }
}

impl From<RuleKind> for RowType {
    fn from(kind: RuleKind) -> Self {
        match kind {
            RuleKind::Allowed => RowType::Allowed,
            RuleKind::Muted => RowType::Muted,
            RuleKind::Expected => RowType::Expected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DtcEvaluationRow {
    pub code: String,
    pub status: String,
    pub presence: Presence,
    pub rule_type: RowType,
    pub matched_rule: Option<String>,
    pub result: Verdict,
}

impl DtcEvaluationRow {
    fn cells(&self) -> Vec<String> {
        vec![
            self.code.clone(),
            self.status.clone(),
            self.presence.as_str().to_string(),
            self.rule_type.as_str().to_string(),
            self.matched_rule.clone().unwrap_or_default(),
            self.result.label().to_string(),
        ]
    }
}

/// An observed DTC with its decoded status flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dtc {
    pub code: DtcCode,
    pub status: StatusBitfield,
}

impl TryFrom<&DtcRecord> for Dtc {
    type Error = CodecError;

    fn try_from(record: &DtcRecord) -> Result<Self, Self::Error> {
        let status = match record.status.token() {
            NumericToken::Exact(n) => u8::try_from(*n)
                .map(StatusBitfield::from_byte)
                .map_err(|_| CodecError::StatusOutOfRange(*n))?,
            NumericToken::Any => StatusBitfield::ANY,
            NumericToken::BitPattern(p) => return Err(CodecError::NotConcrete(p.clone())),
        };
        Ok(Self {
            code: record.code.clone(),
            status,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DtcEvaluation {
    pub rows: Vec<DtcEvaluationRow>,
    pub verdict: Verdict,
    pub observed: Vec<Dtc>,
}

/// Match `value` against a `{0,1,*}` pattern, both left-padded with zeros to
/// the longer length.
fn pattern_matches(value: u32, pattern: &str) -> bool {
    let bits = format!("{value:b}");
    let width = bits.len().max(pattern.len());
    let bits = format!("{bits:0>width$}");
    let pattern = format!("{pattern:0>width$}");
    bits.chars()
        .zip(pattern.chars())
        .all(|(b, p)| p == '*' || b == p)
}

/// Compare an observed status with a rule status. Combinations that cannot be
/// compared count as a mismatch.
fn status_matches(observed: &StatusValue, rule: &StatusValue) -> bool {
    match (observed.token(), rule.token()) {
        (_, NumericToken::Any) => true,
        (NumericToken::Exact(n), NumericToken::BitPattern(p)) => pattern_matches(*n, p),
        (NumericToken::Exact(n), NumericToken::Exact(r)) => n == r,
        (o, r) => {
            log::warn!(
                "cannot compare observed status '{o}' with rule status '{r}', treating as mismatch"
            );
            false
        }
    }
}

fn classify_status(kind: RuleKind, matched: bool) -> Verdict {
    match (kind, matched) {
        (_, false) => Verdict::Fail,
        (RuleKind::Expected, true) => Verdict::Pass,
        (RuleKind::Allowed | RuleKind::Muted, true) => Verdict::None,
    }
}

/// Classify observed DTCs against the rule set, without reporting.
pub fn match_dtcs(observed: &[DtcRecord], rules: &RuleSet) -> Vec<DtcEvaluationRow> {
    let mut rows = Vec::with_capacity(observed.len() + rules.expected.len());
    let mut expected_found = vec![false; rules.expected.len()];

    for dut in observed {
        let hit = rules.categories().into_iter().find_map(|(kind, list)| {
            list.iter()
                .find(|rule| rule.code == dut.code)
                .map(|rule| (kind, rule))
        });

        let Some((kind, rule)) = hit else {
            log::debug!("{dut}: no rule, unexpected");
            rows.push(DtcEvaluationRow {
                code: dut.code.to_string(),
                status: dut.status.to_string(),
                presence: Presence::Present,
                rule_type: RowType::Unexpected,
                matched_rule: None,
                result: Verdict::Fail,
            });
            continue;
        };

        let result = classify_status(kind, status_matches(&dut.status, &rule.status));
        log::debug!("{dut}: {} rule {} -> {result}", kind.as_str(), rule.label());

        if kind == RuleKind::Expected {
            for (found, ex) in expected_found.iter_mut().zip(&rules.expected) {
                if ex.code == dut.code {
                    *found = true;
                }
            }
        }

        rows.push(DtcEvaluationRow {
            code: dut.code.to_string(),
            status: dut.status.to_string(),
            presence: Presence::Present,
            rule_type: kind.into(),
            matched_rule: Some(rule.label()),
            result,
        });
    }

    for (ex, found) in rules.expected.iter().zip(expected_found) {
        if !found {
            log::debug!("{ex}: expected but not present");
            rows.push(DtcEvaluationRow {
                code: ex.code.to_string(),
                status: ex.status.to_string(),
                presence: Presence::NotPresent,
                rule_type: RowType::Expected,
                matched_rule: Some(ex.label()),
                result: Verdict::Fail,
            });
        }
    }

    rows
}

pub fn build_rule_summary_table(rules: &RuleSet) -> Table {
    let mut table = Table::new(RULE_SUMMARY_TABLE, &RULE_SUMMARY_COLUMNS, true);
    let ordered = [
        (RuleKind::Allowed, &rules.allowed),
        (RuleKind::Expected, &rules.expected),
        (RuleKind::Muted, &rules.muted),
    ];
    for (kind, list) in ordered {
        for rule in list {
            table.data.push(vec![
                kind.as_str().to_string(),
                rule.code.to_string(),
                rule.status.to_string(),
            ]);
        }
    }
    table
}

pub fn build_comprehensive_table(rows: &[DtcEvaluationRow]) -> Table {
    let mut table = Table::new(COMPREHENSIVE_TABLE, &COMPREHENSIVE_COLUMNS, true);
    table.data = rows.iter().map(DtcEvaluationRow::cells).collect();
    table
}

/// Observed record with its status flags. A status that is not a concrete
/// byte only loses the flags; the record is still matched.
fn decode_observed(record: &DtcRecord) -> Option<Dtc> {
    match Dtc::try_from(record) {
        Ok(dtc) => Some(dtc),
        Err(e) => {
            log::warn!("{record}: status has no flags ({e})");
            None
        }
    }
}

/// Evaluate observed DTCs against `rules` and report the rule summary, the
/// comprehensive table and the overall status to `sink`.
///
/// The rule summary is emitted first. An empty observation always passes;
/// missing expected DTCs are only reported when at least one DTC was
/// observed.
pub fn evaluate<S: ReportSink + ?Sized>(
    observed: &[DtcRecord],
    rules: &RuleSet,
    sink: &mut S,
) -> Result<DtcEvaluation, DtcEvalError> {
    sink.emit_table(build_rule_summary_table(rules))?;

    let rows = if observed.is_empty() {
        Vec::new()
    } else {
        match_dtcs(observed, rules)
    };

    let verdict = if rows.iter().any(|r| r.result == Verdict::Fail) {
        Verdict::Fail
    } else {
        Verdict::Pass
    };

    let decoded = observed.iter().filter_map(decode_observed).collect();

    sink.emit_table(build_comprehensive_table(&rows))?;
    sink.emit_step(verdict, &format!("DTC evaluation overall status: {verdict}"))?;

    log::info!(
        "DTC evaluation: observed={}, rows={}, verdict={verdict}",
        observed.len(),
        rows.len()
    );

    Ok(DtcEvaluation {
        rows,
        verdict,
        observed: decoded,
    })
}

/// Evaluate a DTC block with the muted rules taken from configuration.
pub fn evaluate_dtc_block<M, S>(
    observed: &[DtcRecord],
    allowed: Vec<DtcRecord>,
    expected: Vec<DtcRecord>,
    muted: &M,
    sink: &mut S,
) -> Result<DtcEvaluation, DtcEvalError>
where
    M: MutedDtcSource + ?Sized,
    S: ReportSink + ?Sized,
{
    let rules = RuleSet::new(allowed, expected).with_muted(muted.muted_dtcs());
    evaluate(observed, &rules, sink)
}
