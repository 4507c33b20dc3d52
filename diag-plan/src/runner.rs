//! Executes one plan case against a report sink.

use crate::plan_model::{DtcEntry, PlanCase};
use diag_eval::{
    ClassifyError, CodecError, DiagnosticVerdict, DtcEvalError, DtcEvaluation, DtcRecord,
    MutedDtcSource, ReportSink, Verdict, classify, evaluate_dtc_block,
};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("invalid value at {path}: {source}")]
    Input { path: String, source: CodecError },
    #[error("DTC evaluation failed: {0}")]
    Dtc(#[from] DtcEvalError),
    #[error("response check failed: {0}")]
    Classify(#[from] ClassifyError),
}

/// Everything a case produced, in execution order.
#[derive(Debug, Clone, Default)]
pub struct CaseOutcome {
    pub dtc: Option<DtcEvaluation>,
    pub responses: Vec<DiagnosticVerdict>,
}

impl CaseOutcome {
    /// `FAIL` if any check failed, `PASS` if any passed, otherwise `NONE`.
    pub fn verdict(&self) -> Verdict {
        let verdicts = self
            .dtc
            .iter()
            .map(|d| d.verdict)
            .chain(self.responses.iter().map(|r| r.result));
        let mut any_pass = false;
        for v in verdicts {
            match v {
                Verdict::Fail => return Verdict::Fail,
                Verdict::Pass => any_pass = true,
                Verdict::None => {}
            }
        }
        if any_pass { Verdict::Pass } else { Verdict::None }
    }
}

fn decode_entries<F>(entries: &[DtcEntry], path: &str, decode: F) -> Result<Vec<DtcRecord>, RunError>
where
    F: Fn(&DtcEntry) -> Result<DtcRecord, CodecError>,
{
    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            decode(entry).map_err(|source| RunError::Input {
                path: format!("{path}/{idx}"),
                source,
            })
        })
        .collect()
}

/// Run the DTC check and then every response check of `case`, reporting to
/// `sink`. Input errors are raised before anything is reported for the
/// affected check.
pub fn run_case<M, S>(case: &PlanCase, muted: &M, sink: &mut S) -> Result<CaseOutcome, RunError>
where
    M: MutedDtcSource + ?Sized,
    S: ReportSink + ?Sized,
{
    let mut outcome = CaseOutcome::default();

    if let Some(check) = &case.dtc_check {
        let observed = decode_entries(&check.observed, "dtc_check/observed", |e| {
            DtcRecord::observed(&e.dtc, &e.status)
        })?;
        let allowed = decode_entries(&check.allowed, "dtc_check/allowed", |e| {
            DtcRecord::rule(&e.dtc, &e.status)
        })?;
        let expected = decode_entries(&check.expected, "dtc_check/expected", |e| {
            DtcRecord::rule(&e.dtc, &e.status)
        })?;
        outcome.dtc = Some(evaluate_dtc_block(&observed, allowed, expected, muted, sink)?);
    }

    for (idx, check) in case.responses.iter().enumerate() {
        let input = |field: &str, result: Result<Vec<u8>, CodecError>| {
            result.map_err(|source| RunError::Input {
                path: format!("responses/{idx}/{field}"),
                source,
            })
        };
        let request = input("request", check.request.to_bytes())?;
        let actual = input("response", check.response.to_bytes())?;
        let expected = check.expected_spec();

        let verdict = classify(check.name.as_deref(), &request, &actual, &expected, sink)?;
        outcome.responses.push(verdict);
    }

    log::info!(
        "case '{}': {} ({} response check(s))",
        case.name,
        outcome.verdict(),
        outcome.responses.len()
    );
    Ok(outcome)
}
