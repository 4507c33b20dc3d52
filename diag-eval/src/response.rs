//! Classification of a diagnostic response against the expected outcome.

use crate::codec::{parse_bytes, to_hex_string};
use crate::sink::{DiagnosticGroup, ReportSink, Table, Verdict};
use serde::Serialize;
use std::fmt;

pub const READ_DATA_BY_IDENTIFIER: u8 = 0x22;
pub const READ_DATA_BY_IDENTIFIER_RESPONSE: u8 = 0x62;
pub const NEGATIVE_RESPONSE: u8 = 0x7F;
pub const POSITIVE_RESPONSE_OFFSET: u8 = 0x40;

/// SID plus the two DID bytes in front of a ReadDataByIdentifier payload.
const READ_DATA_HEADER_LEN: usize = 3;

const FALLBACK_COLUMNS: [&str; 5] = ["DID", "Expected", "Actual", "Result", "Reason"];

/// What a response is expected to look like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseSpec {
    /// No response at all.
    NoResponse,
    /// First byte is the request SID + 0x40.
    Positive,
    /// First byte is 0x7F.
    Negative,
    Explicit(Vec<u8>),
    /// `ln(N)`: a 0x62 response carrying exactly N payload bytes. Only valid
    /// for 0x22 requests.
    LengthCheck(usize),
    /// `ln(...)` whose argument is not a length.
    InvalidLength(String),
    Unrecognized(String),
}

impl ResponseSpec {
    /// Parse `none`, `positive`, `negative`, `ln(N)` or a byte token string.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        let lower = trimmed.to_ascii_lowercase();
        match lower.as_str() {
            "none" => return ResponseSpec::NoResponse,
            "positive" => return ResponseSpec::Positive,
            "negative" => return ResponseSpec::Negative,
            _ => {}
        }

        if let Some(inner) = lower.strip_prefix("ln(").and_then(|r| r.strip_suffix(')')) {
            return match inner.trim().parse::<usize>() {
                Ok(n) => ResponseSpec::LengthCheck(n),
                Err(_) => ResponseSpec::InvalidLength(trimmed.to_string()),
            };
        }

        match parse_bytes(trimmed) {
            Ok(bytes) if !bytes.is_empty() => ResponseSpec::Explicit(bytes),
            _ => ResponseSpec::Unrecognized(trimmed.to_string()),
        }
    }

    pub fn response_type(&self) -> ResponseType {
        match self {
            ResponseSpec::NoResponse => ResponseType::None,
            ResponseSpec::Positive => ResponseType::Positive,
            ResponseSpec::Negative => ResponseType::Negative,
            ResponseSpec::Explicit(_) => ResponseType::Explicit,
            ResponseSpec::LengthCheck(_) | ResponseSpec::InvalidLength(_) => ResponseType::Ln,
            ResponseSpec::Unrecognized(_) => ResponseType::Unknown,
        }
    }
}

impl fmt::Display for ResponseSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseSpec::NoResponse => f.write_str("none"),
            ResponseSpec::Positive => f.write_str("positive"),
            ResponseSpec::Negative => f.write_str("negative"),
            ResponseSpec::Explicit(bytes) => f.write_str(&to_hex_string(bytes)),
            ResponseSpec::LengthCheck(n) => write!(f, "ln({n})"),
            ResponseSpec::InvalidLength(raw) | ResponseSpec::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    None,
    Ln,
    Explicit,
    Positive,
    Negative,
    Unknown,
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("expected response {expected}, but received no response")]
    MissingResponse { expected: String },
}

/// Result of one response check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "VerdictRecord")]
pub struct DiagnosticVerdict {
    pub name: String,
    pub request: Vec<u8>,
    pub actual: Vec<u8>,
    pub expected: String,
    pub response_type: ResponseType,
    pub result: Verdict,
    pub reason: Option<String>,
}

#[derive(Serialize)]
struct Frame {
    did: String,
}

/// Serialized shape of a [`DiagnosticVerdict`].
#[derive(Serialize)]
struct VerdictRecord {
    name: String,
    request: Frame,
    response: Frame,
    expected: Frame,
    responsetype: ResponseType,
    result: Verdict,
    reason: Option<String>,
}

impl From<DiagnosticVerdict> for VerdictRecord {
    fn from(v: DiagnosticVerdict) -> Self {
        Self {
            name: v.name,
            request: Frame {
                did: to_hex_string(&v.request),
            },
            response: Frame {
                did: to_hex_string(&v.actual),
            },
            expected: Frame { did: v.expected },
            responsetype: v.response_type,
            result: v.result,
            reason: v.reason,
        }
    }
}

fn check_no_response(actual: &[u8]) -> (Verdict, Option<String>) {
    if actual.is_empty() {
        (Verdict::None, None)
    } else {
        (
            Verdict::Fail,
            Some(format!(
                "Expected no response, received: {}",
                to_hex_string(actual)
            )),
        )
    }
}

fn check_length(request: &[u8], actual: &[u8], n: usize) -> (Verdict, Option<String>) {
    if request.first() != Some(&READ_DATA_BY_IDENTIFIER) {
        return (
            Verdict::Fail,
            Some("ln(N) length check applies only to service 0x22".to_string()),
        );
    }
    let payload_len = actual.len().saturating_sub(READ_DATA_HEADER_LEN);
    if actual.first() == Some(&READ_DATA_BY_IDENTIFIER_RESPONSE) && payload_len == n {
        (Verdict::Pass, None)
    } else {
        (
            Verdict::Fail,
            Some(format!(
                "For service 0x22, expected response[0]==0x62 and len(response[3:])=={n}, got {}",
                to_hex_string(actual)
            )),
        )
    }
}

fn check_explicit(actual: &[u8], expected: &[u8]) -> (Verdict, Option<String>) {
    if actual == expected {
        (Verdict::Pass, None)
    } else {
        (
            Verdict::Fail,
            Some(format!(
                "Expected {} got {}",
                to_hex_string(expected),
                to_hex_string(actual)
            )),
        )
    }
}

fn check_positive(request: &[u8], actual: &[u8]) -> (Verdict, Option<String>) {
    let Some(&sid) = request.first() else {
        return (
            Verdict::Fail,
            Some("Expected positive response, but the request is empty".to_string()),
        );
    };
    // u16: a SID above 0xBF has no positive response byte
    let expected_first = u16::from(sid) + u16::from(POSITIVE_RESPONSE_OFFSET);
    if actual.first().map(|&b| u16::from(b)) == Some(expected_first) {
        (Verdict::Pass, None)
    } else {
        (
            Verdict::Fail,
            Some(format!(
                "Expected positive response (0x{expected_first:02x}), got {}",
                to_hex_string(actual)
            )),
        )
    }
}

fn check_negative(actual: &[u8]) -> (Verdict, Option<String>) {
    if actual.first() == Some(&NEGATIVE_RESPONSE) {
        (Verdict::Pass, None)
    } else {
        (
            Verdict::Fail,
            Some(format!(
                "Expected negative response (0x7f), got {}",
                to_hex_string(actual)
            )),
        )
    }
}

/// Classify `actual` against `expected` without reporting.
///
/// An empty response when one was expected is an error, not a failed verdict.
pub fn evaluate_response(
    request: &[u8],
    actual: &[u8],
    expected: &ResponseSpec,
) -> Result<(Verdict, Option<String>), ClassifyError> {
    if *expected != ResponseSpec::NoResponse && actual.is_empty() {
        return Err(ClassifyError::MissingResponse {
            expected: expected.to_string(),
        });
    }

    Ok(match expected {
        ResponseSpec::NoResponse => check_no_response(actual),
        ResponseSpec::LengthCheck(n) => check_length(request, actual, *n),
        ResponseSpec::Explicit(bytes) => check_explicit(actual, bytes),
        ResponseSpec::Positive => check_positive(request, actual),
        ResponseSpec::Negative => check_negative(actual),
        ResponseSpec::InvalidLength(raw) => (
            Verdict::Fail,
            Some(format!("Invalid ln(N) format: {raw}")),
        ),
        ResponseSpec::Unrecognized(raw) => (
            Verdict::Fail,
            Some(format!("Unknown expected response format: {raw}")),
        ),
    })
}

fn report_verdict<S: ReportSink + ?Sized>(verdict: &DiagnosticVerdict, sink: &mut S) {
    let request = to_hex_string(&verdict.request);
    let actual = to_hex_string(&verdict.actual);

    let group = DiagnosticGroup {
        name: verdict.name.clone(),
        tx: request.clone(),
        rx: actual.clone(),
        expected: verdict.expected.clone(),
        status: verdict.result,
    };
    let Err(e) = sink.emit_diagnostic_group(group) else {
        return;
    };
    log::warn!(
        "diagnostic group for '{}' not accepted ({e}), reporting as table",
        verdict.name
    );

    let mut table = Table::new(
        format!("Diagnostic Response Check for DID {request}"),
        &FALLBACK_COLUMNS,
        false,
    );
    table.data.push(vec![
        request.clone(),
        verdict.expected.clone(),
        actual,
        verdict.result.to_string(),
        verdict.reason.clone().unwrap_or_default(),
    ]);
    let message = format!("Diagnostic response check for {request}: {}", verdict.result);
    if let Err(e) = sink
        .emit_table(table)
        .and_then(|()| sink.emit_step(verdict.result, &message))
    {
        log::error!("could not report response check '{}': {e}", verdict.name);
    }
}

/// Classify a response and report it to `sink`.
///
/// Reporting never changes the returned verdict: if the sink rejects the
/// diagnostic group a collapsed table is emitted instead, and if that fails
/// too the failure is only logged.
pub fn classify<S: ReportSink + ?Sized>(
    name: Option<&str>,
    request: &[u8],
    actual: &[u8],
    expected: &ResponseSpec,
    sink: &mut S,
) -> Result<DiagnosticVerdict, ClassifyError> {
    let (result, reason) = evaluate_response(request, actual, expected)?;

    let verdict = DiagnosticVerdict {
        name: name.map_or_else(|| to_hex_string(request), str::to_string),
        request: request.to_vec(),
        actual: actual.to_vec(),
        expected: expected.to_string(),
        response_type: expected.response_type(),
        result,
        reason,
    };
    log::debug!(
        "response check '{}': {} ({:?})",
        verdict.name,
        verdict.result,
        verdict.response_type
    );

    report_verdict(&verdict, sink);
    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_check_short_response_counts_zero_payload() {
        assert_eq!(check_length(&[0x22], &[0x62], 0).0, Verdict::Pass);
        assert_eq!(check_length(&[0x22], &[0x62, 0xF1], 1).0, Verdict::Fail);
    }

    #[test]
    fn test_positive_does_not_wrap() {
        // 0xC0 + 0x40 would wrap to 0x00 in u8
        assert_eq!(check_positive(&[0xC0], &[0x00]).0, Verdict::Fail);
    }

    #[test]
    fn test_positive_with_empty_request_fails() {
        let (result, reason) = check_positive(&[], &[0x50]);
        assert_eq!(result, Verdict::Fail);
        assert!(reason.unwrap().contains("request is empty"));
    }
}
