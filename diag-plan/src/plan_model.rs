//! Serde-deserializable types for a DTC/response test plan.
//!
//! A plan names the device under test, the DTCs muted for the whole project
//! and a list of cases. Each case can carry one DTC check and any number of
//! request/response checks.

use diag_eval::{ByteInput, DtcRecord, MutedDtcSource, RawValue, ResponseSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDocument {
    #[serde(default)]
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub dut: BTreeMap<String, String>,
    #[serde(default)]
    pub muted_troubles: Option<MutedTroubles>,
    #[serde(default)]
    pub cases: Vec<PlanCase>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MutedTroubles {
    #[serde(default, rename = "DTC")]
    pub dtc: Vec<RawValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanCase {
    pub name: String,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub dtc_check: Option<DtcCheck>,
    #[serde(default)]
    pub responses: Vec<ResponseCheck>,
}

impl PlanCase {
    pub fn is_empty(&self) -> bool {
        self.dtc_check.is_none() && self.responses.is_empty()
    }
}

// --- DTC check ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DtcCheck {
    /// DTCs read back from the ECU.
    #[serde(default)]
    pub observed: Vec<DtcEntry>,
    #[serde(default)]
    pub allowed: Vec<DtcEntry>,
    #[serde(default)]
    pub expected: Vec<DtcEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DtcEntry {
    pub dtc: RawValue,
    #[serde(default = "any_status")]
    pub status: RawValue,
}

fn any_status() -> RawValue {
    RawValue::from(diag_eval::codec::ANY)
}

// --- Response checks ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseCheck {
    #[serde(default)]
    pub name: Option<String>,
    pub request: ByteInput,
    /// Bytes received; absent or empty means the ECU stayed silent.
    #[serde(default)]
    pub response: ByteInput,
    pub expected: ByteInput,
}

impl ResponseCheck {
    /// `expected` as a `ResponseSpec`. Keywords are only recognised in the
    /// string form; integers and lists are always explicit bytes.
    pub fn expected_spec(&self) -> ResponseSpec {
        match &self.expected {
            ByteInput::Text(text) => ResponseSpec::parse(text),
            other => match other.to_bytes() {
                Ok(bytes) => ResponseSpec::Explicit(bytes),
                Err(e) => ResponseSpec::Unrecognized(e.to_string()),
            },
        }
    }
}

impl MutedDtcSource for PlanDocument {
    fn muted_dtcs(&self) -> Vec<DtcRecord> {
        let Some(muted) = &self.muted_troubles else {
            return Vec::new();
        };
        muted
            .dtc
            .iter()
            .filter_map(|raw| match DtcRecord::muted(raw) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("skipping muted DTC '{raw}': {e}");
                    None
                }
            })
            .collect()
    }
}
