//! The 8-bit DTC status byte and its named flags (UDS DTCStatusMask).

use crate::codec::{ANY, CodecError, RawValue, int_to_u32, parse_integer};
use serde::{Serialize, Serializer};
use std::fmt;

/// Flag names, bit 0 first.
pub const STATUS_BIT_NAMES: [&str; 8] = [
    "TestFailed",
    "TestFailedThisOperationCycle",
    "pendingDTC",
    "confirmedDTC",
    "testNotCompletedSinceLastClear",
    "testFailedSinceLastClear",
    "testNotCompletedThisOperationCycle",
    "warningIndicatorRequested",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBit {
    TestFailed = 0,
    TestFailedThisOperationCycle = 1,
    PendingDtc = 2,
    ConfirmedDtc = 3,
    TestNotCompletedSinceLastClear = 4,
    TestFailedSinceLastClear = 5,
    TestNotCompletedThisOperationCycle = 6,
    WarningIndicatorRequested = 7,
}

impl StatusBit {
    pub const ALL: [StatusBit; 8] = [
        StatusBit::TestFailed,
        StatusBit::TestFailedThisOperationCycle,
        StatusBit::PendingDtc,
        StatusBit::ConfirmedDtc,
        StatusBit::TestNotCompletedSinceLastClear,
        StatusBit::TestFailedSinceLastClear,
        StatusBit::TestNotCompletedThisOperationCycle,
        StatusBit::WarningIndicatorRequested,
    ];

    pub fn name(self) -> &'static str {
        STATUS_BIT_NAMES[self as usize]
    }

    pub fn mask(self) -> u8 {
        1 << (self as u8)
    }
}

/// A decoded status byte, or the `any` status.
///
/// `any` compares equal to every status, so equality is not transitive.
#[derive(Debug, Clone, Copy)]
pub struct StatusBitfield {
    value: Option<u8>,
}

impl StatusBitfield {
    pub const ANY: StatusBitfield = StatusBitfield { value: None };

    pub fn from_byte(value: u8) -> Self {
        Self { value: Some(value) }
    }

    /// The raw byte, `None` for `any`.
    pub fn value(&self) -> Option<u8> {
        self.value
    }

    pub fn is_any(&self) -> bool {
        self.value.is_none()
    }

    /// State of one flag; `None` when the status is `any`.
    pub fn flag(&self, bit: StatusBit) -> Option<bool> {
        self.value.map(|v| v & bit.mask() != 0)
    }

    /// All eight flags in bit order.
    pub fn flags(&self) -> impl Iterator<Item = (&'static str, Option<bool>)> + '_ {
        StatusBit::ALL.iter().map(move |&bit| (bit.name(), self.flag(bit)))
    }

    pub fn test_failed(&self) -> Option<bool> {
        self.flag(StatusBit::TestFailed)
    }

    pub fn test_failed_this_operation_cycle(&self) -> Option<bool> {
        self.flag(StatusBit::TestFailedThisOperationCycle)
    }

    pub fn pending_dtc(&self) -> Option<bool> {
        self.flag(StatusBit::PendingDtc)
    }

    pub fn confirmed_dtc(&self) -> Option<bool> {
        self.flag(StatusBit::ConfirmedDtc)
    }

    pub fn test_not_completed_since_last_clear(&self) -> Option<bool> {
        self.flag(StatusBit::TestNotCompletedSinceLastClear)
    }

    pub fn test_failed_since_last_clear(&self) -> Option<bool> {
        self.flag(StatusBit::TestFailedSinceLastClear)
    }

    pub fn test_not_completed_this_operation_cycle(&self) -> Option<bool> {
        self.flag(StatusBit::TestNotCompletedThisOperationCycle)
    }

    pub fn warning_indicator_requested(&self) -> Option<bool> {
        self.flag(StatusBit::WarningIndicatorRequested)
    }
}

impl PartialEq for StatusBitfield {
    fn eq(&self, other: &Self) -> bool {
        match (self.value, other.value) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

impl fmt::Display for StatusBitfield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(v) => write!(f, "0x{v:02x}"),
            None => f.write_str(ANY),
        }
    }
}

impl Serialize for StatusBitfield {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Decode a status value through the integer path. `any` yields
/// [`StatusBitfield::ANY`]; values above `0xFF` are rejected.
pub fn decode_status(input: &RawValue) -> Result<StatusBitfield, CodecError> {
    let n = match input {
        RawValue::Text(text) if text.trim().eq_ignore_ascii_case(ANY) => {
            return Ok(StatusBitfield::ANY);
        }
        RawValue::Text(text) => parse_integer(text)?,
        RawValue::Int(n) => int_to_u32(*n)?,
    };
    u8::try_from(n)
        .map(StatusBitfield::from_byte)
        .map_err(|_| CodecError::StatusOutOfRange(n))
}
