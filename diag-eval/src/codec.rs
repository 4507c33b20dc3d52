//! Numeric decoding and hexadecimal formatting for DTC codes, status bytes
//! and diagnostic payloads.
//!
//! Values reach the engine as plain integers, `0x`/`0b` literals, decimal
//! strings, wildcard bit patterns or the sentinel `any`. Every comparison in
//! this crate works on the decoded form produced here, never on the raw input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Sentinel that matches every status.
pub const ANY: &str = "any";

/// Largest code still printed with the default width.
const DEFAULT_CODE_MAX: u32 = 0xF_FFFF;
const DEFAULT_CODE_WIDTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("empty numeric literal")]
    Empty,
    #[error("invalid numeric literal '{0}'")]
    InvalidLiteral(String),
    #[error("value '{0}' does not fit in 32 bits")]
    Overflow(String),
    #[error("'{0}' is not allowed as a DTC code")]
    WildcardCode(String),
    #[error("status value {0:#x} does not fit in one byte")]
    StatusOutOfRange(u32),
    #[error("status '{0}' is a pattern, not a concrete value")]
    NotConcrete(String),
    #[error("byte token '{0}' is out of range 0..=255")]
    ByteOutOfRange(String),
}

/// A value as written in configuration or handed over by telemetry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Int(u64),
    Text(String),
}

impl From<u8> for RawValue {
    fn from(v: u8) -> Self {
        RawValue::Int(u64::from(v))
    }
}

impl From<u32> for RawValue {
    fn from(v: u32) -> Self {
        RawValue::Int(u64::from(v))
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Int(n) => write!(f, "{n}"),
            RawValue::Text(s) => f.write_str(s),
        }
    }
}

/// Decoded form of a numeric input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NumericToken {
    Exact(u32),
    /// Matches every value.
    Any,
    /// String over `{0,1,*}`, compared MSB-aligned; `*` matches either bit.
    BitPattern(String),
}

impl NumericToken {
    pub fn as_exact(&self) -> Option<u32> {
        match self {
            NumericToken::Exact(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, NumericToken::Any)
    }
}

impl fmt::Display for NumericToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericToken::Exact(n) => write!(f, "0x{n:02x}"),
            NumericToken::Any => f.write_str(ANY),
            NumericToken::BitPattern(p) => f.write_str(p),
        }
    }
}

fn is_bit_pattern(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| matches!(c, '0' | '1' | '*'))
}

pub(crate) fn int_to_u32(n: u64) -> Result<u32, CodecError> {
    u32::try_from(n).map_err(|_| CodecError::Overflow(n.to_string()))
}

fn parse_radix(digits: &str, radix: u32, original: &str) -> Result<u64, CodecError> {
    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_digit(radix)) {
        return Err(CodecError::InvalidLiteral(original.trim().to_string()));
    }
    u64::from_str_radix(&cleaned, radix)
        .map_err(|_| CodecError::Overflow(original.trim().to_string()))
}

/// Parse an integer literal: `0x` hex, `0b` binary, otherwise decimal with a
/// hex fallback (`f0f0f`). `_` separators are ignored.
pub fn parse_integer(text: &str) -> Result<u32, CodecError> {
    let s = text.trim().to_ascii_lowercase();
    if s.is_empty() {
        return Err(CodecError::Empty);
    }

    let value = if let Some(hex) = s.strip_prefix("0x") {
        parse_radix(hex, 16, text)?
    } else if let Some(bin) = s.strip_prefix("0b") {
        parse_radix(bin, 2, text)?
    } else {
        match parse_radix(&s, 10, text) {
            Ok(n) => n,
            Err(CodecError::InvalidLiteral(_)) => parse_radix(&s, 16, text)?,
            Err(e) => return Err(e),
        }
    };

    u32::try_from(value).map_err(|_| CodecError::Overflow(text.trim().to_string()))
}

/// Decode any numeric input into a [`NumericToken`].
pub fn decode_numeric(input: &RawValue) -> Result<NumericToken, CodecError> {
    match input {
        RawValue::Int(n) => int_to_u32(*n).map(NumericToken::Exact),
        RawValue::Text(text) => {
            let s = text.trim().to_ascii_lowercase();
            if s == ANY {
                Ok(NumericToken::Any)
            } else if is_bit_pattern(&s) {
                Ok(NumericToken::BitPattern(s))
            } else {
                parse_integer(&s).map(NumericToken::Exact)
            }
        }
    }
}

/// Decode a DTC code. Codes are always concrete integers.
pub fn decode_code(input: &RawValue) -> Result<u32, CodecError> {
    match input {
        RawValue::Int(n) => int_to_u32(*n),
        RawValue::Text(text) => {
            let s = text.trim().to_ascii_lowercase();
            if s == ANY || s.contains('*') {
                return Err(CodecError::WildcardCode(text.trim().to_string()));
            }
            parse_integer(&s)
        }
    }
}

/// Hex digits of a `0x` literal with separators removed, kept at their
/// written width.
fn literal_hex_digits(hex: &str, original: &str) -> Result<String, CodecError> {
    let digits: String = hex.chars().filter(|&c| c != '_').collect();
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CodecError::InvalidLiteral(original.trim().to_string()));
    }
    Ok(digits)
}

/// Format a code value with the default width of five digits, growing only
/// when the value needs more.
pub fn format_code_value(n: u32) -> String {
    if n <= DEFAULT_CODE_MAX {
        format!("0x{n:0width$x}", width = DEFAULT_CODE_WIDTH)
    } else {
        format!("0x{n:x}")
    }
}

/// Format a DTC code for reporting.
///
/// A `0x` string keeps its written digit count (`"0x0A"` stays `"0x0a"`);
/// every other form is printed with [`format_code_value`].
pub fn format_dtc_code(input: &RawValue) -> Result<String, CodecError> {
    let n = match input {
        RawValue::Int(n) => int_to_u32(*n)?,
        RawValue::Text(text) => {
            let s = text.trim().to_ascii_lowercase();
            if s == ANY || s.contains('*') {
                return Err(CodecError::WildcardCode(text.trim().to_string()));
            }
            if let Some(hex) = s.strip_prefix("0x") {
                let digits = literal_hex_digits(hex, text)?;
                if digits.is_empty() {
                    return Ok("0x00".to_string());
                }
                return Ok(format!("0x{digits}"));
            }
            parse_integer(&s)?
        }
    };
    Ok(format_code_value(n))
}

/// Format a status value for reporting: at least two hex digits, `any` and
/// wildcard patterns unchanged.
pub fn format_status_hex(input: &RawValue) -> Result<String, CodecError> {
    match input {
        RawValue::Int(n) => Ok(format!("0x{:02x}", int_to_u32(*n)?)),
        RawValue::Text(text) => {
            let s = text.trim().to_ascii_lowercase();
            if s == ANY {
                return Ok(ANY.to_string());
            }
            if let Some(hex) = s.strip_prefix("0x") {
                let digits = literal_hex_digits(hex, text)?;
                return Ok(match digits.len() {
                    0 => "0x00".to_string(),
                    1 => format!("0x0{digits}"),
                    _ => format!("0x{digits}"),
                });
            }
            if s.starts_with("0b") {
                return Ok(format!("0x{:02x}", parse_integer(&s)?));
            }
            if is_bit_pattern(&s) {
                return Ok(s);
            }
            Ok(format!("0x{:02x}", parse_integer(&s)?))
        }
    }
}

/// A DTC code: the integer used for matching plus its canonical text.
///
/// Equality and hashing only look at the value, so `0x0101` and `257` are
/// the same code even though they print differently.
#[derive(Debug, Clone, Serialize)]
#[serde(into = "String")]
pub struct DtcCode {
    value: u32,
    text: String,
}

impl DtcCode {
    pub fn parse(input: &RawValue) -> Result<Self, CodecError> {
        Ok(Self {
            value: decode_code(input)?,
            text: format_dtc_code(input)?,
        })
    }

    pub fn from_value(value: u32) -> Self {
        Self {
            value,
            text: format_code_value(value),
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl PartialEq for DtcCode {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for DtcCode {}

impl Hash for DtcCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl fmt::Display for DtcCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<DtcCode> for String {
    fn from(code: DtcCode) -> Self {
        code.text
    }
}

fn parse_byte_token(token: &str) -> Result<u8, CodecError> {
    let t = token.trim().to_ascii_lowercase();
    let value = match t.strip_prefix("0x") {
        Some(hex) => parse_radix(hex, 16, token)?,
        None => parse_radix(&t, 10, token)?,
    };
    u8::try_from(value).map_err(|_| CodecError::ByteOutOfRange(token.trim().to_string()))
}

/// Split a whitespace- or comma-delimited token string into bytes.
///
/// `0x` tokens are hex, everything else is decimal.
pub fn parse_bytes(text: &str) -> Result<Vec<u8>, CodecError> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(parse_byte_token)
        .collect()
}

/// Render bytes as `0x..` tokens separated by spaces.
pub fn to_hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Bytes from a list of integers and byte tokens.
pub fn bytes_from_values(values: &[RawValue]) -> Result<Vec<u8>, CodecError> {
    values
        .iter()
        .map(|item| match item {
            RawValue::Int(n) => {
                u8::try_from(*n).map_err(|_| CodecError::ByteOutOfRange(n.to_string()))
            }
            RawValue::Text(t) => parse_byte_token(t),
        })
        .collect()
}

/// A request or response as written in a test plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ByteInput {
    Int(u64),
    Text(String),
    List(Vec<RawValue>),
}

impl ByteInput {
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        match self {
            ByteInput::Int(n) => u8::try_from(*n)
                .map(|b| vec![b])
                .map_err(|_| CodecError::ByteOutOfRange(n.to_string())),
            ByteInput::Text(text) => parse_bytes(text),
            ByteInput::List(items) => bytes_from_values(items),
        }
    }
}

impl Default for ByteInput {
    fn default() -> Self {
        ByteInput::List(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_forms() {
        assert_eq!(parse_integer("0x1F").unwrap(), 0x1f);
        assert_eq!(parse_integer("0b1010").unwrap(), 10);
        assert_eq!(parse_integer("42").unwrap(), 42);
        assert_eq!(parse_integer(" 0xDE_AD ").unwrap(), 0xdead);
        assert_eq!(parse_integer("1_000").unwrap(), 1000);
    }

    #[test]
    fn test_parse_integer_hex_fallback() {
        assert_eq!(parse_integer("f0f0f").unwrap(), 0xf0f0f);
    }

    #[test]
    fn test_parse_integer_rejects_garbage() {
        assert!(matches!(parse_integer("xyz"), Err(CodecError::InvalidLiteral(_))));
        assert!(matches!(parse_integer("0x"), Err(CodecError::InvalidLiteral(_))));
        assert!(matches!(parse_integer("-1"), Err(CodecError::InvalidLiteral(_))));
        assert_eq!(parse_integer("   "), Err(CodecError::Empty));
    }

    #[test]
    fn test_parse_integer_overflow() {
        assert!(matches!(parse_integer("0x1_0000_0000"), Err(CodecError::Overflow(_))));
    }

    #[test]
    fn test_literal_hex_digits_rejects_non_hex() {
        assert!(literal_hex_digits("0g", "0x0g").is_err());
        assert_eq!(literal_hex_digits("0_a", "0x0_a").unwrap(), "0a");
    }

    #[test]
    fn test_parse_byte_token_is_decimal_without_prefix() {
        assert_eq!(parse_byte_token("10").unwrap(), 10);
        assert_eq!(parse_byte_token("0x10").unwrap(), 16);
        assert!(matches!(parse_byte_token("256"), Err(CodecError::ByteOutOfRange(_))));
    }
}
