use diag_eval::codec::{ByteInput, format_code_value};
use diag_eval::*;

fn raw(s: &str) -> RawValue {
    RawValue::from(s)
}

#[test]
fn test_decode_numeric_any() {
    assert_eq!(decode_numeric(&raw("any")).unwrap(), NumericToken::Any);
    assert_eq!(decode_numeric(&raw("  ANY ")).unwrap(), NumericToken::Any);
}

#[test]
fn test_decode_numeric_bit_pattern() {
    assert_eq!(
        decode_numeric(&raw("11**01**")).unwrap(),
        NumericToken::BitPattern("11**01**".into())
    );
}

#[test]
fn test_decode_numeric_literals() {
    assert_eq!(decode_numeric(&raw("0x2F")).unwrap(), NumericToken::Exact(0x2f));
    assert_eq!(decode_numeric(&raw("0b1001")).unwrap(), NumericToken::Exact(9));
    assert_eq!(decode_numeric(&raw("47")).unwrap(), NumericToken::Exact(47));
    assert_eq!(decode_numeric(&raw("f0f0f")).unwrap(), NumericToken::Exact(0xf0f0f));
    assert_eq!(decode_numeric(&RawValue::Int(12)).unwrap(), NumericToken::Exact(12));
}

#[test]
fn test_decode_numeric_malformed_is_error() {
    assert!(decode_numeric(&raw("0xzz")).is_err());
    assert!(decode_numeric(&raw("hello")).is_err());
    assert!(decode_numeric(&RawValue::Int(u64::MAX)).is_err());
}

#[test]
fn test_decode_code_rejects_wildcards() {
    assert!(matches!(decode_code(&raw("any")), Err(CodecError::WildcardCode(_))));
    assert!(matches!(decode_code(&raw("0x1**")), Err(CodecError::WildcardCode(_))));
    assert_eq!(decode_code(&raw("0x00101")).unwrap(), 0x101);
}

#[test]
fn test_format_dtc_code_default_width() {
    assert_eq!(format_dtc_code(&RawValue::from(0x101u32)).unwrap(), "0x00101");
    assert_eq!(format_dtc_code(&RawValue::from(0xFFFFFu32)).unwrap(), "0xfffff");
}

#[test]
fn test_format_dtc_code_grows_past_five_digits() {
    assert_eq!(format_dtc_code(&RawValue::from(0x123456u32)).unwrap(), "0x123456");
    assert_eq!(format_code_value(0x100000), "0x100000");
}

#[test]
fn test_format_dtc_code_preserves_hex_literal_width() {
    assert_eq!(format_dtc_code(&raw("0x0A")).unwrap(), "0x0a");
    assert_eq!(format_dtc_code(&raw("0x00_0A_0B")).unwrap(), "0x000a0b");
    assert_eq!(format_dtc_code(&raw("0x")).unwrap(), "0x00");
}

#[test]
fn test_format_dtc_code_other_forms() {
    assert_eq!(format_dtc_code(&raw("257")).unwrap(), "0x00101");
    assert_eq!(format_dtc_code(&raw("0b11")).unwrap(), "0x00003");
    assert_eq!(format_dtc_code(&raw("f0f0f")).unwrap(), "0xf0f0f");
}

#[test]
fn test_format_dtc_code_round_trips_value() {
    for n in [0u32, 1, 0xff, 0x101, 0xfffff, 0x100000, 0xabcdef, u32::MAX] {
        let text = format_dtc_code(&RawValue::from(n)).unwrap();
        assert_eq!(
            decode_numeric(&RawValue::Text(text.clone())).unwrap(),
            NumericToken::Exact(n),
            "{text}"
        );
    }
}

#[test]
fn test_format_status_hex() {
    assert_eq!(format_status_hex(&raw("any")).unwrap(), "any");
    assert_eq!(format_status_hex(&raw("11**01**")).unwrap(), "11**01**");
    assert_eq!(format_status_hex(&raw("0b1001")).unwrap(), "0x09");
    assert_eq!(format_status_hex(&raw("0xA")).unwrap(), "0x0a");
    assert_eq!(format_status_hex(&raw("0x1ff")).unwrap(), "0x1ff");
    assert_eq!(format_status_hex(&RawValue::Int(9)).unwrap(), "0x09");
    assert_eq!(format_status_hex(&RawValue::Int(0x1ff)).unwrap(), "0x1ff");
}

#[test]
fn test_dtc_code_equality_uses_value() {
    let a = DtcCode::parse(&raw("0x0101")).unwrap();
    let b = DtcCode::parse(&RawValue::Int(257)).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.as_str(), "0x0101");
    assert_eq!(b.as_str(), "0x00101");
}

#[test]
fn test_parse_bytes_mixed_delimiters() {
    assert_eq!(parse_bytes("0x22 0xF1,0x90").unwrap(), vec![0x22, 0xf1, 0x90]);
    assert_eq!(parse_bytes("98, 10").unwrap(), vec![98, 10]);
    assert!(parse_bytes("").unwrap().is_empty());
    assert!(parse_bytes("0x100").is_err());
}

#[test]
fn test_byte_input_forms() {
    assert_eq!(ByteInput::Int(0x10).to_bytes().unwrap(), vec![0x10]);
    assert_eq!(ByteInput::Text("0x10 0x01".into()).to_bytes().unwrap(), vec![0x10, 0x01]);
    assert_eq!(
        ByteInput::List(vec![RawValue::Int(0x62), raw("0xF1")]).to_bytes().unwrap(),
        vec![0x62, 0xf1]
    );
    assert!(ByteInput::Int(300).to_bytes().is_err());
}

#[test]
fn test_byte_input_from_yaml() {
    let input: ByteInput = serde_yaml::from_str("[0x62, \"0xF1\", 144]").unwrap();
    assert_eq!(input.to_bytes().unwrap(), vec![0x62, 0xf1, 0x90]);
    let input: ByteInput = serde_yaml::from_str("\"0x10 0x03\"").unwrap();
    assert_eq!(input.to_bytes().unwrap(), vec![0x10, 0x03]);
}

#[test]
fn test_to_hex_string() {
    assert_eq!(to_hex_string(&[0x62, 0xF1, 0x0]), "0x62 0xf1 0x00");
    assert_eq!(to_hex_string(&[]), "");
}

#[test]
fn test_bytes_from_mixed_values() {
    let values = [RawValue::Int(0x62), RawValue::from("0xF1"), RawValue::from("144")];
    assert_eq!(bytes_from_values(&values).unwrap(), vec![0x62, 0xF1, 0x90]);
    assert_eq!(
        bytes_from_values(&[RawValue::Int(256)]).unwrap_err(),
        CodecError::ByteOutOfRange("256".into())
    );
}
