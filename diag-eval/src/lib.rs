pub mod codec;
pub mod dtc;
pub mod response;
pub mod sink;
pub mod status;

pub use codec::{
    ByteInput, CodecError, DtcCode, NumericToken, RawValue, bytes_from_values, decode_code,
    decode_numeric, format_dtc_code, format_status_hex, parse_bytes, parse_integer, to_hex_string,
};
pub use dtc::{
    Dtc, DtcEvalError, DtcEvaluation, DtcEvaluationRow, DtcRecord, MutedDtcSource, Presence,
    RowType, RuleKind, RuleSet, evaluate, evaluate_dtc_block, match_dtcs,
};
pub use response::{
    ClassifyError, DiagnosticVerdict, ResponseSpec, ResponseType, classify, evaluate_response,
};
pub use sink::{DiagnosticGroup, NullSink, ReportSink, SinkError, Table, Verdict};
pub use status::{StatusBit, StatusBitfield, decode_status};
