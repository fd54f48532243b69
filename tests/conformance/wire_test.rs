//! Compact wire encoding of every built-in value.
//!
//! # Acceptance Criteria
//!
//! - Every scalar round-trips through `encode` and `decode`
//! - Encoded scalars are one tag byte plus the IEC memory size
//! - Strings honour the configured length limit

use byteorder::{BigEndian, ByteOrder};
use plc_common::config::WireConfig;
use plc_common::error::WireErrorKind;
use plc_datatypes::{AnyValue, DataTypeError, DataTypeId, IecAny, WireCodec};

use super::common::{scalar_ids, typed};

fn encode(codec: &WireCodec, value: &dyn IecAny) -> Vec<u8> {
    let mut out = vec![0u8; codec.encoded_size(value).unwrap()];
    let len = codec.encode(value, &mut out).unwrap();
    out.truncate(len);
    out
}

#[test]
fn test_scalars_round_trip() {
    let codec = WireCodec::default();
    for id in scalar_ids() {
        let value = AnyValue::new(id).unwrap();
        let bytes = encode(&codec, value.as_dyn());
        let expected_len = if id == DataTypeId::Bool { 1 } else { 1 + id.iec_memory_size() };
        assert_eq!(bytes.len(), expected_len, "{id}");
        let (decoded, len) = codec.decode(&bytes).unwrap();
        assert_eq!(len, bytes.len());
        assert_eq!(decoded, value, "{id}");
    }
}

#[test]
fn test_payload_is_big_endian() {
    let codec = WireCodec::default();
    let bytes = encode(&codec, typed("LREAL#36.0").as_dyn());
    assert_eq!(BigEndian::read_u64(&bytes[1..]), 0x4042_0000_0000_0000);
    let bytes = encode(&codec, typed("DINT#-2").as_dyn());
    assert_eq!(BigEndian::read_i32(&bytes[1..]), -2);
    let bytes = encode(&codec, typed("T#1s").as_dyn());
    assert_eq!(BigEndian::read_i64(&bytes[1..]), 1_000_000_000);
}

#[test]
fn test_strings_round_trip() {
    let codec = WireCodec::default();
    for text in ["'conveyor $N ready'", "\"wide $20AC\"", "''"] {
        let value = typed(text);
        let bytes = encode(&codec, value.as_dyn());
        let (decoded, len) = codec.decode(&bytes).unwrap();
        assert_eq!(len, bytes.len());
        assert_eq!(decoded.to_string(), text);
    }
}

#[test]
fn test_configured_string_limit() {
    let codec = WireCodec::from(&WireConfig { max_string_length: 4 });
    assert!(codec.encoded_size(typed("'four'").as_dyn()).is_ok());
    assert_eq!(
        codec.encoded_size(typed("'fiver'").as_dyn()),
        Err(DataTypeError::Wire(WireErrorKind::StringTooLong))
    );
}

#[test]
fn test_decode_into_typed_target_keeps_forced_flag() {
    let codec = WireCodec::default();
    let mut target = typed("INT#0");
    target.as_dyn_mut().set_forced(true);
    let bytes = encode(&codec, typed("INT#-300").as_dyn());
    assert_eq!(codec.decode_into(&bytes, target.as_dyn_mut()), Ok(3));
    assert_eq!(target.to_string(), "INT#-300");
    assert!(target.as_dyn().is_forced());
}
