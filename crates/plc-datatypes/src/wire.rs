//! Compact tagged value encoding.
//!
//! Every value starts with one tag byte, `0x40 | type code`. BOOL carries
//! its value in the tag (`0x40` FALSE, `0x41` TRUE) and has no payload.
//! Other scalars follow with their IEC memory size in big-endian order.
//! STRING is a big-endian `u16` length followed by the bytes; WSTRING a
//! `u16` length in code units followed by UTF-16BE units.
//!
//! With the `custom-serializable` feature, types outside the built-in set
//! encode themselves through the [`IecAny`] serialization hooks.

use byteorder::{BigEndian, ByteOrder};
use tracing::trace;

use plc_common::config::WireConfig;
use plc_common::error::{DataTypeError, DataTypeResult, WireErrorKind};
use plc_common::iec_types::{DataTypeId, TypeClass};

use crate::any::{downcast_ref, IecAny};
use crate::cell::ValueCell;
use crate::dynamic::AnyValue;
use crate::leaf::{IecString, IecWString};

/// Tag bits shared by all built-in encodings.
pub const TAG_BASE: u8 = 0x40;

const TAG_FALSE: u8 = TAG_BASE;
const TAG_TRUE: u8 = TAG_BASE | 1;
const LENGTH_SIZE: usize = 2;

/// Tag byte of a built-in type.
#[must_use]
pub fn tag_of(type_id: DataTypeId) -> Option<u8> {
    let code = type_id.code();
    (code < u16::from(TAG_BASE) && type_id.class() != TypeClass::Structural && type_id != DataTypeId::Any)
        .then(|| TAG_BASE | code as u8)
}

fn wire_error(kind: WireErrorKind) -> DataTypeError {
    DataTypeError::Wire(kind)
}

/// Encoder and decoder for the compact format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireCodec {
    max_string_length: u16,
}

impl Default for WireCodec {
    fn default() -> Self {
        Self::new(u16::MAX)
    }
}

impl From<&WireConfig> for WireCodec {
    fn from(config: &WireConfig) -> Self {
        Self::new(config.max_string_length)
    }
}

impl WireCodec {
    /// Codec accepting strings of at most `max_string_length` characters.
    #[must_use]
    pub const fn new(max_string_length: u16) -> Self {
        Self { max_string_length }
    }

    /// Longest accepted STRING/WSTRING in characters.
    #[must_use]
    pub const fn max_string_length(&self) -> u16 {
        self.max_string_length
    }

    fn check_length(&self, len: usize) -> DataTypeResult<u16> {
        u16::try_from(len)
            .ok()
            .filter(|len| *len <= self.max_string_length)
            .ok_or(wire_error(WireErrorKind::StringTooLong))
    }

    /// Bytes [`WireCodec::encode`] will write for `value`.
    ///
    /// # Errors
    ///
    /// Returns [`WireErrorKind::Unsupported`] for values without an
    /// encoding and [`WireErrorKind::StringTooLong`] for oversized strings.
    pub fn encoded_size(&self, value: &dyn IecAny) -> DataTypeResult<usize> {
        let value = value.unwrap_any();
        let type_id = value.data_type_id();
        match type_id {
            DataTypeId::Bool => Ok(1),
            DataTypeId::String | DataTypeId::WString => {
                let (len, unit_size) = string_units(value);
                self.check_length(len)?;
                Ok(1 + LENGTH_SIZE + len * unit_size)
            }
            _ if type_id.bit_width() > 0 => Ok(1 + type_id.iec_memory_size()),
            _ => custom_size(value),
        }
    }

    /// Encode `value` into `out`. Returns the bytes written.
    ///
    /// # Errors
    ///
    /// As [`WireCodec::encoded_size`], plus [`DataTypeError::BufferTooSmall`].
    pub fn encode(&self, value: &dyn IecAny, out: &mut [u8]) -> DataTypeResult<usize> {
        let value = value.unwrap_any();
        let required = self.encoded_size(value)?;
        if out.len() < required {
            return Err(DataTypeError::BufferTooSmall {
                required,
                available: out.len(),
            });
        }
        let type_id = value.data_type_id();
        let cell = value.base().cell();
        match type_id {
            DataTypeId::Bool => {
                out[0] = if cell.bits() & 1 == 1 { TAG_TRUE } else { TAG_FALSE };
            }
            DataTypeId::String | DataTypeId::WString => {
                out[0] = TAG_BASE | type_id.code() as u8;
                let (len, _) = string_units(value);
                BigEndian::write_u16(&mut out[1..=LENGTH_SIZE], self.check_length(len)?);
                let payload = &mut out[1 + LENGTH_SIZE..required];
                if let Some(narrow) = downcast_ref::<IecString>(value) {
                    payload.copy_from_slice(narrow.as_bytes());
                } else if let Some(wide) = downcast_ref::<IecWString>(value) {
                    BigEndian::write_u16_into(wide.units(), payload);
                }
            }
            _ if type_id.bit_width() > 0 => {
                out[0] = TAG_BASE | type_id.code() as u8;
                cell.write_bytes::<BigEndian>(type_id.iec_memory_size(), &mut out[1..])
                    .ok_or(wire_error(WireErrorKind::Truncated))?;
            }
            _ => return encode_custom(value, out),
        }
        trace!(%type_id, len = required, "wire encode");
        Ok(required)
    }

    /// Decode one value into `target`, which determines the expected type.
    /// An `ANY` container accepts any built-in type. Returns the bytes
    /// consumed.
    ///
    /// # Errors
    ///
    /// Returns [`WireErrorKind::Truncated`] for short input,
    /// [`WireErrorKind::UnexpectedTag`] when the tag does not match the
    /// target and [`WireErrorKind::StringTooLong`] for oversized strings.
    pub fn decode_into(&self, input: &[u8], target: &mut dyn IecAny) -> DataTypeResult<usize> {
        if target.data_type_id() == DataTypeId::Any {
            let (value, len) = self.decode(input)?;
            target.set_value(value.as_dyn())?;
            return Ok(len);
        }

        let target = target.unwrap_any_mut();
        let type_id = target.data_type_id();
        let (&tag, payload) = input.split_first().ok_or(wire_error(WireErrorKind::Truncated))?;
        let consumed = match type_id {
            DataTypeId::Bool => {
                if tag != TAG_FALSE && tag != TAG_TRUE {
                    return Err(wire_error(WireErrorKind::UnexpectedTag(tag)));
                }
                target
                    .base_mut()
                    .set_cell(ValueCell::canonical(type_id, u64::from(tag == TAG_TRUE)));
                1
            }
            _ if tag_of(type_id) != Some(tag) => {
                return self.decode_custom(tag, payload, target);
            }
            DataTypeId::String | DataTypeId::WString => {
                1 + self.decode_string(type_id, payload, target)?
            }
            _ => {
                let width = type_id.iec_memory_size();
                let signed = matches!(type_id.class(), TypeClass::SignedInt | TypeClass::Duration);
                let cell = ValueCell::read_bytes::<BigEndian>(width, payload, signed)
                    .ok_or(wire_error(WireErrorKind::Truncated))?;
                target.base_mut().set_cell(ValueCell::canonical(type_id, cell.bits()));
                1 + width
            }
        };
        trace!(%type_id, len = consumed, "wire decode");
        Ok(consumed)
    }

    fn decode_string(&self, type_id: DataTypeId, payload: &[u8], target: &mut dyn IecAny) -> DataTypeResult<usize> {
        if payload.len() < LENGTH_SIZE {
            return Err(wire_error(WireErrorKind::Truncated));
        }
        let len = usize::from(BigEndian::read_u16(payload));
        self.check_length(len)?;
        let body = &payload[LENGTH_SIZE..];
        if type_id == DataTypeId::String {
            let bytes = body.get(..len).ok_or(wire_error(WireErrorKind::Truncated))?;
            target.set_value(&IecString::from_bytes(bytes))?;
            Ok(LENGTH_SIZE + len)
        } else {
            let bytes = body.get(..len * 2).ok_or(wire_error(WireErrorKind::Truncated))?;
            let mut units = vec![0u16; len];
            BigEndian::read_u16_into(bytes, &mut units);
            target.set_value(&IecWString::from_units(units))?;
            Ok(LENGTH_SIZE + len * 2)
        }
    }

    #[cfg(feature = "custom-serializable")]
    #[allow(clippy::unused_self)]
    fn decode_custom(&self, tag: u8, payload: &[u8], target: &mut dyn IecAny) -> DataTypeResult<usize> {
        if !target.deserialize_tag(tag) {
            return Err(wire_error(WireErrorKind::UnexpectedTag(tag)));
        }
        Ok(1 + target.deserialize_custom(payload)?)
    }

    #[cfg(not(feature = "custom-serializable"))]
    #[allow(clippy::unused_self)]
    fn decode_custom(&self, tag: u8, _payload: &[u8], _target: &mut dyn IecAny) -> DataTypeResult<usize> {
        Err(wire_error(WireErrorKind::UnexpectedTag(tag)))
    }

    /// Decode one built-in value of whatever type the tag names.
    ///
    /// # Errors
    ///
    /// As [`WireCodec::decode_into`]; tags that name no built-in type are
    /// [`WireErrorKind::UnexpectedTag`].
    pub fn decode(&self, input: &[u8]) -> DataTypeResult<(AnyValue, usize)> {
        let &tag = input.first().ok_or(wire_error(WireErrorKind::Truncated))?;
        let type_id = if tag == TAG_FALSE {
            DataTypeId::Bool
        } else {
            DataTypeId::from_code(u16::from(tag & !TAG_BASE))
                .filter(|id| tag & 0xC0 == TAG_BASE && tag_of(*id) == Some(tag))
                .ok_or(wire_error(WireErrorKind::UnexpectedTag(tag)))?
        };
        let mut value = AnyValue::new(type_id)?;
        let len = self.decode_into(input, value.as_dyn_mut())?;
        Ok((value, len))
    }
}

fn string_units(value: &dyn IecAny) -> (usize, usize) {
    if let Some(narrow) = downcast_ref::<IecString>(value) {
        (narrow.len(), 1)
    } else if let Some(wide) = downcast_ref::<IecWString>(value) {
        (wide.len(), 2)
    } else {
        (0, 1)
    }
}

#[cfg(feature = "custom-serializable")]
fn custom_size(value: &dyn IecAny) -> DataTypeResult<usize> {
    match value.required_serialization_size() {
        0 => Err(wire_error(WireErrorKind::Unsupported)),
        size => Ok(1 + size),
    }
}

#[cfg(not(feature = "custom-serializable"))]
fn custom_size(_value: &dyn IecAny) -> DataTypeResult<usize> {
    Err(wire_error(WireErrorKind::Unsupported))
}

#[cfg(feature = "custom-serializable")]
fn encode_custom(value: &dyn IecAny, out: &mut [u8]) -> DataTypeResult<usize> {
    out[0] = value.serialization_tag();
    Ok(1 + value.serialize_custom(&mut out[1..])?)
}

#[cfg(not(feature = "custom-serializable"))]
fn encode_custom(_value: &dyn IecAny, _out: &mut [u8]) -> DataTypeResult<usize> {
    Err(wire_error(WireErrorKind::Unsupported))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::NANOS_PER_DAY;
    use crate::leaf::{AnyVariant, Bool, Date, DInt, LReal, Real, SInt, Time, TimeOfDay, UInt};

    fn encode(value: &dyn IecAny) -> Vec<u8> {
        let codec = WireCodec::default();
        let mut out = vec![0u8; codec.encoded_size(value).unwrap()];
        let len = codec.encode(value, &mut out).unwrap();
        assert_eq!(len, out.len());
        out
    }

    #[test]
    fn test_bool_has_no_payload() {
        assert_eq!(encode(&Bool::new(false)), [0x40]);
        assert_eq!(encode(&Bool::new(true)), [0x41]);
    }

    #[test]
    fn test_scalars_are_big_endian() {
        assert_eq!(encode(&SInt::new(-2)), [0x42, 0xFE]);
        assert_eq!(encode(&UInt::new(0x1234)), [0x47, 0x12, 0x34]);
        assert_eq!(encode(&DInt::new(-1)), [0x44, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(encode(&Real::new(1.0)), [0x58, 0x3F, 0x80, 0x00, 0x00]);
        assert_eq!(
            encode(&LReal::new(36.0)),
            [0x59, 0x40, 0x42, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(encode(&Time::new(-1)), [0x51, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_strings() {
        assert_eq!(encode(&IecString::from("ab")), [0x5A, 0x00, 0x02, b'a', b'b']);
        assert_eq!(
            encode(&IecWString::from("€")),
            [0x5B, 0x00, 0x01, 0x20, 0xAC]
        );
    }

    #[test]
    fn test_decode_normalises_calendar_values() {
        let codec = WireCodec::default();
        let mut input = [0u8; 9];

        input[0] = tag_of(DataTypeId::TimeOfDay).unwrap();
        BigEndian::write_u64(&mut input[1..], NANOS_PER_DAY + 1_000_000_000);
        let mut tod = TimeOfDay::default();
        assert_eq!(codec.decode_into(&input, &mut tod), Ok(9));
        assert_eq!(tod.value(), 1_000_000_000);

        input[0] = tag_of(DataTypeId::Date).unwrap();
        BigEndian::write_u64(&mut input[1..], NANOS_PER_DAY + 5);
        let mut date = Date::default();
        assert_eq!(codec.decode_into(&input, &mut date), Ok(9));
        assert_eq!(date.value(), NANOS_PER_DAY);
    }

    #[test]
    fn test_decode_restores_values() {
        let codec = WireCodec::default();
        let values: Vec<AnyValue> = vec![
            Bool::new(true).into(),
            SInt::new(-2).into(),
            Time::new(-5_000).into(),
            LReal::new(-6.2587e-4).into(),
            IecString::from("hello").into(),
            IecWString::from("wide €").into(),
        ];
        for value in values {
            let bytes = encode(value.as_dyn());
            let (decoded, len) = codec.decode(&bytes).unwrap();
            assert_eq!(len, bytes.len());
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn test_decode_into_checks_tag() {
        let codec = WireCodec::default();
        let mut target = DInt::new(7);
        assert_eq!(
            codec.decode_into(&[0x42, 0x01], &mut target),
            Err(DataTypeError::Wire(WireErrorKind::UnexpectedTag(0x42)))
        );
        assert_eq!(
            codec.decode_into(&[0x44, 0x00, 0x01], &mut target),
            Err(DataTypeError::Wire(WireErrorKind::Truncated))
        );
        assert_eq!(target.value(), 7);
        assert_eq!(codec.decode_into(&[0x44, 0, 0, 1, 0, 0xAA], &mut target), Ok(5));
        assert_eq!(target.value(), 256);
    }

    #[test]
    fn test_decode_into_variant() {
        let codec = WireCodec::default();
        let mut variant = AnyVariant::empty();
        assert_eq!(codec.decode_into(&[0x47, 0x00, 0x09], &mut variant), Ok(3));
        assert!(variant.equals(&UInt::new(9)));
    }

    #[test]
    fn test_decode_rejects_unknown_tags() {
        let codec = WireCodec::default();
        for tag in [0x00, 0x5C, 0x7F, 0xC1] {
            assert_eq!(
                codec.decode(&[tag]).map(|(_, len)| len),
                Err(DataTypeError::Wire(WireErrorKind::UnexpectedTag(tag)))
            );
        }
        assert_eq!(
            codec.decode(&[]).map(|(_, len)| len),
            Err(DataTypeError::Wire(WireErrorKind::Truncated))
        );
    }

    #[test]
    fn test_string_length_limit() {
        let codec = WireCodec::from(&WireConfig {
            max_string_length: 3,
        });
        assert_eq!(codec.max_string_length(), 3);
        assert_eq!(
            codec.encoded_size(&IecString::from("four")),
            Err(DataTypeError::Wire(WireErrorKind::StringTooLong))
        );
        assert_eq!(
            codec.decode(&[0x5A, 0x00, 0x04, b'a', b'b', b'c', b'd']).map(|(_, len)| len),
            Err(DataTypeError::Wire(WireErrorKind::StringTooLong))
        );
    }

    #[test]
    fn test_buffer_too_small() {
        let codec = WireCodec::default();
        let mut out = [0u8; 2];
        assert_eq!(
            codec.encode(&DInt::new(1), &mut out),
            Err(DataTypeError::BufferTooSmall {
                required: 5,
                available: 2
            })
        );
    }

    #[test]
    fn test_empty_variant_unsupported() {
        let codec = WireCodec::default();
        assert_eq!(
            codec.encoded_size(&AnyVariant::empty()),
            Err(DataTypeError::Wire(WireErrorKind::Unsupported))
        );
        assert_eq!(encode(&AnyVariant::new(SInt::new(1))), [0x42, 0x01]);
    }
}
