//! Character and string types.
//!
//! CHAR and STRING hold single-byte characters and use `'` quotes with
//! `$hh` escapes. WCHAR and WSTRING hold UTF-16 code units and use `"`
//! quotes with `$hhhh` escapes.

use std::fmt::{self, Write as _};

use plc_common::error::{DataTypeError, DataTypeResult, ParseErrorKind};
use plc_common::iec_types::DataTypeId;

use crate::any::{downcast_ref, AnyBase, IecAny, ValueSlot};
use crate::cell::ValueCell;
use crate::literal;

use super::{prefix_names, TypedValue};

/// Replacement for characters a narrow string cannot hold.
const NARROW_REPLACEMENT: u8 = b'?';

fn quote_of(type_id: DataTypeId) -> (char, bool) {
    match type_id {
        DataTypeId::WChar | DataTypeId::WString => ('"', true),
        _ => ('\'', false),
    }
}

pub(crate) fn parse_char(type_id: DataTypeId, text: &str) -> Result<(ValueCell, usize), ParseErrorKind> {
    let (body, prefix) = literal::strip_type_prefix(text, &prefix_names(type_id))?;
    let (quote, wide) = quote_of(type_id);
    let mut unit = None;
    let len = literal::parse_quoted(body, quote, wide, |u| match unit {
        None => {
            unit = Some(u);
            Ok(())
        }
        Some(_) => Err(ParseErrorKind::InvalidCharacter),
    })?;
    let unit = unit.ok_or(ParseErrorKind::InvalidCharacter)?;
    let mut cell = ValueCell::ZERO;
    if wide {
        cell.set_char16(unit);
    } else {
        cell.set_char(unit as u8);
    }
    Ok((cell, prefix + len))
}

pub(crate) fn render_char<W: fmt::Write + ?Sized>(type_id: DataTypeId, cell: ValueCell, w: &mut W) -> fmt::Result {
    let (quote, wide) = quote_of(type_id);
    let unit = if wide {
        cell.get_char16()
    } else {
        u16::from(cell.get_char())
    };
    literal::write_quoted(w, [unit], quote, wide)
}

fn narrow(units: &[u16]) -> Vec<u8> {
    units
        .iter()
        .map(|unit| u8::try_from(*unit).unwrap_or(NARROW_REPLACEMENT))
        .collect()
}

macro_rules! string_common {
    ($name:ident, $unit:ty, $id:ident) => {
        impl $name {
            /// Empty string.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Number of characters (code units).
            #[must_use]
            pub fn len(&self) -> usize {
                self.value.len()
            }

            /// Whether the string is empty.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.value.is_empty()
            }

            /// Raw code units.
            #[must_use]
            pub fn units(&self) -> &[$unit] {
                &self.value
            }
        }

        impl Clone for $name {
            fn clone(&self) -> Self {
                Self {
                    base: AnyBase::new(),
                    value: self.value.clone(),
                }
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.value == other.value
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.to_string_lossy()).finish()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let (quote, wide) = quote_of(DataTypeId::$id);
                literal::write_quoted(f, self.value.iter().map(|unit| u16::from(*unit)), quote, wide)
            }
        }

        impl TypedValue for $name {
            const TYPE_ID: DataTypeId = DataTypeId::$id;
        }

        impl IecAny for $name {
            fn data_type_id(&self) -> DataTypeId {
                DataTypeId::$id
            }

            fn base(&self) -> &AnyBase {
                &self.base
            }

            fn base_mut(&mut self) -> &mut AnyBase {
                &mut self.base
            }

            fn clone_into_slot<'a>(&self, slot: &'a mut ValueSlot) -> &'a mut dyn IecAny {
                slot.store(self.clone().into())
            }

            fn set_value(&mut self, source: &dyn IecAny) -> DataTypeResult<()> {
                let source = source.unwrap_any();
                if let Some(narrow) = downcast_ref::<IecString>(source) {
                    self.assign_narrow(narrow.units());
                } else if let Some(wide) = downcast_ref::<IecWString>(source) {
                    self.assign_wide(wide.units());
                } else {
                    return Err(DataTypeError::NotCastable {
                        from: source.data_type_id(),
                        to: DataTypeId::$id,
                    });
                }
                Ok(())
            }

            fn equals(&self, other: &dyn IecAny) -> bool {
                downcast_ref::<Self>(other.unwrap_any()).is_some_and(|other| other.value == self.value)
            }

            fn from_iec_string(&mut self, text: &str) -> DataTypeResult<usize> {
                let to_error = |kind| DataTypeError::parse(DataTypeId::$id, kind);
                let (body, prefix) =
                    literal::strip_type_prefix(text, &prefix_names(DataTypeId::$id)).map_err(to_error)?;
                let (quote, wide) = quote_of(DataTypeId::$id);
                let mut parsed: Vec<$unit> = Vec::new();
                let len = literal::parse_quoted(body, quote, wide, |unit| {
                    parsed.push(unit as $unit);
                    Ok(())
                })
                .map_err(to_error)?;
                self.value = parsed;
                Ok(prefix + len)
            }

            fn to_iec_string(&self, out: &mut [u8]) -> DataTypeResult<usize> {
                literal::render_into(out, |w| write!(w, "{self}"))
            }

            fn to_string_buffer_size(&self) -> usize {
                let (_, wide) = quote_of(DataTypeId::$id);
                let per_unit = if wide { 5 } else { 3 };
                3 + per_unit * self.value.len()
            }
        }
    };
}

/// STRING: variable-length single-byte string.
#[derive(Default)]
pub struct IecString {
    base: AnyBase,
    value: Vec<u8>,
}

impl IecString {
    /// String from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            base: AnyBase::new(),
            value: bytes.into(),
        }
    }

    /// Contents as bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.value
    }

    /// Contents decoded as Latin-1.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        self.value.iter().map(|b| char::from(*b)).collect()
    }

    fn assign_narrow(&mut self, units: &[u8]) {
        self.value.clear();
        self.value.extend_from_slice(units);
    }

    fn assign_wide(&mut self, units: &[u16]) {
        self.value = narrow(units);
    }
}

/// Characters above U+00FF become `?`.
impl From<&str> for IecString {
    fn from(text: &str) -> Self {
        Self::from_bytes(
            text.chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(NARROW_REPLACEMENT))
                .collect::<Vec<u8>>(),
        )
    }
}

string_common!(IecString, u8, String);

/// WSTRING: variable-length UTF-16 string.
#[derive(Default)]
pub struct IecWString {
    base: AnyBase,
    value: Vec<u16>,
}

impl IecWString {
    /// String from UTF-16 code units.
    #[must_use]
    pub fn from_units(units: impl Into<Vec<u16>>) -> Self {
        Self {
            base: AnyBase::new(),
            value: units.into(),
        }
    }

    /// Contents decoded as UTF-16, unpaired surrogates replaced.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.value)
    }

    fn assign_narrow(&mut self, units: &[u8]) {
        self.value = units.iter().map(|b| u16::from(*b)).collect();
    }

    fn assign_wide(&mut self, units: &[u16]) {
        self.value.clear();
        self.value.extend_from_slice(units);
    }
}

impl From<&str> for IecWString {
    fn from(text: &str) -> Self {
        Self::from_units(text.encode_utf16().collect::<Vec<u16>>())
    }
}

string_common!(IecWString, u16, WString);
