//! Concrete IEC data types.
//!
//! Scalar leaves are thin wrappers around an [`AnyBase`] and are generated
//! by one macro; only their literal grammar differs, which lives in the
//! family modules:
//!
//! - [`numeric`]: BOOL, integers, bit-strings, REAL/LREAL
//! - [`temporal`]: TIME, DATE, TIME_OF_DAY, DATE_AND_TIME and long forms
//! - [`text`]: CHAR/WCHAR, STRING/WSTRING
//! - [`variant`]: the ANY container

pub mod numeric;
pub mod temporal;
pub mod text;
pub mod variant;

use std::fmt;

use plc_common::error::{DataTypeError, DataTypeResult, ParseErrorKind};
use plc_common::iec_types::{DataTypeId, TypeClass};

use crate::any::{AnyBase, IecAny, SimpleValue, ValueSlot};
use crate::cast::cast_cell;
use crate::cell::ValueCell;
use crate::literal;

pub use text::{IecString, IecWString};
pub use variant::AnyVariant;

/// A concrete value type with a fixed type id.
pub trait TypedValue: IecAny + Clone + Default {
    /// Type id of every value of this type.
    const TYPE_ID: DataTypeId;
}

/// A value whose whole state is the storage cell.
pub trait ScalarValue: TypedValue + SimpleValue {
    /// Width of the value in bits.
    const BIT_LENGTH: u32;

    /// Primitive representation.
    type Value: Copy + fmt::Debug + PartialEq;

    /// Wrap a primitive.
    fn new(value: Self::Value) -> Self;

    /// Primitive value.
    fn value(&self) -> Self::Value;

    /// Build from a raw cell, fitting the pattern to this type's width.
    fn from_cell(cell: ValueCell) -> Self;
}

macro_rules! scalar_leaf {
    ($(#[$meta:meta])* $name:ident($value:ty) = $id:ident, $get:ident, $set:ident) => {
        $(#[$meta])*
        #[derive(Default)]
        pub struct $name {
            base: AnyBase,
        }

        impl $name {
            /// Create a value.
            #[must_use]
            pub fn new(value: $value) -> Self {
                let mut cell = ValueCell::ZERO;
                cell.$set(value);
                Self {
                    base: AnyBase::with_cell(ValueCell::canonical(DataTypeId::$id, cell.bits())),
                }
            }

            /// Current value.
            #[must_use]
            pub fn value(&self) -> $value {
                self.base.cell().$get()
            }

            /// Replace the value.
            pub fn set(&mut self, value: $value) {
                let mut cell = ValueCell::ZERO;
                cell.$set(value);
                self.base.set_cell(ValueCell::canonical(DataTypeId::$id, cell.bits()));
            }
        }

        impl Clone for $name {
            fn clone(&self) -> Self {
                let mut base = AnyBase::new();
                base.copy_simple_from(self);
                Self { base }
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.base.cell() == other.base.cell()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.value()).finish()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                render_scalar(DataTypeId::$id, *self.base.cell(), f)
            }
        }

        impl From<$value> for $name {
            fn from(value: $value) -> Self {
                Self::new(value)
            }
        }

        impl From<$name> for $value {
            fn from(value: $name) -> Self {
                value.value()
            }
        }

        impl TypedValue for $name {
            const TYPE_ID: DataTypeId = DataTypeId::$id;
        }

        impl SimpleValue for $name {}

        impl ScalarValue for $name {
            const BIT_LENGTH: u32 = DataTypeId::$id.bit_width();
            type Value = $value;

            fn new(value: $value) -> Self {
                $name::new(value)
            }

            fn value(&self) -> $value {
                $name::value(self)
            }

            fn from_cell(cell: ValueCell) -> Self {
                Self {
                    base: AnyBase::with_cell(ValueCell::canonical(DataTypeId::$id, cell.bits())),
                }
            }
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
                assign_scalar(&mut self.base, DataTypeId::$id, source)
            }

            fn from_iec_string(&mut self, text: &str) -> DataTypeResult<usize> {
                let (cell, len) = parse_scalar(DataTypeId::$id, text)
                    .map_err(|kind| DataTypeError::parse(DataTypeId::$id, kind))?;
                self.base.set_cell(cell);
                Ok(len)
            }

            fn to_iec_string(&self, out: &mut [u8]) -> DataTypeResult<usize> {
                let cell = *self.base.cell();
                literal::render_into(out, |w| render_scalar(DataTypeId::$id, cell, w))
            }

            fn to_string_buffer_size(&self) -> usize {
                scalar_buffer_size(DataTypeId::$id)
            }
        }
    };
}

scalar_leaf!(
    /// BOOL: `TRUE` / `FALSE`.
    Bool(bool) = Bool, get_bool, set_bool
);
scalar_leaf!(
    /// SINT: 8-bit signed integer.
    SInt(i8) = SInt, get_i8, set_i8
);
scalar_leaf!(
    /// INT: 16-bit signed integer.
    Int(i16) = Int, get_i16, set_i16
);
scalar_leaf!(
    /// DINT: 32-bit signed integer.
    DInt(i32) = DInt, get_i32, set_i32
);
scalar_leaf!(
    /// LINT: 64-bit signed integer.
    LInt(i64) = LInt, get_i64, set_i64
);
scalar_leaf!(
    /// USINT: 8-bit unsigned integer.
    USInt(u8) = USInt, get_u8, set_u8
);
scalar_leaf!(
    /// UINT: 16-bit unsigned integer.
    UInt(u16) = UInt, get_u16, set_u16
);
scalar_leaf!(
    /// UDINT: 32-bit unsigned integer.
    UDInt(u32) = UDInt, get_u32, set_u32
);
scalar_leaf!(
    /// ULINT: 64-bit unsigned integer.
    ULInt(u64) = ULInt, get_u64, set_u64
);
scalar_leaf!(
    /// BYTE: 8-bit bit-string.
    Byte(u8) = Byte, get_u8, set_u8
);
scalar_leaf!(
    /// WORD: 16-bit bit-string.
    Word(u16) = Word, get_u16, set_u16
);
scalar_leaf!(
    /// DWORD: 32-bit bit-string.
    DWord(u32) = DWord, get_u32, set_u32
);
scalar_leaf!(
    /// LWORD: 64-bit bit-string.
    LWord(u64) = LWord, get_u64, set_u64
);
scalar_leaf!(
    /// REAL: IEEE-754 single precision.
    Real(f32) = Real, get_f32, set_f32
);
scalar_leaf!(
    /// LREAL: IEEE-754 double precision.
    LReal(f64) = LReal, get_f64, set_f64
);
scalar_leaf!(
    /// CHAR: single-byte character.
    Char(u8) = Char, get_char, set_char
);
scalar_leaf!(
    /// WCHAR: UTF-16 code unit.
    WChar(u16) = WChar, get_char16, set_char16
);
scalar_leaf!(
    /// TIME: signed duration in nanoseconds.
    Time(i64) = Time, get_i64, set_i64
);
scalar_leaf!(
    /// LTIME: signed duration in nanoseconds.
    LTime(i64) = LTime, get_i64, set_i64
);
scalar_leaf!(
    /// DATE: nanoseconds since the epoch, always at midnight.
    Date(u64) = Date, get_u64, set_u64
);
scalar_leaf!(
    /// LDATE: nanoseconds since the epoch, always at midnight.
    LDate(u64) = LDate, get_u64, set_u64
);
scalar_leaf!(
    /// TIME_OF_DAY: nanoseconds since midnight.
    TimeOfDay(u64) = TimeOfDay, get_u64, set_u64
);
scalar_leaf!(
    /// LTIME_OF_DAY: nanoseconds since midnight.
    LTimeOfDay(u64) = LTimeOfDay, get_u64, set_u64
);
scalar_leaf!(
    /// DATE_AND_TIME: nanoseconds since the epoch (UTC).
    DateAndTime(u64) = DateAndTime, get_u64, set_u64
);
scalar_leaf!(
    /// LDATE_AND_TIME: nanoseconds since the epoch (UTC).
    LDateAndTime(u64) = LDateAndTime, get_u64, set_u64
);

/// Literal prefixes accepted by the parser of `type_id`.
pub(crate) fn prefix_names(type_id: DataTypeId) -> [&'static str; 2] {
    match type_id {
        DataTypeId::Time => ["T", "TIME"],
        DataTypeId::LTime => ["LT", "LTIME"],
        DataTypeId::Date => ["D", "DATE"],
        DataTypeId::LDate => ["LD", "LDATE"],
        DataTypeId::TimeOfDay => ["TOD", "TIME_OF_DAY"],
        DataTypeId::LTimeOfDay => ["LTOD", "LTIME_OF_DAY"],
        DataTypeId::DateAndTime => ["DT", "DATE_AND_TIME"],
        DataTypeId::LDateAndTime => ["LDT", "LDATE_AND_TIME"],
        other => [other.name(), other.name()],
    }
}

/// Parse the literal of any scalar type into a canonical cell.
pub(crate) fn parse_scalar(type_id: DataTypeId, text: &str) -> Result<(ValueCell, usize), ParseErrorKind> {
    match type_id.class() {
        TypeClass::Bool => numeric::parse_bool(text),
        TypeClass::SignedInt | TypeClass::UnsignedInt | TypeClass::BitString => {
            numeric::parse_integer(type_id, text)
        }
        TypeClass::Real => numeric::parse_real(type_id, text),
        TypeClass::Char => text::parse_char(type_id, text),
        TypeClass::Duration => temporal::parse_duration(type_id, text),
        TypeClass::Date => temporal::parse_date(type_id, text),
        TypeClass::TimeOfDay => temporal::parse_time_of_day(type_id, text),
        TypeClass::DateAndTime => temporal::parse_date_and_time(type_id, text),
        _ => Err(ParseErrorKind::PrefixMismatch),
    }
}

/// Render the literal of any scalar type.
pub(crate) fn render_scalar<W>(type_id: DataTypeId, cell: ValueCell, w: &mut W) -> fmt::Result
where
    W: fmt::Write + ?Sized,
{
    match type_id.class() {
        TypeClass::Bool => numeric::render_bool(cell, w),
        TypeClass::SignedInt | TypeClass::UnsignedInt | TypeClass::BitString => {
            numeric::render_integer(type_id, cell, w)
        }
        TypeClass::Real => numeric::render_real(type_id, cell, w),
        TypeClass::Char => text::render_char(type_id, cell, w),
        TypeClass::Duration => temporal::render_duration(type_id, cell, w),
        TypeClass::Date => temporal::render_date(type_id, cell, w),
        TypeClass::TimeOfDay => temporal::render_time_of_day(type_id, cell, w),
        TypeClass::DateAndTime => temporal::render_date_and_time(type_id, cell, w),
        _ => Ok(()),
    }
}

/// Worst-case rendered length of a scalar literal, NUL included.
pub(crate) fn scalar_buffer_size(type_id: DataTypeId) -> usize {
    match type_id {
        DataTypeId::Bool | DataTypeId::Byte | DataTypeId::UInt | DataTypeId::Char => 6,
        DataTypeId::SInt => 5,
        DataTypeId::USInt => 4,
        DataTypeId::Int => 7,
        DataTypeId::Word | DataTypeId::WChar => 8,
        DataTypeId::UDInt => 11,
        DataTypeId::DInt | DataTypeId::DWord => 12,
        DataTypeId::LWord => 20,
        DataTypeId::LInt | DataTypeId::ULInt => 21,
        DataTypeId::Real => 32,
        DataTypeId::LReal | DataTypeId::Time => 40,
        DataTypeId::LTime => 41,
        DataTypeId::Date => 13,
        DataTypeId::LDate => 14,
        DataTypeId::TimeOfDay => 23,
        DataTypeId::LTimeOfDay => 24,
        DataTypeId::DateAndTime => 33,
        DataTypeId::LDateAndTime => 34,
        _ => 1,
    }
}

/// Assign `source` to a scalar of type `to` through the cast engine.
fn assign_scalar(base: &mut AnyBase, to: DataTypeId, source: &dyn IecAny) -> DataTypeResult<()> {
    let source = source.unwrap_any();
    let from = source.data_type_id();
    let cell = cast_cell(from, *source.base().cell(), to).ok_or(DataTypeError::NotCastable { from, to })?;
    base.set_cell(cell);
    Ok(())
}
