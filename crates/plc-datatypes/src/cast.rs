//! Castability rules and the conversion engine.
//!
//! [`is_castable`] answers the configuration-time question (may a
//! connection from one type to another exist, and is it lossless?).
//! [`cast_cell`] performs the run-time conversion between storage cells.
//! [`cast`] and [`implicit_cast`] are the statically checked entry points:
//! their marker traits are generated from the same matrix, so an implicit
//! down-cast does not compile.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{trace, warn};

use plc_common::error::DataTypeResult;
use plc_common::iec_types::{DataTypeId, TypeClass};

use crate::any::IecAny;
use crate::calendar::NANOS_PER_DAY;
use crate::cell::{low_mask, ValueCell};
use crate::leaf::{
    Bool, Byte, Char, DInt, DWord, Date, DateAndTime, IecString, IecWString, Int, LDate, LDateAndTime, LInt,
    LReal, LTime, LTimeOfDay, LWord, Real, SInt, Time, TimeOfDay, TypedValue, UDInt, UInt, ULInt, USInt,
    WChar, Word,
};
use crate::special_cast::special_cast_cell;

/// Result of a castability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Castability {
    /// No conversion exists.
    NotCastable,
    /// Every source value is representable in the target.
    UpCast,
    /// A conversion exists but may lose information.
    DownCast,
}

impl Castability {
    fn widening(lossless: bool) -> Self {
        if lossless {
            Self::UpCast
        } else {
            Self::DownCast
        }
    }

    /// Whether any conversion exists.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        !matches!(self, Self::NotCastable)
    }

    /// Whether the conversion is lossless.
    #[must_use]
    pub const fn is_up_cast(self) -> bool {
        matches!(self, Self::UpCast)
    }

    /// Whether the conversion may lose information.
    #[must_use]
    pub const fn is_down_cast(self) -> bool {
        matches!(self, Self::DownCast)
    }

    /// `(allowed, up_cast, down_cast)`.
    #[must_use]
    pub const fn flags(self) -> (bool, bool, bool) {
        (self.is_allowed(), self.is_up_cast(), self.is_down_cast())
    }
}

impl fmt::Display for Castability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotCastable => "not castable",
            Self::UpCast => "up-cast",
            Self::DownCast => "down-cast",
        })
    }
}

/// Bits of an integer type that carry magnitude.
const fn value_bits(id: DataTypeId) -> u32 {
    match id.class() {
        TypeClass::SignedInt => id.bit_width() - 1,
        _ => id.bit_width(),
    }
}

const fn mantissa_bits(id: DataTypeId) -> u32 {
    match id {
        DataTypeId::Real => 24,
        _ => 53,
    }
}

/// Castability of `from` to `to`.
#[must_use]
pub fn is_castable(from: DataTypeId, to: DataTypeId) -> Castability {
    use TypeClass as C;

    if from == to {
        return Castability::UpCast;
    }
    let (from_width, to_width) = (from.bit_width(), to.bit_width());
    match (from.class(), to.class()) {
        (C::Bool | C::BitString, C::Bool | C::BitString)
        | (C::SignedInt, C::SignedInt)
        | (C::UnsignedInt, C::UnsignedInt | C::SignedInt)
        | (C::Real, C::Real)
        | (C::Char, C::Char) => Castability::widening(to_width > from_width),
        (C::SignedInt | C::UnsignedInt, C::Real) => Castability::widening(value_bits(from) <= mantissa_bits(to)),
        (C::Real, C::BitString) | (C::BitString, C::Real) => Castability::widening(to_width == from_width),
        (C::SignedInt, C::UnsignedInt)
        | (C::Bool | C::BitString, C::SignedInt | C::UnsignedInt)
        | (C::SignedInt | C::UnsignedInt, C::Bool | C::BitString)
        | (C::Real, C::Bool | C::SignedInt | C::UnsignedInt)
        | (C::Bool, C::Real)
        | (C::Char, C::BitString | C::SignedInt | C::UnsignedInt)
        | (C::BitString | C::SignedInt | C::UnsignedInt, C::Char)
        | (C::DateAndTime, C::Date | C::TimeOfDay) => Castability::DownCast,
        (C::Duration, C::Duration)
        | (C::Date, C::Date)
        | (C::TimeOfDay, C::TimeOfDay)
        | (C::DateAndTime, C::DateAndTime) => Castability::widening(to.is_long_temporal()),
        (C::String, C::String) => Castability::widening(to == DataTypeId::WString),
        _ => Castability::NotCastable,
    }
}

/// Castability for raw type codes; unknown codes are not castable.
#[must_use]
pub fn is_castable_code(from: u16, to: u16) -> Castability {
    match (DataTypeId::from_code(from), DataTypeId::from_code(to)) {
        (Some(from), Some(to)) => is_castable(from, to),
        _ => Castability::NotCastable,
    }
}

/// Convert the cell of a `from` value into the cell of a `to` value.
///
/// Only scalar types have a cell representation; `None` is returned when
/// either side has none or the pair is not castable.
pub(crate) fn cast_cell(from: DataTypeId, cell: ValueCell, to: DataTypeId) -> Option<ValueCell> {
    use TypeClass as C;

    if !is_castable(from, to).is_allowed() || from.bit_width() == 0 || to.bit_width() == 0 {
        trace!(%from, %to, "no cell conversion");
        return None;
    }
    let bits = cell.bits();
    let converted = match (from.class(), to.class()) {
        (C::Real, _) => return special_cast_cell(from, cell, to),
        (C::SignedInt | C::UnsignedInt | C::Bool, C::Real) => real_from_integer(from, cell, to),
        (C::SignedInt | C::UnsignedInt, C::Bool) => ValueCell::canonical(to, u64::from(bits != 0)),
        (C::SignedInt | C::UnsignedInt | C::Char, C::BitString) => {
            ValueCell::canonical(to, bits & low_mask(from.bit_width()))
        }
        (C::DateAndTime, C::Date) => ValueCell::from_bits(bits - bits % NANOS_PER_DAY),
        (C::DateAndTime, C::TimeOfDay) => ValueCell::from_bits(bits % NANOS_PER_DAY),
        // Bit patterns, wrapping integer conversion and same-class temporal copies.
        _ => ValueCell::canonical(to, bits),
    };
    trace!(%from, %to, from_bits = bits, to_bits = converted.bits(), "cast_cell");
    Some(converted)
}

fn real_from_integer(from: DataTypeId, cell: ValueCell, to: DataTypeId) -> ValueCell {
    let (narrow, wide) = match from.class() {
        TypeClass::SignedInt => {
            let value = cell.largest_int();
            (value as f32, value as f64)
        }
        TypeClass::Bool => {
            let value = u8::from(cell.get_bool());
            (f32::from(value), f64::from(value))
        }
        _ => {
            let value = cell.largest_uint();
            (value as f32, value as f64)
        }
    };
    let mut out = ValueCell::ZERO;
    if to == DataTypeId::Real {
        out.set_f32(narrow);
    } else {
        out.set_f64(wide);
    }
    out
}

/// `Self` may be converted to `T` with an explicit cast.
pub trait ExplicitCast<T> {}

/// `Self` converts to `T` without loss and may be used implicitly.
pub trait ImplicitCast<T>: ExplicitCast<T> {}

impl<T: TypedValue> ExplicitCast<T> for T {}
impl<T: TypedValue> ImplicitCast<T> for T {}

macro_rules! cast_markers {
    ($($from:ident => up [$($up:ident),*] down [$($down:ident),*];)*) => {
        $(
            $(
                impl ExplicitCast<$up> for $from {}
                impl ImplicitCast<$up> for $from {}
            )*
            $(
                impl ExplicitCast<$down> for $from {}
            )*
        )*

        /// `(from, to, up_cast)` for every generated marker impl.
        #[cfg(test)]
        const MARKER_TABLE: &[(DataTypeId, DataTypeId, bool)] = &[
            $(
                $((<$from as TypedValue>::TYPE_ID, <$up as TypedValue>::TYPE_ID, true),)*
                $((<$from as TypedValue>::TYPE_ID, <$down as TypedValue>::TYPE_ID, false),)*
            )*
        ];
    };
}

cast_markers! {
    Bool => up [Byte, Word, DWord, LWord]
        down [SInt, Int, DInt, LInt, USInt, UInt, UDInt, ULInt, Real, LReal];
    SInt => up [Int, DInt, LInt, Real, LReal]
        down [Bool, USInt, UInt, UDInt, ULInt, Byte, Word, DWord, LWord, Char, WChar];
    Int => up [DInt, LInt, Real, LReal]
        down [Bool, SInt, USInt, UInt, UDInt, ULInt, Byte, Word, DWord, LWord, Char, WChar];
    DInt => up [LInt, LReal]
        down [Bool, SInt, Int, USInt, UInt, UDInt, ULInt, Byte, Word, DWord, LWord, Real, Char, WChar];
    LInt => up []
        down [Bool, SInt, Int, DInt, USInt, UInt, UDInt, ULInt, Byte, Word, DWord, LWord, Real, LReal, Char, WChar];
    USInt => up [UInt, UDInt, ULInt, Int, DInt, LInt, Real, LReal]
        down [Bool, SInt, Byte, Word, DWord, LWord, Char, WChar];
    UInt => up [UDInt, ULInt, DInt, LInt, Real, LReal]
        down [Bool, SInt, Int, USInt, Byte, Word, DWord, LWord, Char, WChar];
    UDInt => up [ULInt, LInt, LReal]
        down [Bool, SInt, Int, DInt, USInt, UInt, Byte, Word, DWord, LWord, Real, Char, WChar];
    ULInt => up []
        down [Bool, SInt, Int, DInt, LInt, USInt, UInt, UDInt, Byte, Word, DWord, LWord, Real, LReal, Char, WChar];
    Byte => up [Word, DWord, LWord]
        down [Bool, SInt, Int, DInt, LInt, USInt, UInt, UDInt, ULInt, Real, LReal, Char, WChar];
    Word => up [DWord, LWord]
        down [Bool, Byte, SInt, Int, DInt, LInt, USInt, UInt, UDInt, ULInt, Real, LReal, Char, WChar];
    DWord => up [LWord, Real]
        down [Bool, Byte, Word, SInt, Int, DInt, LInt, USInt, UInt, UDInt, ULInt, LReal, Char, WChar];
    LWord => up [LReal]
        down [Bool, Byte, Word, DWord, SInt, Int, DInt, LInt, USInt, UInt, UDInt, ULInt, Real, Char, WChar];
    Real => up [LReal, DWord]
        down [Bool, SInt, Int, DInt, LInt, USInt, UInt, UDInt, ULInt, Byte, Word, LWord];
    LReal => up [LWord]
        down [Bool, SInt, Int, DInt, LInt, USInt, UInt, UDInt, ULInt, Byte, Word, DWord, Real];
    Char => up [WChar]
        down [Byte, Word, DWord, LWord, SInt, Int, DInt, LInt, USInt, UInt, UDInt, ULInt];
    WChar => up []
        down [Char, Byte, Word, DWord, LWord, SInt, Int, DInt, LInt, USInt, UInt, UDInt, ULInt];
    Time => up [LTime] down [];
    LTime => up [] down [Time];
    Date => up [LDate] down [];
    LDate => up [] down [Date];
    TimeOfDay => up [LTimeOfDay] down [];
    LTimeOfDay => up [] down [TimeOfDay];
    DateAndTime => up [LDateAndTime] down [Date, LDate, TimeOfDay, LTimeOfDay];
    LDateAndTime => up [] down [DateAndTime, Date, LDate, TimeOfDay, LTimeOfDay];
    IecString => up [IecWString] down [];
    IecWString => up [] down [IecString];
}

/// Explicit conversion of `source` to `T`.
///
/// Down-casts are permitted; values are converted as described for the
/// individual type families (wrapping, truncation or saturation).
///
/// ```
/// use plc_datatypes::cast::cast;
/// use plc_datatypes::leaf::{Int, SInt};
///
/// let narrowed: SInt = cast(&Int::new(300));
/// assert_eq!(narrowed.value(), 44);
/// ```
#[must_use]
pub fn cast<T, S>(source: &S) -> T
where
    T: TypedValue,
    S: IecAny + ExplicitCast<T>,
{
    let target = try_cast(source);
    // Every `ExplicitCast` pair has a cell conversion.
    debug_assert!(target.is_ok(), "cast marker without conversion: {target:?}");
    target.unwrap_or_else(|err| {
        warn!(from = %source.data_type_id(), to = %T::TYPE_ID, %err, "cast failed, using default");
        T::default()
    })
}

/// Conversion of any value to `T`, checked at run time.
///
/// # Errors
///
/// Returns [`NotCastable`](plc_common::error::DataTypeError::NotCastable) when `source` has no conversion
/// to `T`.
pub fn try_cast<T: TypedValue>(source: &dyn IecAny) -> DataTypeResult<T> {
    let mut target = T::default();
    target.set_value(source)?;
    Ok(target)
}

/// Lossless conversion of `source` to `T`.
///
/// ```
/// use plc_datatypes::cast::implicit_cast;
/// use plc_datatypes::leaf::{Int, LReal};
///
/// let widened: LReal = implicit_cast(&Int::new(-300));
/// assert_eq!(widened.value(), -300.0);
/// ```
///
/// Narrowing is rejected at compile time:
///
/// ```compile_fail
/// use plc_datatypes::cast::implicit_cast;
/// use plc_datatypes::leaf::{Int, SInt};
///
/// let narrowed: SInt = implicit_cast(&Int::new(300));
/// ```
#[must_use]
pub fn implicit_cast<T, S>(source: &S) -> T
where
    T: TypedValue,
    S: IecAny + ImplicitCast<T>,
{
    cast(source)
}
