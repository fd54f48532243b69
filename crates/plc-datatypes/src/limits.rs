//! Numeric limits of the scalar types.
//!
//! [`PrimitiveLimits`] describes the Rust primitive behind a leaf;
//! [`NumericLimits`] forwards every constant and wraps every value in the
//! leaf type, so `NumericLimits::<Int>::max()` is an `Int`.

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;

use plc_common::iec_types::DataTypeId;

use crate::leaf::{
    Bool, Byte, Char, DInt, DWord, Date, DateAndTime, Int, LDate, LDateAndTime, LInt, LReal, LTime, LTimeOfDay,
    LWord, Real, SInt, ScalarValue, Time, TimeOfDay, UDInt, UInt, ULInt, USInt, WChar, Word,
};

/// Rounding behaviour of arithmetic on a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStyle {
    /// Not determinable.
    Indeterminate,
    /// Truncation.
    TowardZero,
    /// Round to the nearest representable value.
    ToNearest,
    /// Round toward positive infinity.
    TowardInfinity,
    /// Round toward negative infinity.
    TowardNegInfinity,
}

/// Whether a type has subnormal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenormStyle {
    /// Not determinable.
    Indeterminate,
    /// No subnormal values.
    Absent,
    /// Subnormal values exist.
    Present,
}

/// Limits of a primitive representation.
#[allow(missing_docs)]
pub trait PrimitiveLimits: Copy {
    const IS_SPECIALIZED: bool = true;
    const DIGITS: u32;
    const DIGITS10: u32;
    const MAX_DIGITS10: u32 = 0;
    const IS_SIGNED: bool;
    const IS_INTEGER: bool;
    const IS_EXACT: bool;
    const RADIX: u32 = 2;
    const MIN_EXPONENT: i32 = 0;
    const MIN_EXPONENT10: i32 = 0;
    const MAX_EXPONENT: i32 = 0;
    const MAX_EXPONENT10: i32 = 0;
    const HAS_INFINITY: bool = false;
    const HAS_QUIET_NAN: bool = false;
    const HAS_SIGNALING_NAN: bool = false;
    const HAS_DENORM: DenormStyle = DenormStyle::Absent;
    const HAS_DENORM_LOSS: bool = false;
    const IS_IEC559: bool = false;
    const IS_BOUNDED: bool = true;
    const IS_MODULO: bool;
    const TRAPS: bool;
    const TINYNESS_BEFORE: bool = false;
    const ROUND_STYLE: RoundStyle = RoundStyle::TowardZero;

    /// Smallest finite value for integers, smallest positive normal value
    /// for floats.
    fn min_value() -> Self;
    fn max_value() -> Self;
    /// Most negative finite value.
    fn lowest() -> Self;
    fn epsilon() -> Self;
    fn round_error() -> Self;
    fn infinity() -> Self;
    fn quiet_nan() -> Self;
    fn signaling_nan() -> Self;
    fn denorm_min() -> Self;
}

impl PrimitiveLimits for bool {
    const DIGITS: u32 = 1;
    const DIGITS10: u32 = 0;
    const IS_SIGNED: bool = false;
    const IS_INTEGER: bool = true;
    const IS_EXACT: bool = true;
    const IS_MODULO: bool = false;
    const TRAPS: bool = false;

    fn min_value() -> Self {
        false
    }
    fn max_value() -> Self {
        true
    }
    fn lowest() -> Self {
        false
    }
    fn epsilon() -> Self {
        false
    }
    fn round_error() -> Self {
        false
    }
    fn infinity() -> Self {
        false
    }
    fn quiet_nan() -> Self {
        false
    }
    fn signaling_nan() -> Self {
        false
    }
    fn denorm_min() -> Self {
        false
    }
}

macro_rules! integer_limits {
    ($($prim:ty => digits10 $digits10:expr;)*) => {
        $(
            impl PrimitiveLimits for $prim {
                const DIGITS: u32 = <$prim>::BITS - (<$prim>::MIN != 0) as u32;
                const DIGITS10: u32 = $digits10;
                const IS_SIGNED: bool = <$prim>::MIN != 0;
                const IS_INTEGER: bool = true;
                const IS_EXACT: bool = true;
                const IS_MODULO: bool = <$prim>::MIN == 0;
                const TRAPS: bool = true;

                fn min_value() -> Self {
                    <$prim>::MIN
                }
                fn max_value() -> Self {
                    <$prim>::MAX
                }
                fn lowest() -> Self {
                    <$prim>::MIN
                }
                fn epsilon() -> Self {
                    0
                }
                fn round_error() -> Self {
                    0
                }
                fn infinity() -> Self {
                    0
                }
                fn quiet_nan() -> Self {
                    0
                }
                fn signaling_nan() -> Self {
                    0
                }
                fn denorm_min() -> Self {
                    0
                }
            }
        )*
    };
}

integer_limits! {
    i8 => digits10 2;
    i16 => digits10 4;
    i32 => digits10 9;
    i64 => digits10 18;
    u8 => digits10 2;
    u16 => digits10 4;
    u32 => digits10 9;
    u64 => digits10 19;
}

macro_rules! float_limits {
    ($prim:ty, digits $digits:expr, digits10 $digits10:expr, max_digits10 $max_digits10:expr,
     exponent $min_exp:expr, $max_exp:expr, exponent10 $min_exp10:expr, $max_exp10:expr, snan $snan:expr) => {
        impl PrimitiveLimits for $prim {
            const DIGITS: u32 = $digits;
            const DIGITS10: u32 = $digits10;
            const MAX_DIGITS10: u32 = $max_digits10;
            const IS_SIGNED: bool = true;
            const IS_INTEGER: bool = false;
            const IS_EXACT: bool = false;
            const MIN_EXPONENT: i32 = $min_exp;
            const MIN_EXPONENT10: i32 = $min_exp10;
            const MAX_EXPONENT: i32 = $max_exp;
            const MAX_EXPONENT10: i32 = $max_exp10;
            const HAS_INFINITY: bool = true;
            const HAS_QUIET_NAN: bool = true;
            const HAS_SIGNALING_NAN: bool = true;
            const HAS_DENORM: DenormStyle = DenormStyle::Present;
            const IS_IEC559: bool = true;
            const IS_MODULO: bool = false;
            const TRAPS: bool = false;
            const ROUND_STYLE: RoundStyle = RoundStyle::ToNearest;

            fn min_value() -> Self {
                <$prim>::MIN_POSITIVE
            }
            fn max_value() -> Self {
                <$prim>::MAX
            }
            fn lowest() -> Self {
                <$prim>::MIN
            }
            fn epsilon() -> Self {
                <$prim>::EPSILON
            }
            fn round_error() -> Self {
                0.5
            }
            fn infinity() -> Self {
                <$prim>::INFINITY
            }
            fn quiet_nan() -> Self {
                <$prim>::NAN
            }
            fn signaling_nan() -> Self {
                <$prim>::from_bits($snan)
            }
            fn denorm_min() -> Self {
                <$prim>::from_bits(1)
            }
        }
    };
}

float_limits!(f32, digits 24, digits10 6, max_digits10 9,
    exponent -125, 128, exponent10 -37, 38, snan 0x7FA0_0000);
float_limits!(f64, digits 53, digits10 15, max_digits10 17,
    exponent -1021, 1024, exponent10 -307, 308, snan 0x7FF4_0000_0000_0000);

/// Limits of a scalar leaf type, expressed in that type.
pub struct NumericLimits<T>(PhantomData<T>);

#[allow(missing_docs)]
impl<T> NumericLimits<T>
where
    T: ScalarValue,
    T::Value: PrimitiveLimits,
{
    pub const IS_SPECIALIZED: bool = <T::Value as PrimitiveLimits>::IS_SPECIALIZED;
    pub const DIGITS: u32 = <T::Value as PrimitiveLimits>::DIGITS;
    pub const DIGITS10: u32 = <T::Value as PrimitiveLimits>::DIGITS10;
    pub const MAX_DIGITS10: u32 = <T::Value as PrimitiveLimits>::MAX_DIGITS10;
    pub const IS_SIGNED: bool = <T::Value as PrimitiveLimits>::IS_SIGNED;
    pub const IS_INTEGER: bool = <T::Value as PrimitiveLimits>::IS_INTEGER;
    pub const IS_EXACT: bool = <T::Value as PrimitiveLimits>::IS_EXACT;
    pub const RADIX: u32 = <T::Value as PrimitiveLimits>::RADIX;
    pub const MIN_EXPONENT: i32 = <T::Value as PrimitiveLimits>::MIN_EXPONENT;
    pub const MIN_EXPONENT10: i32 = <T::Value as PrimitiveLimits>::MIN_EXPONENT10;
    pub const MAX_EXPONENT: i32 = <T::Value as PrimitiveLimits>::MAX_EXPONENT;
    pub const MAX_EXPONENT10: i32 = <T::Value as PrimitiveLimits>::MAX_EXPONENT10;
    pub const HAS_INFINITY: bool = <T::Value as PrimitiveLimits>::HAS_INFINITY;
    pub const HAS_QUIET_NAN: bool = <T::Value as PrimitiveLimits>::HAS_QUIET_NAN;
    pub const HAS_SIGNALING_NAN: bool = <T::Value as PrimitiveLimits>::HAS_SIGNALING_NAN;
    pub const HAS_DENORM: DenormStyle = <T::Value as PrimitiveLimits>::HAS_DENORM;
    pub const HAS_DENORM_LOSS: bool = <T::Value as PrimitiveLimits>::HAS_DENORM_LOSS;
    pub const IS_IEC559: bool = <T::Value as PrimitiveLimits>::IS_IEC559;
    pub const IS_BOUNDED: bool = <T::Value as PrimitiveLimits>::IS_BOUNDED;
    pub const IS_MODULO: bool = <T::Value as PrimitiveLimits>::IS_MODULO;
    pub const TRAPS: bool = <T::Value as PrimitiveLimits>::TRAPS;
    pub const TINYNESS_BEFORE: bool = <T::Value as PrimitiveLimits>::TINYNESS_BEFORE;
    pub const ROUND_STYLE: RoundStyle = <T::Value as PrimitiveLimits>::ROUND_STYLE;
    pub const BIT_LENGTH: u32 = T::BIT_LENGTH;

    #[must_use]
    pub fn min() -> T {
        T::new(<T::Value as PrimitiveLimits>::min_value())
    }

    #[must_use]
    pub fn max() -> T {
        T::new(<T::Value as PrimitiveLimits>::max_value())
    }

    #[must_use]
    pub fn lowest() -> T {
        T::new(<T::Value as PrimitiveLimits>::lowest())
    }

    #[must_use]
    pub fn epsilon() -> T {
        T::new(<T::Value as PrimitiveLimits>::epsilon())
    }

    #[must_use]
    pub fn round_error() -> T {
        T::new(<T::Value as PrimitiveLimits>::round_error())
    }

    #[must_use]
    pub fn infinity() -> T {
        T::new(<T::Value as PrimitiveLimits>::infinity())
    }

    #[must_use]
    pub fn quiet_nan() -> T {
        T::new(<T::Value as PrimitiveLimits>::quiet_nan())
    }

    #[must_use]
    pub fn signaling_nan() -> T {
        T::new(<T::Value as PrimitiveLimits>::signaling_nan())
    }

    #[must_use]
    pub fn denorm_min() -> T {
        T::new(<T::Value as PrimitiveLimits>::denorm_min())
    }
}

/// Limits of one type, with values rendered as IEC literals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitsSummary {
    /// Type described.
    pub type_id: DataTypeId,
    /// Width in bits.
    pub bit_length: u32,
    /// Radix digits representable without change.
    pub digits: u32,
    /// Decimal digits representable without change.
    pub digits10: u32,
    /// Whether negative values exist.
    pub is_signed: bool,
    /// Whether the type is an integer.
    pub is_integer: bool,
    /// Whether the type is IEEE-754.
    pub is_iec559: bool,
    /// Rounding of arithmetic results.
    pub round_style: RoundStyle,
    /// Smallest value (smallest positive normal for floats).
    pub min: String,
    /// Largest finite value.
    pub max: String,
    /// Most negative finite value.
    pub lowest: String,
    /// Difference between 1 and the next representable value.
    pub epsilon: String,
}

fn summarize<T>() -> LimitsSummary
where
    T: ScalarValue + fmt::Display,
    T::Value: PrimitiveLimits,
{
    LimitsSummary {
        type_id: T::TYPE_ID,
        bit_length: NumericLimits::<T>::BIT_LENGTH,
        digits: NumericLimits::<T>::DIGITS,
        digits10: NumericLimits::<T>::DIGITS10,
        is_signed: NumericLimits::<T>::IS_SIGNED,
        is_integer: NumericLimits::<T>::IS_INTEGER,
        is_iec559: NumericLimits::<T>::IS_IEC559,
        round_style: NumericLimits::<T>::ROUND_STYLE,
        min: NumericLimits::<T>::min().to_string(),
        max: NumericLimits::<T>::max().to_string(),
        lowest: NumericLimits::<T>::lowest().to_string(),
        epsilon: NumericLimits::<T>::epsilon().to_string(),
    }
}

/// Limits of a scalar type chosen at run time; `None` for non-scalar ids.
#[must_use]
pub fn limits_summary(type_id: DataTypeId) -> Option<LimitsSummary> {
    macro_rules! dispatch {
        ($($id:ident),*) => {
            match type_id {
                $(DataTypeId::$id => Some(summarize::<$id>()),)*
                _ => None,
            }
        };
    }
    dispatch!(
        Bool, SInt, Int, DInt, LInt, USInt, UInt, UDInt, ULInt, Byte, Word, DWord, LWord, Real, LReal, Char,
        WChar, Time, LTime, Date, LDate, TimeOfDay, LTimeOfDay, DateAndTime, LDateAndTime
    )
}
