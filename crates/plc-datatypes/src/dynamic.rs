//! Values whose type is only known at run time.
//!
//! [`AnyValue`] holds any built-in value by value, so engineering tools and
//! connection setup can create, parse and convert values from a
//! [`DataTypeId`] without knowing the concrete Rust type.

use std::fmt;

use tracing::{debug, trace};

use plc_common::config::CastPolicy;
use plc_common::error::{DataTypeError, DataTypeResult, ParseErrorKind};
use plc_common::iec_types::{DataTypeId, TypeClass};

use crate::any::{downcast_ref, IecAny};
use crate::cast::{is_castable, Castability};
use crate::leaf::{
    AnyVariant, Bool, Byte, Char, DInt, DWord, Date, DateAndTime, IecString, IecWString, Int, LDate,
    LDateAndTime, LInt, LReal, LTime, LTimeOfDay, LWord, Real, SInt, Time, TimeOfDay, UDInt, UInt, ULInt,
    USInt, WChar, Word,
};

macro_rules! any_value {
    ($($variant:ident($ty:ty) = $id:ident),* $(,)?) => {
        /// Any built-in value.
        #[derive(Debug, Clone)]
        pub enum AnyValue {
            $(
                #[doc = concat!("A `", stringify!($id), "` value.")]
                $variant($ty),
            )*
        }

        impl AnyValue {
            /// Default value of `type_id`. `ANY` yields an empty [`AnyVariant`].
            ///
            /// # Errors
            ///
            /// Returns [`DataTypeError::UnknownTypeId`] for structural and
            /// external ids, which have no built-in representation.
            pub fn new(type_id: DataTypeId) -> DataTypeResult<Self> {
                match type_id {
                    $(DataTypeId::$id => Ok(Self::$variant(<$ty>::default())),)*
                    other => Err(DataTypeError::UnknownTypeId(other.code())),
                }
            }

            /// Copy of a value behind a trait object.
            ///
            /// # Errors
            ///
            /// Returns [`DataTypeError::UnknownTypeId`] when the value is not
            /// one of the built-in types.
            pub fn from_dyn(value: &dyn IecAny) -> DataTypeResult<Self> {
                $(
                    if let Some(value) = downcast_ref::<$ty>(value) {
                        return Ok(Self::$variant(value.clone()));
                    }
                )*
                Err(DataTypeError::UnknownTypeId(value.data_type_id().code()))
            }

            /// View as a trait object.
            #[must_use]
            pub fn as_dyn(&self) -> &dyn IecAny {
                match self {
                    $(Self::$variant(value) => value,)*
                }
            }

            /// Mutable view as a trait object.
            pub fn as_dyn_mut(&mut self) -> &mut dyn IecAny {
                match self {
                    $(Self::$variant(value) => value,)*
                }
            }
        }

        $(
            impl From<$ty> for AnyValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

any_value! {
    Bool(Bool) = Bool,
    SInt(SInt) = SInt,
    Int(Int) = Int,
    DInt(DInt) = DInt,
    LInt(LInt) = LInt,
    USInt(USInt) = USInt,
    UInt(UInt) = UInt,
    UDInt(UDInt) = UDInt,
    ULInt(ULInt) = ULInt,
    Byte(Byte) = Byte,
    Word(Word) = Word,
    DWord(DWord) = DWord,
    LWord(LWord) = LWord,
    Real(Real) = Real,
    LReal(LReal) = LReal,
    Char(Char) = Char,
    WChar(WChar) = WChar,
    Time(Time) = Time,
    LTime(LTime) = LTime,
    Date(Date) = Date,
    LDate(LDate) = LDate,
    TimeOfDay(TimeOfDay) = TimeOfDay,
    LTimeOfDay(LTimeOfDay) = LTimeOfDay,
    DateAndTime(DateAndTime) = DateAndTime,
    LDateAndTime(LDateAndTime) = LDateAndTime,
    String(IecString) = String,
    WString(IecWString) = WString,
    Variant(AnyVariant) = Any,
}

/// Type prefix written before a value's literal when it is shown without
/// context. Temporal and string literals identify their type on their own.
#[must_use]
pub fn typed_literal_prefix(type_id: DataTypeId) -> Option<&'static str> {
    match type_id.class() {
        TypeClass::Bool
        | TypeClass::SignedInt
        | TypeClass::UnsignedInt
        | TypeClass::BitString
        | TypeClass::Real
        | TypeClass::Char => Some(type_id.name()),
        _ => None,
    }
}

impl AnyValue {
    /// Type id of the held value.
    #[must_use]
    pub fn data_type_id(&self) -> DataTypeId {
        self.as_dyn().data_type_id()
    }

    /// Parse a self-describing literal from the start of `text`.
    ///
    /// The type comes from the `TYPE#` prefix, from the quote character of
    /// a string (`'` STRING, `"` WSTRING) or from a bare `TRUE`/`FALSE`.
    /// Leading whitespace is skipped. Returns the value and the bytes
    /// consumed.
    ///
    /// # Errors
    ///
    /// Returns [`DataTypeError::UnknownTypeName`] for an unknown prefix and
    /// a parse error when the type cannot be determined or the literal is
    /// invalid.
    pub fn parse_literal(text: &str) -> DataTypeResult<(Self, usize)> {
        let untyped = |kind| DataTypeError::parse(DataTypeId::Any, kind);
        let trimmed = text.trim_start();
        let skipped = text.len() - trimmed.len();
        let bytes = trimmed.as_bytes();

        let type_id = match bytes.first() {
            None => return Err(untyped(ParseErrorKind::Empty)),
            Some(b'\'') => DataTypeId::String,
            Some(b'"') => DataTypeId::WString,
            Some(first) if first.is_ascii_alphabetic() => {
                let ident_len = bytes
                    .iter()
                    .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                    .count();
                let ident = &trimmed[..ident_len];
                if bytes.get(ident_len) == Some(&b'#') {
                    match DataTypeId::from_name(ident) {
                        Some(DataTypeId::Any) | None => {
                            return Err(DataTypeError::UnknownTypeName(ident.to_owned()))
                        }
                        Some(id) => id,
                    }
                } else if ident.eq_ignore_ascii_case("TRUE") || ident.eq_ignore_ascii_case("FALSE") {
                    DataTypeId::Bool
                } else {
                    return Err(untyped(ParseErrorKind::PrefixMismatch));
                }
            }
            Some(_) => return Err(untyped(ParseErrorKind::PrefixMismatch)),
        };

        let mut value = Self::new(type_id)?;
        let len = value.as_dyn_mut().from_iec_string(trimmed)?;
        trace!(%type_id, len = skipped + len, "parse_literal");
        Ok((value, skipped + len))
    }

    /// Parse a complete self-describing literal such as `INT#5`,
    /// `T#1h30m` or `'text'`. Surrounding whitespace is allowed.
    ///
    /// # Errors
    ///
    /// As [`AnyValue::parse_literal`], plus
    /// [`ParseErrorKind::TrailingInput`] when text follows the literal.
    pub fn parse_typed(text: &str) -> DataTypeResult<Self> {
        let (value, len) = Self::parse_literal(text)?;
        if !text[len..].trim().is_empty() {
            return Err(DataTypeError::parse(value.data_type_id(), ParseErrorKind::TrailingInput));
        }
        Ok(value)
    }

    /// Parse the literal of a known type. The type prefix is optional.
    ///
    /// # Errors
    ///
    /// Returns a parse error for invalid or incomplete literals and
    /// [`DataTypeError::UnknownTypeId`] for ids without a built-in type.
    pub fn parse_as(type_id: DataTypeId, text: &str) -> DataTypeResult<Self> {
        let mut value = Self::new(type_id)?;
        let trimmed = text.trim();
        let len = value.as_dyn_mut().from_iec_string(trimmed)?;
        if len != trimmed.len() {
            return Err(DataTypeError::parse(type_id, ParseErrorKind::TrailingInput));
        }
        Ok(value)
    }
}

impl PartialEq for AnyValue {
    fn eq(&self, other: &Self) -> bool {
        self.as_dyn().equals(other.as_dyn())
    }
}

impl fmt::Display for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = typed_literal_prefix(self.data_type_id()) {
            write!(f, "{prefix}#")?;
        }
        match self {
            Self::Bool(value) => fmt::Display::fmt(value, f),
            Self::SInt(value) => fmt::Display::fmt(value, f),
            Self::Int(value) => fmt::Display::fmt(value, f),
            Self::DInt(value) => fmt::Display::fmt(value, f),
            Self::LInt(value) => fmt::Display::fmt(value, f),
            Self::USInt(value) => fmt::Display::fmt(value, f),
            Self::UInt(value) => fmt::Display::fmt(value, f),
            Self::UDInt(value) => fmt::Display::fmt(value, f),
            Self::ULInt(value) => fmt::Display::fmt(value, f),
            Self::Byte(value) => fmt::Display::fmt(value, f),
            Self::Word(value) => fmt::Display::fmt(value, f),
            Self::DWord(value) => fmt::Display::fmt(value, f),
            Self::LWord(value) => fmt::Display::fmt(value, f),
            Self::Real(value) => fmt::Display::fmt(value, f),
            Self::LReal(value) => fmt::Display::fmt(value, f),
            Self::Char(value) => fmt::Display::fmt(value, f),
            Self::WChar(value) => fmt::Display::fmt(value, f),
            Self::Time(value) => fmt::Display::fmt(value, f),
            Self::LTime(value) => fmt::Display::fmt(value, f),
            Self::Date(value) => fmt::Display::fmt(value, f),
            Self::LDate(value) => fmt::Display::fmt(value, f),
            Self::TimeOfDay(value) => fmt::Display::fmt(value, f),
            Self::LTimeOfDay(value) => fmt::Display::fmt(value, f),
            Self::DateAndTime(value) => fmt::Display::fmt(value, f),
            Self::LDateAndTime(value) => fmt::Display::fmt(value, f),
            Self::String(value) => fmt::Display::fmt(value, f),
            Self::WString(value) => fmt::Display::fmt(value, f),
            Self::Variant(value) => fmt::Display::fmt(value, f),
        }
    }
}

/// Convert `source` into a new value of type `to`.
///
/// Any castable pair is converted, including down-casts; use
/// [`validate_connection`] to apply a cast policy first.
///
/// # Errors
///
/// Returns [`DataTypeError::NotCastable`] when the pair is not castable and
/// [`DataTypeError::UnknownTypeId`] when `to` has no built-in type.
pub fn cast_value(source: &dyn IecAny, to: DataTypeId) -> DataTypeResult<AnyValue> {
    let source = source.unwrap_any();
    let from = source.data_type_id();
    if to != DataTypeId::Any && !is_castable(from, to).is_allowed() {
        debug!(%from, %to, "cast_value rejected");
        return Err(DataTypeError::NotCastable { from, to });
    }
    let mut target = AnyValue::new(to)?;
    target.as_dyn_mut().set_value(source)?;
    Ok(target)
}

/// Check that a connection from `from` to `to` is permitted under `policy`.
///
/// # Errors
///
/// Returns [`DataTypeError::NotCastable`] when no conversion exists and
/// [`DataTypeError::ExplicitCastRequired`] for a down-cast under
/// [`CastPolicy::ImplicitOnly`].
pub fn validate_connection(from: DataTypeId, to: DataTypeId, policy: CastPolicy) -> DataTypeResult<Castability> {
    let castability = is_castable(from, to);
    debug!(%from, %to, ?castability, ?policy, "validate_connection");
    match castability {
        Castability::NotCastable => Err(DataTypeError::NotCastable { from, to }),
        Castability::DownCast if policy == CastPolicy::ImplicitOnly => {
            Err(DataTypeError::ExplicitCastRequired { from, to })
        }
        allowed => Ok(allowed),
    }
}
