//! IEC 61131-3 elementary type aliases and the type identity table.
//!
//! The identifiers follow IEC 61499-1 Annex F (transfer syntaxes): the
//! numeric code of every [`DataTypeId`] is stable and is used directly by
//! the compact wire encoding.

#![allow(non_camel_case_types)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Underlying representation of the IEC elementary types.
pub type BOOL = bool;
pub type BYTE = u8;
pub type WORD = u16;
pub type DWORD = u32;
pub type LWORD = u64;

pub type SINT = i8;
pub type INT = i16;
pub type DINT = i32;
pub type LINT = i64;

pub type USINT = u8;
pub type UINT = u16;
pub type UDINT = u32;
pub type ULINT = u64;

pub type REAL = f32;
pub type LREAL = f64;

pub type CHAR = u8;
pub type WCHAR = u16;

/// TIME and LTIME are signed durations in nanoseconds.
pub type TIME = i64;
pub type LTIME = i64;

/// DATE, TIME_OF_DAY and DATE_AND_TIME (and their long forms) are unsigned
/// nanosecond counts since the Unix epoch (or since midnight for TOD).
pub type DATE = u64;
pub type TOD = u64;
pub type DT = u64;

/// First code available to data types registered outside the fixed set.
pub const EXTERNAL_TYPE_BASE: u16 = 256;

/// Sentinel code guaranteeing a 16-bit representation; never a valid id.
pub const MAX_TYPE_CODE: u16 = u16::MAX;

/// IEC memory footprint in bytes, indexed by type code.
const IEC_MEMORY_SIZE: [usize; 34] = [
    0, // ANY
    1, // BOOL
    1, 2, 4, 8, // SINT INT DINT LINT
    1, 2, 4, 8, // USINT UINT UDINT ULINT
    1, 2, 4, 8, // BYTE WORD DWORD LWORD
    8, 8, 8, 8, // DATE TIME_OF_DAY DATE_AND_TIME TIME
    1, 2, // CHAR WCHAR
    8, 8, 8, 8, // LDATE LTIME_OF_DAY LDATE_AND_TIME LTIME
    4, 8, // REAL LREAL
    0, 0, // STRING WSTRING
    0, 0, 0, 0, 0, 0, // structural markers
];

/// Data type identifier.
///
/// The set is closed. Ids at or above [`EXTERNAL_TYPE_BASE`] are carried as
/// [`DataTypeId::External`] and are only meaningful to the extension that
/// registered them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DataTypeId {
    #[serde(rename = "ANY")]
    Any,
    #[serde(rename = "BOOL")]
    Bool,
    #[serde(rename = "SINT")]
    SInt,
    #[serde(rename = "INT")]
    Int,
    #[serde(rename = "DINT")]
    DInt,
    #[serde(rename = "LINT")]
    LInt,
    #[serde(rename = "USINT")]
    USInt,
    #[serde(rename = "UINT")]
    UInt,
    #[serde(rename = "UDINT")]
    UDInt,
    #[serde(rename = "ULINT")]
    ULInt,
    #[serde(rename = "BYTE")]
    Byte,
    #[serde(rename = "WORD")]
    Word,
    #[serde(rename = "DWORD")]
    DWord,
    #[serde(rename = "LWORD")]
    LWord,
    #[serde(rename = "DATE")]
    Date,
    #[serde(rename = "TIME_OF_DAY")]
    TimeOfDay,
    #[serde(rename = "DATE_AND_TIME")]
    DateAndTime,
    #[serde(rename = "TIME")]
    Time,
    #[serde(rename = "CHAR")]
    Char,
    #[serde(rename = "WCHAR")]
    WChar,
    #[serde(rename = "LDATE")]
    LDate,
    #[serde(rename = "LTIME_OF_DAY")]
    LTimeOfDay,
    #[serde(rename = "LDATE_AND_TIME")]
    LDateAndTime,
    #[serde(rename = "LTIME")]
    LTime,
    #[serde(rename = "REAL")]
    Real,
    #[serde(rename = "LREAL")]
    LReal,
    #[serde(rename = "STRING")]
    String,
    #[serde(rename = "WSTRING")]
    WString,
    DerivedData,
    DirectlyDerivedData,
    EnumeratedData,
    SubrangeData,
    #[serde(rename = "ARRAY")]
    Array,
    #[serde(rename = "STRUCT")]
    Struct,
    /// Type registered by a runtime extension (code >= 256).
    #[serde(rename = "EXTERNAL")]
    External(u16),
}

/// Coarse classification used by the cast matrix and the literal parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    Any,
    Bool,
    SignedInt,
    UnsignedInt,
    BitString,
    Char,
    Real,
    Duration,
    Date,
    TimeOfDay,
    DateAndTime,
    String,
    Structural,
    External,
}

const FIXED_IDS: [DataTypeId; 34] = [
    DataTypeId::Any,
    DataTypeId::Bool,
    DataTypeId::SInt,
    DataTypeId::Int,
    DataTypeId::DInt,
    DataTypeId::LInt,
    DataTypeId::USInt,
    DataTypeId::UInt,
    DataTypeId::UDInt,
    DataTypeId::ULInt,
    DataTypeId::Byte,
    DataTypeId::Word,
    DataTypeId::DWord,
    DataTypeId::LWord,
    DataTypeId::Date,
    DataTypeId::TimeOfDay,
    DataTypeId::DateAndTime,
    DataTypeId::Time,
    DataTypeId::Char,
    DataTypeId::WChar,
    DataTypeId::LDate,
    DataTypeId::LTimeOfDay,
    DataTypeId::LDateAndTime,
    DataTypeId::LTime,
    DataTypeId::Real,
    DataTypeId::LReal,
    DataTypeId::String,
    DataTypeId::WString,
    DataTypeId::DerivedData,
    DataTypeId::DirectlyDerivedData,
    DataTypeId::EnumeratedData,
    DataTypeId::SubrangeData,
    DataTypeId::Array,
    DataTypeId::Struct,
];

impl DataTypeId {
    /// All ids of the fixed set, in code order.
    pub const FIXED: &'static [DataTypeId] = &FIXED_IDS;

    /// Numeric code of this id.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Any => 0,
            Self::Bool => 1,
            Self::SInt => 2,
            Self::Int => 3,
            Self::DInt => 4,
            Self::LInt => 5,
            Self::USInt => 6,
            Self::UInt => 7,
            Self::UDInt => 8,
            Self::ULInt => 9,
            Self::Byte => 10,
            Self::Word => 11,
            Self::DWord => 12,
            Self::LWord => 13,
            Self::Date => 14,
            Self::TimeOfDay => 15,
            Self::DateAndTime => 16,
            Self::Time => 17,
            Self::Char => 18,
            Self::WChar => 19,
            Self::LDate => 20,
            Self::LTimeOfDay => 21,
            Self::LDateAndTime => 22,
            Self::LTime => 23,
            Self::Real => 24,
            Self::LReal => 25,
            Self::String => 26,
            Self::WString => 27,
            Self::DerivedData => 28,
            Self::DirectlyDerivedData => 29,
            Self::EnumeratedData => 30,
            Self::SubrangeData => 31,
            Self::Array => 32,
            Self::Struct => 33,
            Self::External(code) => code,
        }
    }

    /// Resolve a numeric code. Reserved gaps and the `Max` sentinel are rejected.
    #[must_use]
    pub fn from_code(code: u16) -> Option<Self> {
        if code == MAX_TYPE_CODE {
            return None;
        }
        if code >= EXTERNAL_TYPE_BASE {
            return Some(Self::External(code));
        }
        FIXED_IDS.get(usize::from(code)).copied()
    }

    /// IEC memory size in bytes; 0 for variable-length, structural and external ids.
    #[must_use]
    pub fn iec_memory_size(self) -> usize {
        iec_memory_size_of_code(self.code())
    }

    /// Ids up to LTIME are pure bit patterns without owned data.
    #[must_use]
    pub const fn is_trivially_copyable(self) -> bool {
        self.code() <= DataTypeId::LTime.code()
    }

    /// Classification of this id.
    #[must_use]
    pub const fn class(self) -> TypeClass {
        match self {
            Self::Any => TypeClass::Any,
            Self::Bool => TypeClass::Bool,
            Self::SInt | Self::Int | Self::DInt | Self::LInt => TypeClass::SignedInt,
            Self::USInt | Self::UInt | Self::UDInt | Self::ULInt => TypeClass::UnsignedInt,
            Self::Byte | Self::Word | Self::DWord | Self::LWord => TypeClass::BitString,
            Self::Char | Self::WChar => TypeClass::Char,
            Self::Real | Self::LReal => TypeClass::Real,
            Self::Time | Self::LTime => TypeClass::Duration,
            Self::Date | Self::LDate => TypeClass::Date,
            Self::TimeOfDay | Self::LTimeOfDay => TypeClass::TimeOfDay,
            Self::DateAndTime | Self::LDateAndTime => TypeClass::DateAndTime,
            Self::String | Self::WString => TypeClass::String,
            Self::DerivedData
            | Self::DirectlyDerivedData
            | Self::EnumeratedData
            | Self::SubrangeData
            | Self::Array
            | Self::Struct => TypeClass::Structural,
            Self::External(_) => TypeClass::External,
        }
    }

    /// Width of the value in bits (BOOL is 1); 0 for non-scalar ids.
    #[must_use]
    pub const fn bit_width(self) -> u32 {
        match self {
            Self::Bool => 1,
            Self::SInt | Self::USInt | Self::Byte | Self::Char => 8,
            Self::Int | Self::UInt | Self::Word | Self::WChar => 16,
            Self::DInt | Self::UDInt | Self::DWord | Self::Real => 32,
            Self::LInt
            | Self::ULInt
            | Self::LWord
            | Self::LReal
            | Self::Time
            | Self::LTime
            | Self::Date
            | Self::LDate
            | Self::TimeOfDay
            | Self::LTimeOfDay
            | Self::DateAndTime
            | Self::LDateAndTime => 64,
            _ => 0,
        }
    }

    /// True for the `L`-prefixed temporal variants.
    #[must_use]
    pub const fn is_long_temporal(self) -> bool {
        matches!(
            self,
            Self::LTime | Self::LDate | Self::LTimeOfDay | Self::LDateAndTime
        )
    }

    /// Canonical IEC name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Any => "ANY",
            Self::Bool => "BOOL",
            Self::SInt => "SINT",
            Self::Int => "INT",
            Self::DInt => "DINT",
            Self::LInt => "LINT",
            Self::USInt => "USINT",
            Self::UInt => "UINT",
            Self::UDInt => "UDINT",
            Self::ULInt => "ULINT",
            Self::Byte => "BYTE",
            Self::Word => "WORD",
            Self::DWord => "DWORD",
            Self::LWord => "LWORD",
            Self::Date => "DATE",
            Self::TimeOfDay => "TIME_OF_DAY",
            Self::DateAndTime => "DATE_AND_TIME",
            Self::Time => "TIME",
            Self::Char => "CHAR",
            Self::WChar => "WCHAR",
            Self::LDate => "LDATE",
            Self::LTimeOfDay => "LTIME_OF_DAY",
            Self::LDateAndTime => "LDATE_AND_TIME",
            Self::LTime => "LTIME",
            Self::Real => "REAL",
            Self::LReal => "LREAL",
            Self::String => "STRING",
            Self::WString => "WSTRING",
            Self::DerivedData => "DerivedData",
            Self::DirectlyDerivedData => "DirectlyDerivedData",
            Self::EnumeratedData => "EnumeratedData",
            Self::SubrangeData => "SubrangeData",
            Self::Array => "ARRAY",
            Self::Struct => "STRUCT",
            Self::External(_) => "EXTERNAL",
        }
    }

    /// Resolve a type name or literal prefix (case-insensitive).
    ///
    /// Accepts canonical names (`TIME_OF_DAY`) as well as the short literal
    /// prefixes `T`, `LT`, `D`, `LD`, `TOD`, `LTOD`, `DT` and `LDT`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let alias = match name.to_ascii_uppercase().as_str() {
            "T" => Some(Self::Time),
            "LT" => Some(Self::LTime),
            "D" => Some(Self::Date),
            "LD" => Some(Self::LDate),
            "TOD" => Some(Self::TimeOfDay),
            "LTOD" => Some(Self::LTimeOfDay),
            "DT" => Some(Self::DateAndTime),
            "LDT" => Some(Self::LDateAndTime),
            _ => None,
        };
        alias.or_else(|| {
            FIXED_IDS
                .iter()
                .copied()
                .find(|id| id.name().eq_ignore_ascii_case(name))
        })
    }
}

impl fmt::Display for DataTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::External(code) => write!(f, "EXTERNAL({code})"),
            other => f.write_str(other.name()),
        }
    }
}

/// IEC memory size for a raw type code; 0 when the code is outside the table.
#[must_use]
pub fn iec_memory_size_of_code(code: u16) -> usize {
    IEC_MEMORY_SIZE.get(usize::from(code)).copied().unwrap_or(0)
}
