use crate::iec_types::DataTypeId;
use std::fmt;
use thiserror::Error;

/// Reason a textual literal was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// No literal found at the start of the input.
    Empty,
    /// Type prefix names a different type.
    PrefixMismatch,
    /// Digit not valid for the radix, or malformed number.
    InvalidNumber,
    /// Value does not fit the target type.
    OutOfRange,
    /// Unknown keyword (e.g. not TRUE/FALSE).
    InvalidKeyword,
    /// Missing or unterminated quote.
    UnterminatedString,
    /// Invalid `$` escape sequence.
    InvalidEscape,
    /// Character not representable in the target character set.
    InvalidCharacter,
    /// Calendar field out of range.
    InvalidDate,
    /// Malformed duration component.
    InvalidDuration,
    /// Unexpected characters after the literal.
    TrailingInput,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Empty => "empty literal",
            Self::PrefixMismatch => "type prefix does not match",
            Self::InvalidNumber => "invalid number",
            Self::OutOfRange => "value out of range",
            Self::InvalidKeyword => "invalid keyword",
            Self::UnterminatedString => "unterminated string",
            Self::InvalidEscape => "invalid escape sequence",
            Self::InvalidCharacter => "character not representable",
            Self::InvalidDate => "invalid date or time of day",
            Self::InvalidDuration => "invalid duration",
            Self::TrailingInput => "unexpected trailing input",
        };
        f.write_str(text)
    }
}

/// Reason a wire frame could not be encoded or decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireErrorKind {
    /// Input ended before the frame was complete.
    Truncated,
    /// Tag byte does not match the expected type.
    UnexpectedTag(u8),
    /// Type has no wire encoding.
    Unsupported,
    /// String longer than the configured maximum.
    StringTooLong,
}

impl fmt::Display for WireErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated => f.write_str("truncated frame"),
            Self::UnexpectedTag(tag) => write!(f, "unexpected tag 0x{tag:02X}"),
            Self::Unsupported => f.write_str("type has no wire encoding"),
            Self::StringTooLong => f.write_str("string exceeds maximum length"),
        }
    }
}

/// Errors of the data type layer.
///
/// Every fallible operation reports through this type; none of them panic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataTypeError {
    /// Textual literal could not be parsed.
    #[error("cannot parse {type_id} literal: {kind}")]
    Parse {
        /// Type that attempted the parse.
        type_id: DataTypeId,
        /// Reason.
        kind: ParseErrorKind,
    },

    /// Caller buffer cannot hold the rendered literal.
    #[error("buffer too small: {required} bytes required, {available} available")]
    BufferTooSmall {
        /// Bytes needed including the terminator.
        required: usize,
        /// Bytes provided.
        available: usize,
    },

    /// No conversion exists between the two types.
    #[error("{from} is not castable to {to}")]
    NotCastable {
        /// Source type.
        from: DataTypeId,
        /// Destination type.
        to: DataTypeId,
    },

    /// Conversion exists but may lose data and was not explicitly requested.
    #[error("conversion from {from} to {to} requires an explicit cast")]
    ExplicitCastRequired {
        /// Source type.
        from: DataTypeId,
        /// Destination type.
        to: DataTypeId,
    },

    /// Numeric code is not a known type id.
    #[error("unknown data type id {0}")]
    UnknownTypeId(u16),

    /// Name does not resolve to a known type.
    #[error("unknown type name: {0}")]
    UnknownTypeName(String),

    /// Compact wire encoding failure.
    #[error("wire encoding error: {0}")]
    Wire(WireErrorKind),
}

impl DataTypeError {
    /// Shorthand for a parse failure.
    #[must_use]
    pub fn parse(type_id: DataTypeId, kind: ParseErrorKind) -> Self {
        Self::Parse { type_id, kind }
    }
}

/// Convenience type alias for data type operations.
pub type DataTypeResult<T> = Result<T, DataTypeError>;
