//! Literal grammar for BOOL, the integer families and the reals.
//!
//! - BOOL: `TRUE`, `FALSE`, `1`, `0`, optionally `BOOL#`-prefixed
//! - integers: `[TYPE#][sign](digits | 2#.. | 8#.. | 16#..)`, `_` between digits
//! - bit-strings: as integers without a sign, rendered as `16#` hex
//! - reals: decimal or exponent form, `inf`, `nan`, `nan(16#payload)`

use std::fmt;

use plc_common::error::ParseErrorKind;
use plc_common::iec_types::{DataTypeId, TypeClass};

use crate::cell::ValueCell;
use crate::literal::{self, FloatLiteral};

use super::prefix_names;

type ParseResult = Result<(ValueCell, usize), ParseErrorKind>;

pub(crate) fn parse_bool(text: &str) -> ParseResult {
    let (body, prefix) = literal::strip_type_prefix(text, &["BOOL"])?;
    let word_len = body.bytes().take_while(u8::is_ascii_alphanumeric).count();
    let word = &body[..word_len];
    let value = if word.is_empty() {
        return Err(ParseErrorKind::Empty);
    } else if word.eq_ignore_ascii_case("TRUE") || word == "1" {
        true
    } else if word.eq_ignore_ascii_case("FALSE") || word == "0" {
        false
    } else {
        return Err(ParseErrorKind::InvalidKeyword);
    };
    let mut cell = ValueCell::ZERO;
    cell.set_bool(value);
    Ok((cell, prefix + word_len))
}

pub(crate) fn render_bool<W: fmt::Write + ?Sized>(cell: ValueCell, w: &mut W) -> fmt::Result {
    w.write_str(if cell.get_bool() { "TRUE" } else { "FALSE" })
}

pub(crate) fn parse_integer(type_id: DataTypeId, text: &str) -> ParseResult {
    let (body, prefix) = literal::strip_type_prefix(text, &prefix_names(type_id))?;
    let class = type_id.class();
    let width = type_id.bit_width();
    let lit = literal::scan_int(body, class != TypeClass::BitString)?;
    let bits = if class == TypeClass::SignedInt {
        lit.to_signed(width)? as u64
    } else {
        lit.to_unsigned(width)?
    };
    Ok((ValueCell::canonical(type_id, bits), prefix + lit.len))
}

pub(crate) fn render_integer<W: fmt::Write + ?Sized>(
    type_id: DataTypeId,
    cell: ValueCell,
    w: &mut W,
) -> fmt::Result {
    match type_id.class() {
        TypeClass::SignedInt => write!(w, "{}", cell.largest_int()),
        TypeClass::BitString => write!(w, "16#{:X}", cell.largest_uint()),
        _ => write!(w, "{}", cell.largest_uint()),
    }
}

/// Bit layout of an IEEE-754 binary format.
struct FloatLayout {
    sign: u64,
    exponent: u64,
    mantissa: u64,
}

impl FloatLayout {
    const SINGLE: Self = Self {
        sign: 1 << 31,
        exponent: 0x7F80_0000,
        mantissa: 0x007F_FFFF,
    };
    const DOUBLE: Self = Self {
        sign: 1 << 63,
        exponent: 0x7FF0_0000_0000_0000,
        mantissa: 0x000F_FFFF_FFFF_FFFF,
    };

    fn of(type_id: DataTypeId) -> Self {
        if type_id == DataTypeId::Real {
            Self::SINGLE
        } else {
            Self::DOUBLE
        }
    }

    /// Mantissa of the default quiet NaN.
    const fn quiet(&self) -> u64 {
        (self.mantissa + 1) >> 1
    }

    fn is_nan(&self, bits: u64) -> bool {
        bits & self.exponent == self.exponent && bits & self.mantissa != 0
    }

    fn nan_bits(&self, negative: bool, payload: Option<u64>) -> Result<u64, ParseErrorKind> {
        let mantissa = payload.unwrap_or(self.quiet());
        if mantissa == 0 || mantissa & !self.mantissa != 0 {
            return Err(ParseErrorKind::OutOfRange);
        }
        let sign = if negative { self.sign } else { 0 };
        Ok(sign | self.exponent | mantissa)
    }

    /// `NaN` for the default quiet NaN; sign and mantissa are spelled out
    /// otherwise.
    fn write_nan<W: fmt::Write + ?Sized>(&self, bits: u64, w: &mut W) -> fmt::Result {
        if bits & self.sign != 0 {
            w.write_char('-')?;
        }
        w.write_str("NaN")?;
        let mantissa = bits & self.mantissa;
        if mantissa != self.quiet() {
            write!(w, "(16#{mantissa:X})")?;
        }
        Ok(())
    }
}

pub(crate) fn parse_real(type_id: DataTypeId, text: &str) -> ParseResult {
    let (body, prefix) = literal::strip_type_prefix(text, &prefix_names(type_id))?;
    let layout = FloatLayout::of(type_id);
    let (bits, len) = if type_id == DataTypeId::Real {
        match literal::parse_float(body, f32::INFINITY, f32::NEG_INFINITY)? {
            (FloatLiteral::Number(value), len) => (u64::from(value.to_bits()), len),
            (FloatLiteral::NaN { negative, payload }, len) => (layout.nan_bits(negative, payload)?, len),
        }
    } else {
        match literal::parse_float(body, f64::INFINITY, f64::NEG_INFINITY)? {
            (FloatLiteral::Number(value), len) => (value.to_bits(), len),
            (FloatLiteral::NaN { negative, payload }, len) => (layout.nan_bits(negative, payload)?, len),
        }
    };
    Ok((ValueCell::canonical(type_id, bits), prefix + len))
}

/// Shortest form that reads back to the same value; always carries a `.`
/// or an exponent so it cannot be mistaken for an integer.
pub(crate) fn render_real<W: fmt::Write + ?Sized>(
    type_id: DataTypeId,
    cell: ValueCell,
    w: &mut W,
) -> fmt::Result {
    let layout = FloatLayout::of(type_id);
    if layout.is_nan(cell.bits()) {
        return layout.write_nan(cell.bits(), w);
    }
    if type_id == DataTypeId::Real {
        write!(w, "{:?}", cell.get_f32())
    } else {
        write!(w, "{:?}", cell.get_f64())
    }
}
