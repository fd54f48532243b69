//! Lexical helpers shared by the leaf literal parsers and renderers.
//!
//! Parsers work on the start of the input and report how many bytes they
//! consumed; callers decide whether trailing input is acceptable.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use plc_common::error::{DataTypeError, DataTypeResult, ParseErrorKind};

use crate::cell::low_mask;

type LexResult<T> = Result<T, ParseErrorKind>;

/// Strip an optional `NAME#` type prefix.
///
/// `names` lists the prefixes the caller accepts. An alphabetic prefix that
/// is not in the list is a [`ParseErrorKind::PrefixMismatch`]; numeric
/// prefixes (radix markers such as `16#`) are left in place.
pub(crate) fn strip_type_prefix<'a>(text: &'a str, names: &[&str]) -> LexResult<(&'a str, usize)> {
    let bytes = text.as_bytes();
    if !bytes.first().is_some_and(u8::is_ascii_alphabetic) {
        return Ok((text, 0));
    }
    let ident_len = bytes
        .iter()
        .take_while(|b| b.is_ascii_alphabetic() || **b == b'_')
        .count();
    if bytes.get(ident_len) != Some(&b'#') {
        return Ok((text, 0));
    }
    let ident = &text[..ident_len];
    if names.iter().any(|name| name.eq_ignore_ascii_case(ident)) {
        Ok((&text[ident_len + 1..], ident_len + 1))
    } else {
        Err(ParseErrorKind::PrefixMismatch)
    }
}

/// An integer literal as written, before it is fitted to a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IntLiteral {
    pub magnitude: u64,
    pub negative: bool,
    pub radix: u32,
    pub len: usize,
}

impl IntLiteral {
    /// Fit into a signed type of `bits` width. Radix literals are read as
    /// the two's complement pattern of that width.
    pub(crate) fn to_signed(self, bits: u32) -> LexResult<i64> {
        if self.radix != 10 {
            if self.magnitude > low_mask(bits) {
                return Err(ParseErrorKind::OutOfRange);
            }
            let shift = 64 - bits;
            return Ok(((self.magnitude << shift) as i64) >> shift);
        }
        let value = if self.negative {
            -i128::from(self.magnitude)
        } else {
            i128::from(self.magnitude)
        };
        let max = i128::from(low_mask(bits - 1));
        if value > max || value < -max - 1 {
            return Err(ParseErrorKind::OutOfRange);
        }
        Ok(value as i64)
    }

    /// Fit into an unsigned type of `bits` width. `-0` is accepted.
    pub(crate) fn to_unsigned(self, bits: u32) -> LexResult<u64> {
        if (self.negative && self.magnitude != 0) || self.magnitude > low_mask(bits) {
            return Err(ParseErrorKind::OutOfRange);
        }
        Ok(self.magnitude)
    }
}

/// Scan `[sign] digits` or `2#`/`8#`/`16#` radix literals with `_` separators.
pub(crate) fn scan_int(text: &str, allow_sign: bool) -> LexResult<IntLiteral> {
    if text.is_empty() {
        return Err(ParseErrorKind::Empty);
    }
    let bytes = text.as_bytes();
    let mut pos = 0;
    let mut negative = false;
    if allow_sign && matches!(bytes[0], b'+' | b'-') {
        negative = bytes[0] == b'-';
        pos = 1;
    }

    let mut radix = 10;
    for (marker, base) in [("16#", 16), ("8#", 8), ("2#", 2)] {
        if text[pos..].starts_with(marker) {
            if pos != 0 {
                // Signs only apply to decimal literals.
                return Err(ParseErrorKind::InvalidNumber);
            }
            radix = base;
            pos += marker.len();
            break;
        }
    }

    let (magnitude, end) = scan_digits(bytes, pos, radix)?;
    Ok(IntLiteral {
        magnitude,
        negative,
        radix,
        len: end,
    })
}

/// End of the digit run in `radix` starting at `pos`, `_` allowed between
/// digits. At least one digit is required.
fn digit_run_end(bytes: &[u8], mut pos: usize, radix: u32) -> LexResult<usize> {
    let start = pos;
    while let Some(&byte) = bytes.get(pos) {
        if byte == b'_' && pos > start {
            let next_is_digit = bytes
                .get(pos + 1)
                .is_some_and(|b| char::from(*b).is_digit(radix));
            if !next_is_digit {
                break;
            }
        } else if !char::from(byte).is_digit(radix) {
            break;
        }
        pos += 1;
    }
    if pos == start {
        return Err(ParseErrorKind::InvalidNumber);
    }
    Ok(pos)
}

/// Value of the digit run in `radix` starting at `pos`.
fn scan_digits(bytes: &[u8], pos: usize, radix: u32) -> LexResult<(u64, usize)> {
    let end = digit_run_end(bytes, pos, radix)?;
    let mut value: u64 = 0;
    for digit in bytes[pos..end].iter().filter_map(|b| char::from(*b).to_digit(radix)) {
        value = value
            .checked_mul(u64::from(radix))
            .and_then(|v| v.checked_add(u64::from(digit)))
            .ok_or(ParseErrorKind::OutOfRange)?;
    }
    Ok((value, end))
}

/// Plain decimal digit run (no separators), at least one digit.
pub(crate) fn scan_decimal(bytes: &[u8], pos: usize) -> LexResult<(u64, usize)> {
    let run = bytes[pos.min(bytes.len())..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if run == 0 {
        return Err(ParseErrorKind::InvalidNumber);
    }
    let mut value: u64 = 0;
    for byte in &bytes[pos..pos + run] {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(byte - b'0')))
            .ok_or(ParseErrorKind::OutOfRange)?;
    }
    Ok((value, pos + run))
}

/// A real literal as written, before it is fitted to a format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum FloatLiteral<F> {
    Number(F),
    /// `[sign]NaN`, optionally followed by the mantissa as `(16#...)`.
    NaN { negative: bool, payload: Option<u64> },
}

/// Parse a floating point literal: `[sign] digits [. digits] [e [sign] digits]`,
/// `inf`, `infinity` or `nan` (any case). The mantissa is never accumulated
/// here, so integer parts of any length are accepted.
pub(crate) fn parse_float<F: FromStr>(text: &str, infinity: F, neg_infinity: F) -> LexResult<(FloatLiteral<F>, usize)> {
    if text.is_empty() {
        return Err(ParseErrorKind::Empty);
    }
    let bytes = text.as_bytes();
    let mut pos = 0;
    let negative = bytes[0] == b'-';
    if matches!(bytes[0], b'+' | b'-') {
        pos = 1;
    }

    let rest = &text[pos..];
    let starts_with = |word: &str| rest.get(..word.len()).is_some_and(|head| head.eq_ignore_ascii_case(word));
    for word in ["infinity", "inf"] {
        if starts_with(word) {
            let value = if negative { neg_infinity } else { infinity };
            return Ok((FloatLiteral::Number(value), pos + word.len()));
        }
    }
    if starts_with("nan") {
        let end = pos + 3;
        if bytes.get(end) != Some(&b'(') {
            return Ok((FloatLiteral::NaN { negative, payload: None }, end));
        }
        let payload = scan_int(&text[end + 1..], false)?;
        let close = end + 1 + payload.len;
        if bytes.get(close) != Some(&b')') {
            return Err(ParseErrorKind::InvalidNumber);
        }
        let payload = Some(payload.magnitude);
        return Ok((FloatLiteral::NaN { negative, payload }, close + 1));
    }

    let mut end = digit_run_end(bytes, pos, 10)?;
    if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
        end = digit_run_end(bytes, end + 1, 10)?;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            end = exp + bytes[exp..].iter().take_while(|b| b.is_ascii_digit()).count();
        }
    }

    let literal = &text[..end];
    let cleaned: Cow<'_, str> = if literal.contains('_') {
        Cow::Owned(literal.replace('_', ""))
    } else {
        Cow::Borrowed(literal)
    };
    cleaned
        .parse::<F>()
        .map(|value| (FloatLiteral::Number(value), end))
        .map_err(|_| ParseErrorKind::InvalidNumber)
}

/// Parse a quoted character sequence with `$` escapes.
///
/// `wide` selects `$hhhh` escapes and UTF-16 code units; otherwise `$hh`
/// escapes and single-byte units. Each decoded unit is passed to `push`.
/// Returns the number of bytes consumed including both quotes.
pub(crate) fn parse_quoted(
    text: &str,
    quote: char,
    wide: bool,
    mut push: impl FnMut(u16) -> LexResult<()>,
) -> LexResult<usize> {
    let mut chars = text.char_indices();
    match chars.next() {
        None => return Err(ParseErrorKind::Empty),
        Some((_, c)) if c == quote => {}
        Some(_) => return Err(ParseErrorKind::UnterminatedString),
    }

    let hex_len = if wide { 4 } else { 2 };
    while let Some((index, c)) = chars.next() {
        if c == quote {
            return Ok(index + c.len_utf8());
        }
        if c != '$' {
            if wide {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    push(*unit)?;
                }
            } else {
                let unit = u8::try_from(u32::from(c)).map_err(|_| ParseErrorKind::InvalidCharacter)?;
                push(u16::from(unit))?;
            }
            continue;
        }

        let (_, escape) = chars.next().ok_or(ParseErrorKind::UnterminatedString)?;
        let unit = match escape.to_ascii_uppercase() {
            '$' => u16::from(b'$'),
            '\'' => u16::from(b'\''),
            '"' => u16::from(b'"'),
            'L' | 'N' => 0x0A,
            'P' => 0x0C,
            'R' => 0x0D,
            'T' => 0x09,
            first if first.is_ascii_hexdigit() => {
                let mut value = first.to_digit(16).ok_or(ParseErrorKind::InvalidEscape)?;
                for _ in 1..hex_len {
                    let digit = chars
                        .next()
                        .and_then(|(_, d)| d.to_digit(16))
                        .ok_or(ParseErrorKind::InvalidEscape)?;
                    value = value * 16 + digit;
                }
                u16::try_from(value).map_err(|_| ParseErrorKind::InvalidEscape)?
            }
            _ => return Err(ParseErrorKind::InvalidEscape),
        };
        push(unit)?;
    }
    Err(ParseErrorKind::UnterminatedString)
}

/// Write `units` between `quote` characters, escaping as needed.
pub(crate) fn write_quoted<W, I>(w: &mut W, units: I, quote: char, wide: bool) -> fmt::Result
where
    W: fmt::Write + ?Sized,
    I: IntoIterator<Item = u16>,
{
    w.write_char(quote)?;
    for unit in units {
        match unit {
            0x24 => w.write_str("$$")?,
            0x0A => w.write_str("$N")?,
            0x0C => w.write_str("$P")?,
            0x0D => w.write_str("$R")?,
            0x09 => w.write_str("$T")?,
            u if u32::from(u) == u32::from(quote) => write!(w, "${quote}")?,
            0x20..=0x7E => w.write_char(char::from(unit as u8))?,
            _ if wide => write!(w, "${unit:04X}")?,
            _ => write!(w, "${unit:02X}")?,
        }
    }
    w.write_char(quote)
}

/// `fmt::Write` sink over a caller buffer that keeps counting past the end
/// so the required size can be reported.
pub(crate) struct SliceWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> SliceWriter<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    /// Terminate with NUL. Returns the text length without the terminator.
    pub(crate) fn finish(self) -> DataTypeResult<usize> {
        let required = self.len + 1;
        if required > self.buf.len() {
            return Err(DataTypeError::BufferTooSmall {
                required,
                available: self.buf.len(),
            });
        }
        self.buf[self.len] = 0;
        Ok(self.len)
    }
}

impl fmt::Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let start = self.len;
        self.len += s.len();
        if let Some(dst) = self.buf.get_mut(start..self.len) {
            dst.copy_from_slice(s.as_bytes());
        }
        Ok(())
    }
}

/// Render into `out` via `render` and NUL-terminate.
pub(crate) fn render_into<F>(out: &mut [u8], render: F) -> DataTypeResult<usize>
where
    F: FnOnce(&mut SliceWriter<'_>) -> fmt::Result,
{
    let mut writer = SliceWriter::new(out);
    if render(&mut writer).is_err() {
        return Err(DataTypeError::BufferTooSmall {
            required: writer.len + 1,
            available: writer.buf.len(),
        });
    }
    writer.finish()
}
