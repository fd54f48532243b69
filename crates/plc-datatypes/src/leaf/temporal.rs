//! Literal grammar and constructors for the time and date types.
//!
//! Durations are `T#[-]1d2h3m4s5ms6us7ns` (any subset of components, a
//! fraction allowed on each). Dates, times of day and date-and-time values
//! use `D#2024-01-15`, `TOD#13:45:30.5` and `DT#2024-01-15-13:45:30.5`. All
//! calendar values are UTC nanosecond counts.

use std::fmt;

use plc_common::error::ParseErrorKind;
use plc_common::iec_types::DataTypeId;

use crate::calendar::{
    civil_from_days, days_from_civil, split_time_of_day, NANOS_PER_DAY, NANOS_PER_HOUR,
    NANOS_PER_MINUTE, NANOS_PER_SECOND,
};
use crate::cell::ValueCell;
use crate::literal::{self, scan_decimal};

use super::{prefix_names, Date, DateAndTime, LDate, LDateAndTime, LTimeOfDay, TimeOfDay};

type ParseResult = Result<(ValueCell, usize), ParseErrorKind>;

const DURATION_UNITS: [(&str, u64); 7] = [
    ("d", NANOS_PER_DAY),
    ("h", NANOS_PER_HOUR),
    ("m", NANOS_PER_MINUTE),
    ("s", NANOS_PER_SECOND),
    ("ms", 1_000_000),
    ("us", 1_000),
    ("ns", 1),
];

/// Fraction digits beyond this are read but ignored.
const MAX_FRACTION_DIGITS: u32 = 18;

pub(crate) fn parse_duration(type_id: DataTypeId, text: &str) -> ParseResult {
    let (body, prefix) = literal::strip_type_prefix(text, &prefix_names(type_id))?;
    let bytes = body.as_bytes();
    let Some(&first) = bytes.first() else {
        return Err(ParseErrorKind::Empty);
    };
    let negative = first == b'-';
    let mut pos = usize::from(matches!(first, b'+' | b'-'));

    let mut total: u128 = 0;
    let mut components = 0;
    while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
        let lit = literal::scan_int(&body[pos..], false)?;
        if lit.radix != 10 {
            return Err(ParseErrorKind::InvalidDuration);
        }
        let mut end = pos + lit.len;

        let (mut fraction, mut scale) = (0u128, 1u128);
        if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
            end += 1;
            let mut digits = 0;
            while let Some(digit) = bytes.get(end).filter(|b| b.is_ascii_digit()) {
                if digits < MAX_FRACTION_DIGITS {
                    fraction = fraction * 10 + u128::from(digit - b'0');
                    scale *= 10;
                    digits += 1;
                }
                end += 1;
            }
        }

        let unit_len = bytes[end..].iter().take_while(|b| b.is_ascii_alphabetic()).count();
        let unit = &body[end..end + unit_len];
        let factor = DURATION_UNITS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(unit))
            .map(|(_, factor)| u128::from(*factor))
            .ok_or(ParseErrorKind::InvalidDuration)?;

        total += u128::from(lit.magnitude) * factor + fraction * factor / scale;
        if total > u128::from(u64::MAX) {
            return Err(ParseErrorKind::OutOfRange);
        }
        components += 1;
        pos = end + unit_len;
        if bytes.get(pos) == Some(&b'_') && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit) {
            pos += 1;
        }
    }
    if components == 0 {
        return Err(ParseErrorKind::InvalidDuration);
    }

    let value = if negative {
        -i128::try_from(total).map_err(|_| ParseErrorKind::OutOfRange)?
    } else {
        i128::try_from(total).map_err(|_| ParseErrorKind::OutOfRange)?
    };
    let value = i64::try_from(value).map_err(|_| ParseErrorKind::OutOfRange)?;
    let mut cell = ValueCell::ZERO;
    cell.set_i64(value);
    Ok((cell, prefix + pos))
}

pub(crate) fn render_duration<W: fmt::Write + ?Sized>(
    type_id: DataTypeId,
    cell: ValueCell,
    w: &mut W,
) -> fmt::Result {
    w.write_str(prefix_names(type_id)[0])?;
    w.write_char('#')?;
    let value = cell.get_i64();
    if value == 0 {
        return w.write_str("0s");
    }
    if value < 0 {
        w.write_char('-')?;
    }
    let mut rest = value.unsigned_abs();
    for (unit, factor) in DURATION_UNITS {
        let count = rest / factor;
        if count > 0 {
            write!(w, "{count}{unit}")?;
        }
        rest %= factor;
    }
    Ok(())
}

fn expect(bytes: &[u8], pos: usize, separator: u8) -> Result<usize, ParseErrorKind> {
    if bytes.get(pos) == Some(&separator) {
        Ok(pos + 1)
    } else {
        Err(ParseErrorKind::InvalidDate)
    }
}

/// `YYYY-MM-DD` at `pos`; returns nanoseconds since the epoch at midnight.
fn scan_date(bytes: &[u8], pos: usize) -> Result<(u64, usize), ParseErrorKind> {
    let invalid = |_| ParseErrorKind::InvalidDate;
    let (year, pos) = scan_decimal(bytes, pos).map_err(invalid)?;
    let pos = expect(bytes, pos, b'-')?;
    let (month, pos) = scan_decimal(bytes, pos).map_err(invalid)?;
    let pos = expect(bytes, pos, b'-')?;
    let (day, end) = scan_decimal(bytes, pos).map_err(invalid)?;

    if year > 9999 || month > 12 || day > 31 {
        return Err(ParseErrorKind::InvalidDate);
    }
    let days = days_from_civil(year as i64, month as i64, day as i64).ok_or(ParseErrorKind::InvalidDate)?;
    let days = u64::try_from(days).map_err(|_| ParseErrorKind::OutOfRange)?;
    let nanos = days.checked_mul(NANOS_PER_DAY).ok_or(ParseErrorKind::OutOfRange)?;
    Ok((nanos, end))
}

/// `HH:MM:SS[.fraction]` at `pos`; returns nanoseconds since midnight.
fn scan_time_of_day(bytes: &[u8], pos: usize) -> Result<(u64, usize), ParseErrorKind> {
    let invalid = |_| ParseErrorKind::InvalidDate;
    let (hour, pos) = scan_decimal(bytes, pos).map_err(invalid)?;
    let pos = expect(bytes, pos, b':')?;
    let (minute, pos) = scan_decimal(bytes, pos).map_err(invalid)?;
    let pos = expect(bytes, pos, b':')?;
    let (second, mut end) = scan_decimal(bytes, pos).map_err(invalid)?;
    if hour > 23 || minute > 59 || second > 59 {
        return Err(ParseErrorKind::InvalidDate);
    }

    let mut nanos = 0u64;
    if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
        end += 1;
        let mut scale = NANOS_PER_SECOND;
        while let Some(digit) = bytes.get(end).filter(|b| b.is_ascii_digit()) {
            scale /= 10;
            nanos += u64::from(digit - b'0') * scale;
            end += 1;
        }
    }
    Ok((
        hour * NANOS_PER_HOUR + minute * NANOS_PER_MINUTE + second * NANOS_PER_SECOND + nanos,
        end,
    ))
}

pub(crate) fn parse_date(type_id: DataTypeId, text: &str) -> ParseResult {
    let (body, prefix) = literal::strip_type_prefix(text, &prefix_names(type_id))?;
    if body.is_empty() {
        return Err(ParseErrorKind::Empty);
    }
    let (nanos, end) = scan_date(body.as_bytes(), 0)?;
    Ok((ValueCell::from_bits(nanos), prefix + end))
}

pub(crate) fn parse_time_of_day(type_id: DataTypeId, text: &str) -> ParseResult {
    let (body, prefix) = literal::strip_type_prefix(text, &prefix_names(type_id))?;
    if body.is_empty() {
        return Err(ParseErrorKind::Empty);
    }
    let (nanos, end) = scan_time_of_day(body.as_bytes(), 0)?;
    Ok((ValueCell::from_bits(nanos), prefix + end))
}

pub(crate) fn parse_date_and_time(type_id: DataTypeId, text: &str) -> ParseResult {
    let (body, prefix) = literal::strip_type_prefix(text, &prefix_names(type_id))?;
    if body.is_empty() {
        return Err(ParseErrorKind::Empty);
    }
    let bytes = body.as_bytes();
    let (date, pos) = scan_date(bytes, 0)?;
    let pos = expect(bytes, pos, b'-')?;
    let (time, end) = scan_time_of_day(bytes, pos)?;
    let nanos = date.checked_add(time).ok_or(ParseErrorKind::OutOfRange)?;
    Ok((ValueCell::from_bits(nanos), prefix + end))
}

fn write_date<W: fmt::Write + ?Sized>(nanos: u64, w: &mut W) -> fmt::Result {
    let (year, month, day) = civil_from_days((nanos / NANOS_PER_DAY) as i64);
    write!(w, "{year:04}-{month:02}-{day:02}")
}

/// Fraction is printed with 3, 6 or 9 digits, whichever is exact.
fn write_time_of_day<W: fmt::Write + ?Sized>(nanos: u64, w: &mut W) -> fmt::Result {
    let (hour, minute, second, fraction) = split_time_of_day(nanos);
    write!(w, "{hour:02}:{minute:02}:{second:02}.")?;
    if fraction % 1_000_000 == 0 {
        write!(w, "{:03}", fraction / 1_000_000)
    } else if fraction % 1_000 == 0 {
        write!(w, "{:06}", fraction / 1_000)
    } else {
        write!(w, "{fraction:09}")
    }
}

pub(crate) fn render_date<W: fmt::Write + ?Sized>(
    type_id: DataTypeId,
    cell: ValueCell,
    w: &mut W,
) -> fmt::Result {
    write!(w, "{}#", prefix_names(type_id)[0])?;
    write_date(cell.get_u64(), w)
}

pub(crate) fn render_time_of_day<W: fmt::Write + ?Sized>(
    type_id: DataTypeId,
    cell: ValueCell,
    w: &mut W,
) -> fmt::Result {
    write!(w, "{}#", prefix_names(type_id)[0])?;
    write_time_of_day(cell.get_u64(), w)
}

pub(crate) fn render_date_and_time<W: fmt::Write + ?Sized>(
    type_id: DataTypeId,
    cell: ValueCell,
    w: &mut W,
) -> fmt::Result {
    let nanos = cell.get_u64();
    write!(w, "{}#", prefix_names(type_id)[0])?;
    write_date(nanos, w)?;
    w.write_char('-')?;
    write_time_of_day(nanos, w)
}

macro_rules! calendar_constructors {
    ($date:ident, $tod:ident, $dt:ident) => {
        impl $date {
            /// Midnight (UTC) of the given civil date; `None` for impossible
            /// dates and dates before 1970.
            #[must_use]
            pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
                let days = days_from_civil(i64::from(year), i64::from(month), i64::from(day))?;
                let nanos = u64::try_from(days).ok()?.checked_mul(NANOS_PER_DAY)?;
                Some(Self::new(nanos))
            }
        }

        impl $tod {
            /// Time of day from its components; `None` when out of range.
            #[must_use]
            pub fn from_hms_nano(hour: u32, minute: u32, second: u32, nano: u32) -> Option<Self> {
                if hour > 23 || minute > 59 || second > 59 || u64::from(nano) >= NANOS_PER_SECOND {
                    return None;
                }
                Some(Self::new(
                    u64::from(hour) * NANOS_PER_HOUR
                        + u64::from(minute) * NANOS_PER_MINUTE
                        + u64::from(second) * NANOS_PER_SECOND
                        + u64::from(nano),
                ))
            }
        }

        impl $dt {
            /// Combine a date and a time of day.
            #[must_use]
            pub fn from_date_time(date: &$date, time: &$tod) -> Option<Self> {
                date.value().checked_add(time.value() % NANOS_PER_DAY).map(Self::new)
            }

            /// Date part (midnight of the same day).
            #[must_use]
            pub fn date(&self) -> $date {
                let nanos = self.value();
                $date::new(nanos - nanos % NANOS_PER_DAY)
            }

            /// Time within the day.
            #[must_use]
            pub fn time_of_day(&self) -> $tod {
                $tod::new(self.value() % NANOS_PER_DAY)
            }
        }
    };
}

calendar_constructors!(Date, TimeOfDay, DateAndTime);
calendar_constructors!(LDate, LTimeOfDay, LDateAndTime);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::any::IecAny;
    use crate::leaf::{LTime, ScalarValue, Time};

    fn render_with(value: &dyn IecAny) -> String {
        crate::any::to_display_string(value).unwrap()
    }

    #[test]
    fn test_duration_literals() {
        let mut time = Time::default();
        assert_eq!(time.from_iec_string("T#1h30m"), Ok(7));
        assert_eq!(time.value(), 90 * 60 * 1_000_000_000);

        assert_eq!(time.from_iec_string("TIME#-1.5s"), Ok(10));
        assert_eq!(time.value(), -1_500_000_000);

        assert_eq!(time.from_iec_string("t#2d_4h"), Ok(7));
        assert_eq!(time.value(), 52 * 3_600 * 1_000_000_000);

        assert_eq!(time.from_iec_string("T#250ms12us"), Ok(11));
        assert_eq!(time.value(), 250_012_000);

        assert!(time.from_iec_string("T#5x").is_err());
        assert!(time.from_iec_string("T#").is_err());
        assert!(time.from_iec_string("LT#5s").is_err());
        assert!(time.from_iec_string("T#300000d").is_err());
    }

    #[test]
    fn test_duration_rendering() {
        assert_eq!(render_with(&Time::new(0)), "T#0s");
        assert_eq!(render_with(&Time::new(5_400_000_000_000)), "T#1h30m");
        assert_eq!(render_with(&Time::new(-1_500_000_000)), "T#-1s500ms");
        assert_eq!(render_with(&LTime::new(1)), "LT#1ns");
        assert_eq!(
            render_with(&Time::new(i64::MIN)),
            "T#-106751d23h47m16s854ms775us808ns"
        );
    }

    #[test]
    fn test_duration_extremes_read_back() {
        for value in [i64::MIN, i64::MAX, -1, 1] {
            let text = render_with(&LTime::new(value));
            let mut parsed = LTime::default();
            assert_eq!(parsed.from_iec_string(&text), Ok(text.len()));
            assert_eq!(parsed.value(), value);
        }
    }

    #[test]
    fn test_date_literals() {
        let mut date = Date::default();
        assert_eq!(date.from_iec_string("D#2024-01-15"), Ok(12));
        assert_eq!(Some(date.clone()), Date::from_ymd(2024, 1, 15));
        assert_eq!(render_with(&date), "D#2024-01-15");

        assert_eq!(date.from_iec_string("DATE#1970-01-01"), Ok(15));
        assert_eq!(date.value(), 0);

        assert!(date.from_iec_string("D#2023-02-29").is_err());
        assert!(date.from_iec_string("D#1969-12-31").is_err());
        assert!(date.from_iec_string("LD#2024-01-15").is_err());

        let mut long = LDate::default();
        assert_eq!(long.from_iec_string("LDATE#2000-03-01"), Ok(16));
        assert_eq!(render_with(&long), "LD#2000-03-01");
    }

    #[test]
    fn test_time_of_day_literals() {
        let mut tod = TimeOfDay::default();
        assert_eq!(tod.from_iec_string("TOD#13:45:30.5"), Ok(14));
        assert_eq!(Some(tod.clone()), TimeOfDay::from_hms_nano(13, 45, 30, 500_000_000));
        assert_eq!(render_with(&tod), "TOD#13:45:30.500");

        assert_eq!(tod.from_iec_string("TIME_OF_DAY#00:00:00.000001"), Ok(27));
        assert_eq!(render_with(&tod), "TOD#00:00:00.000001");

        tod.set(1);
        assert_eq!(render_with(&tod), "TOD#00:00:00.000000001");

        assert!(tod.from_iec_string("TOD#24:00:00").is_err());
        assert!(tod.from_iec_string("TOD#12:60:00").is_err());
        assert_eq!(TimeOfDay::from_hms_nano(23, 59, 60, 0), None);
    }

    #[test]
    fn test_calendar_values_stay_in_range() {
        let tod = TimeOfDay::new(NANOS_PER_DAY + NANOS_PER_SECOND);
        assert_eq!(tod.value(), NANOS_PER_SECOND);
        assert_eq!(render_with(&tod), "TOD#00:00:01.000");

        let mut date = Date::new(5);
        assert_eq!(date.value(), 0);
        date.set(2 * NANOS_PER_DAY + 1);
        assert_eq!(date.value(), 2 * NANOS_PER_DAY);

        let long = LTimeOfDay::from_cell(ValueCell::from_bits(u64::MAX));
        assert_eq!(long.value(), u64::MAX % NANOS_PER_DAY);

        for value in [u64::MAX, NANOS_PER_DAY - 1, 12_345] {
            let date = LDate::new(value);
            let mut parsed = LDate::default();
            let text = render_with(&date);
            assert_eq!(parsed.from_iec_string(&text), Ok(text.len()));
            assert_eq!(parsed, date, "{text}");

            let tod = LTimeOfDay::new(value);
            let mut parsed = LTimeOfDay::default();
            let text = render_with(&tod);
            assert_eq!(parsed.from_iec_string(&text), Ok(text.len()));
            assert_eq!(parsed, tod, "{text}");
        }
    }

    #[test]
    fn test_date_and_time_literals() {
        let mut dt = DateAndTime::default();
        assert_eq!(render_with(&dt), "DT#1970-01-01-00:00:00.000");

        assert_eq!(dt.from_iec_string("DT#2024-01-15-13:45:30.25"), Ok(25));
        assert_eq!(render_with(&dt), "DT#2024-01-15-13:45:30.250");
        assert_eq!(Some(dt.date()), Date::from_ymd(2024, 1, 15));
        assert_eq!(Some(dt.time_of_day()), TimeOfDay::from_hms_nano(13, 45, 30, 250_000_000));

        let rebuilt = DateAndTime::from_date_time(&dt.date(), &dt.time_of_day());
        assert_eq!(rebuilt, Some(dt.clone()));

        let mut long = LDateAndTime::default();
        assert_eq!(long.from_iec_string("LDT#2024-02-29-23:59:59.123456789"), Ok(33));
        assert_eq!(render_with(&long), "LDT#2024-02-29-23:59:59.123456789");

        assert!(dt.from_iec_string("DT#2024-01-15").is_err());
        assert!(dt.from_iec_string("DT#2024-01-15 13:45:30").is_err());
    }
}
