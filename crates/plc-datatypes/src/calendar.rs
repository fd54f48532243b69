//! Proleptic Gregorian calendar arithmetic for the date/time leaves.
//!
//! All dates are UTC. Values are nanosecond counts since 1970-01-01.

pub(crate) const NANOS_PER_SECOND: u64 = 1_000_000_000;
pub(crate) const NANOS_PER_MINUTE: u64 = 60 * NANOS_PER_SECOND;
pub(crate) const NANOS_PER_HOUR: u64 = 60 * NANOS_PER_MINUTE;
pub(crate) const NANOS_PER_DAY: u64 = 24 * NANOS_PER_HOUR;

/// Days since the epoch for a civil date. `None` for impossible dates
/// (month 13, February 30, ...).
pub(crate) fn days_from_civil(year: i64, month: i64, day: i64) -> Option<i64> {
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    let y = year - i64::from(month <= 2);
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let m = month + if month > 2 { -3 } else { 9 };
    let doy = (153 * m + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    let days = era * 146_097 + doe - 719_468;

    // Reject day-of-month overflow such as 2023-02-29.
    (civil_from_days(days) == (year, month, day)).then_some(days)
}

/// Civil date `(year, month, day)` for a day count since the epoch.
pub(crate) fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = mp + if mp < 10 { 3 } else { -9 };
    (y + i64::from(m <= 2), m, d)
}

/// Split nanoseconds within a day into `(hour, minute, second, nanos)`.
pub(crate) fn split_time_of_day(nanos: u64) -> (u64, u64, u64, u64) {
    let nanos = nanos % NANOS_PER_DAY;
    (
        nanos / NANOS_PER_HOUR,
        nanos % NANOS_PER_HOUR / NANOS_PER_MINUTE,
        nanos % NANOS_PER_MINUTE / NANOS_PER_SECOND,
        nanos % NANOS_PER_SECOND,
    )
}
