//! Calendar ↔ Julian Day conversions.
//!
//! All dates handled by the crate are civil dates in **UTC**. The Julian Day is computed with
//! the classical Gregorian formula (Meeus, *Astronomical Algorithms*, ch. 7) rather than through
//! a time-scale library so that the result is bit-reproducible: two conversions of the same
//! calendar instant always yield the same `f64`. Leap seconds are ignored and sub-second
//! precision is dropped (the fractional day is built from hours, minutes and whole seconds).
//!
//! Instants with a time of day (`YYYY-MM-DDTHH:MM:SS`, optional time scale suffix) are parsed
//! by [`hifitime`] in [`parse_iso_instant`], then brought back to the same formula through
//! [`julian_day_from_epoch`].
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use hifitime::Epoch;

use crate::{asterviz_errors::AstervizError, constants::JulianDay};

/// Julian Day of a Gregorian calendar instant given by its components.
///
/// Arguments
/// ---------
/// * `year`, `month` (1–12), `day` (1–31): civil date, proleptic Gregorian calendar.
/// * `hour`, `minute`, `second`: time of day in UTC.
///
/// Return
/// ------
/// * The continuous Julian Day number, including the fractional day.
fn gregorian_to_julian_day(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> JulianDay {
    let day = day as f64 + (hour as f64 + (minute as f64 + second as f64 / 60.0) / 60.0) / 24.0;

    // January and February count as months 13 and 14 of the previous year
    let (year, month) = if month <= 2 {
        (year - 1, month + 12)
    } else {
        (year, month)
    };

    let century = year.div_euclid(100);
    let correction = 2 - century + century.div_euclid(4);

    (365.25 * (year + 4716) as f64).trunc() + (30.6001 * (month + 1) as f64).trunc() + day
        + correction as f64
        - 1524.5
}

/// Convert a UTC calendar date-time to a Julian Day.
///
/// Arguments
/// ---------
/// * `dt`: a naive date-time, interpreted as UTC.
///
/// Return
/// ------
/// * The Julian Day, e.g. `2451545.0` for `2000-01-01T12:00:00`.
pub fn to_julian_day(dt: &NaiveDateTime) -> JulianDay {
    gregorian_to_julian_day(
        dt.year(),
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second(),
    )
}

/// Convert a calendar date (midnight UTC) to a Julian Day.
pub fn julian_day_from_date(date: NaiveDate) -> JulianDay {
    to_julian_day(&date.and_time(NaiveTime::MIN))
}

/// Convert a [`hifitime::Epoch`] to a Julian Day using its UTC Gregorian representation.
pub fn julian_day_from_epoch(epoch: Epoch) -> JulianDay {
    let (year, month, day, hour, minute, second, _nanos) = epoch.to_gregorian_utc();
    gregorian_to_julian_day(
        year,
        month as u32,
        day as u32,
        hour as u32,
        minute as u32,
        second as u32,
    )
}

/// Parse an ISO-8601 calendar date (`YYYY-MM-DD`).
///
/// Only the zero-padded form is accepted: `2024-1-3` is rejected.
///
/// Return
/// ------
/// * The parsed [`NaiveDate`], or [`AstervizError::InvalidDate`] carrying the raw input.
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, AstervizError> {
    let trimmed = raw.trim();
    let padded = trimmed.len() == 10
        && trimmed.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !padded {
        return Err(AstervizError::InvalidDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| AstervizError::InvalidDate(raw.to_string()))
}

/// Parse an ISO-8601 instant such as `2024-03-31T06:00:00` or `2024-03-31T06:00:00 TAI`.
///
/// Without a time scale suffix the instant is read as UTC.
///
/// Return
/// ------
/// * The [`Epoch`], or [`AstervizError::InvalidDate`] carrying the raw input.
pub fn parse_iso_instant(raw: &str) -> Result<Epoch, AstervizError> {
    Epoch::from_gregorian_str(raw.trim()).map_err(|_| AstervizError::InvalidDate(raw.to_string()))
}
