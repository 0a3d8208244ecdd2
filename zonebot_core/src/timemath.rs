//! Pure time arithmetic over IANA timezones.
//!
//! Every function takes the current instant explicitly so callers (and
//! tests) control the clock; nothing here reads the system time.

use chrono::{DateTime, Datelike, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Differences smaller than this are reported as "no difference" to
/// absorb floating rounding noise.
pub const NO_DIFFERENCE_EPSILON_HOURS: f64 = 0.01;

/// Clock-time input that failed to parse or convert.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClockTimeError {
    #[error("expected a time formatted as HH:MM AM/PM, got {0:?}")]
    Malformed(String),
    #[error("{0} does not exist on today's date in the source timezone")]
    Nonexistent(NaiveTime),
}

/// Ordinal suffix for a day of the month.
#[must_use]
pub const fn day_suffix(day: u32) -> &'static str {
    if day % 100 >= 10 && day % 100 <= 20 {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Render the current wall-clock time in `tz`, e.g.
/// `03:25 PM on August 23rd, 2026`.
#[must_use]
pub fn format_local_now(now: DateTime<Utc>, tz: Tz) -> String {
    let local = now.with_timezone(&tz);
    let day = local.day();
    format!(
        "{} on {} {}{}, {}",
        local.format("%I:%M %p"),
        local.format("%B"),
        day,
        day_suffix(day),
        local.year()
    )
}

/// UTC offset of `tz` at `now`, formatted `+HH:MM` / `-HH:MM`.
#[must_use]
pub fn utc_offset(tz: Tz, now: DateTime<Utc>) -> String {
    let seconds = tz
        .offset_from_utc_datetime(&now.naive_utc())
        .fix()
        .local_minus_utc();
    let sign = if seconds < 0 { '-' } else { '+' };
    let abs = seconds.unsigned_abs();
    format!("{sign}{:02}:{:02}", abs / 3600, (abs % 3600) / 60)
}

/// Current zone abbreviation of `tz` at `now` (e.g. `CET`, `EDT`).
#[must_use]
pub fn zone_abbreviation(tz: Tz, now: DateTime<Utc>) -> String {
    now.with_timezone(&tz).format("%Z").to_string()
}

/// Parse a 12-hour clock time with a single space before the meridiem
/// marker, e.g. `09:30 PM`.
pub fn parse_clock_time(text: &str) -> Result<NaiveTime, ClockTimeError> {
    let text = text.trim();
    if text.split(' ').count() != 2 {
        return Err(ClockTimeError::Malformed(text.to_string()));
    }
    NaiveTime::parse_from_str(&text.to_uppercase(), "%I:%M %p")
        .map_err(|_| ClockTimeError::Malformed(text.to_string()))
}

/// Convert a clock time from one timezone to another on today's date.
///
/// The time is interpreted as occurring today in `from` (today as seen
/// from `from` at `now`), mapped to an absolute instant, then rendered
/// as the wall-clock time in `to`. Ambiguous local times (DST fold) take
/// the earlier instant; times inside a DST gap are an error.
pub fn convert_clock_time(
    time: NaiveTime,
    from: Tz,
    to: Tz,
    now: DateTime<Utc>,
) -> Result<NaiveTime, ClockTimeError> {
    let today = now.with_timezone(&from).date_naive();
    let instant = from
        .from_local_datetime(&today.and_time(time))
        .earliest()
        .ok_or(ClockTimeError::Nonexistent(time))?;
    Ok(instant.with_timezone(&to).time())
}

/// Render a clock time in 12-hour format, e.g. `03:00 AM`.
#[must_use]
pub fn format_clock_time(time: NaiveTime) -> String {
    time.format("%I:%M %p").to_string()
}

/// Signed difference in hours between two timezones at `now`.
///
/// Positive means `tz_b` is ahead of `tz_a`.
#[must_use]
pub fn difference_hours(tz_a: Tz, tz_b: Tz, now: DateTime<Utc>) -> f64 {
    let naive = now.naive_utc();
    let offset_a = tz_a.offset_from_utc_datetime(&naive).fix().local_minus_utc();
    let offset_b = tz_b.offset_from_utc_datetime(&naive).fix().local_minus_utc();
    f64::from(offset_b - offset_a) / 3600.0
}

/// Render an hour count for difference replies, keeping fractional
/// offsets (half- and quarter-hour zones) readable.
#[must_use]
pub fn format_hours(hours: f64) -> String {
    if hours.fract().abs() < f64::EPSILON {
        format!("{hours:.0}")
    } else {
        format!("{hours:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[expect(clippy::expect_used, reason = "fixture date is statically valid")]
    fn fixed_now() -> DateTime<Utc> {
        // Mid-January, safely outside every DST transition window.
        let naive = NaiveDate::from_ymd_opt(2024, 1, 15)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid fixture date");
        DateTime::from_naive_utc_and_offset(naive, Utc)
    }

    fn tz(name: &str) -> Tz {
        name.parse().unwrap_or(chrono_tz::UTC)
    }

    #[test]
    fn day_suffixes() {
        assert_eq!(day_suffix(1), "st");
        assert_eq!(day_suffix(2), "nd");
        assert_eq!(day_suffix(3), "rd");
        assert_eq!(day_suffix(4), "th");
        assert_eq!(day_suffix(11), "th");
        assert_eq!(day_suffix(12), "th");
        assert_eq!(day_suffix(13), "th");
        assert_eq!(day_suffix(21), "st");
        assert_eq!(day_suffix(22), "nd");
        assert_eq!(day_suffix(23), "rd");
        assert_eq!(day_suffix(101), "st");
    }

    #[test]
    fn local_now_carries_ordinal_suffix() {
        let formatted = format_local_now(fixed_now(), chrono_tz::UTC);
        assert_eq!(formatted, "12:00 PM on January 15th, 2024");
    }

    #[test]
    fn offsets_are_signed_and_padded() {
        // Etc/GMT signs are inverted by POSIX convention.
        assert_eq!(utc_offset(tz("Etc/GMT-2"), fixed_now()), "+02:00");
        assert_eq!(utc_offset(tz("Etc/GMT+5"), fixed_now()), "-05:00");
        assert_eq!(utc_offset(tz("Asia/Kathmandu"), fixed_now()), "+05:45");
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn parse_accepts_single_spaced_meridiem() {
        let parsed = parse_clock_time("09:30 PM").expect("valid clock time");
        assert_eq!(parsed, NaiveTime::from_hms_opt(21, 30, 0).expect("valid time"));
        assert!(parse_clock_time("9:05 am").is_ok());
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(parse_clock_time("09:30PM").is_err());
        assert!(parse_clock_time("09:30").is_err());
        assert!(parse_clock_time("09:30  PM").is_err());
        assert!(parse_clock_time("half past nine").is_err());
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn conversion_crosses_fixed_offsets() {
        let ten_am = NaiveTime::from_hms_opt(10, 0, 0).expect("valid time");
        // UTC+2 -> UTC-5 is a 7 hour step back.
        let converted = convert_clock_time(ten_am, tz("Etc/GMT-2"), tz("Etc/GMT+5"), fixed_now())
            .expect("conversion between fixed offsets");
        assert_eq!(converted, NaiveTime::from_hms_opt(3, 0, 0).expect("valid time"));
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn conversion_round_trips_to_the_minute() {
        let original = NaiveTime::from_hms_opt(18, 45, 0).expect("valid time");
        let a = tz("Etc/GMT-2");
        let b = tz("Etc/GMT+5");
        let there = convert_clock_time(original, a, b, fixed_now()).expect("forward conversion");
        let back = convert_clock_time(there, b, a, fixed_now()).expect("return conversion");
        assert_eq!(back, original);
    }

    #[test]
    fn same_zone_has_zero_difference() {
        let zone = tz("Europe/Paris");
        let delta = difference_hours(zone, zone, fixed_now());
        assert!(delta.abs() < NO_DIFFERENCE_EPSILON_HOURS);
    }

    #[test]
    fn difference_sign_means_b_ahead() {
        let delta = difference_hours(tz("Etc/GMT+5"), tz("Etc/GMT-2"), fixed_now());
        assert!((delta - 7.0).abs() < f64::EPSILON);
        let delta = difference_hours(tz("Etc/GMT-2"), tz("Etc/GMT+5"), fixed_now());
        assert!((delta + 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn fractional_offsets_keep_decimals() {
        let delta = difference_hours(chrono_tz::UTC, tz("Asia/Kathmandu"), fixed_now());
        assert!((delta - 5.75).abs() < f64::EPSILON);
        assert_eq!(format_hours(delta), "5.75");
        assert_eq!(format_hours(7.0), "7");
    }
}
