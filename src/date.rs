//! The point-in-time value handled by the helper.

use std::fmt;

use chrono::{Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Serialize, Serializer};

use crate::time::{MS_PER_SECOND, from_naive, now_ms, time_clip, to_naive};
use crate::zone::{TimeZone, gmt_offset};

/// A point in time, stored as a clipped time value (ms since the epoch).
///
/// Like a JS `Date`, a `Date` may be invalid; operations on an invalid date
/// yield invalid dates and `fields` returns `None`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Date {
    time: f64,
}

/// Calendar fields of a date read in some zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateFields {
    pub year: i32,
    /// Months since January (0-11).
    pub month: u32,
    /// Day of the month (1-31).
    pub day: u32,
    /// 0 = Sunday.
    pub weekday: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub millisecond: u32,
}

impl DateFields {
    pub(crate) fn from_naive(naive: &NaiveDateTime) -> Self {
        DateFields {
            year: naive.year(),
            month: naive.month0(),
            day: naive.day(),
            weekday: naive.weekday().num_days_from_sunday(),
            hour: naive.hour(),
            minute: naive.minute(),
            second: naive.second(),
            millisecond: naive.nanosecond() / 1_000_000,
        }
    }

    /// Fields of a UTC time value; `None` when it has no calendar date.
    pub(crate) fn from_time(t: f64) -> Option<Self> {
        to_naive(t).map(|naive| DateFields::from_naive(&naive))
    }
}

impl Date {
    pub fn from_millis(ms: f64) -> Self {
        Date { time: time_clip(ms) }
    }

    pub fn invalid() -> Self {
        Date { time: f64::NAN }
    }

    pub fn now() -> Self {
        Date::from_millis(now_ms())
    }

    /// A UTC date; `month` is 1-based. Out-of-range fields give an invalid
    /// date.
    pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        match wall_clock(year, month, day, hour, minute, second) {
            Some(wall) => Date::from_millis(from_naive(&wall)),
            None => Date::invalid(),
        }
    }

    /// A wall-clock date in `zone`; `month` is 1-based.
    pub fn local(
        zone: &TimeZone,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Self {
        match wall_clock(year, month, day, hour, minute, second) {
            Some(wall) => Date::from_millis(zone.utc_time(from_naive(&wall))),
            None => Date::invalid(),
        }
    }

    /// Parses ISO-8601 text or the `toString` layout. Text that matches
    /// neither gives an invalid date.
    pub fn parse(text: &str, zone: &TimeZone) -> Self {
        let text = text.trim();
        parse_iso(text, zone)
            .or_else(|| parse_date_string_layout(text, zone))
            .map_or_else(Date::invalid, Date::from_millis)
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn is_valid(&self) -> bool {
        !self.time.is_nan()
    }

    pub fn fields(&self, zone: &TimeZone) -> Option<DateFields> {
        DateFields::from_time(zone.local_time(self.time))
    }

    pub fn utc_fields(&self) -> Option<DateFields> {
        DateFields::from_time(self.time)
    }

    /// Sets the local hour, minute and second; milliseconds are kept.
    /// Values past their range roll over, as with `setHours`.
    pub fn with_hms(&self, zone: &TimeZone, hour: u32, minute: u32, second: u32) -> Self {
        self.map_local(zone, |wall| {
            let ms = i64::from(hour) * 3_600_000
                + i64::from(minute) * 60_000
                + i64::from(second) * 1_000
                + i64::from(wall.nanosecond() / 1_000_000);
            wall.date()
                .and_time(NaiveTime::MIN)
                .checked_add_signed(TimeDelta::try_milliseconds(ms)?)
        })
    }

    /// Moves the local calendar day by `days`, keeping the wall-clock time.
    pub fn add_days(&self, zone: &TimeZone, days: i64) -> Self {
        self.map_local(zone, |wall| {
            let step = Days::new(days.unsigned_abs());
            if days >= 0 {
                wall.checked_add_days(step)
            } else {
                wall.checked_sub_days(step)
            }
        })
    }

    pub fn to_iso_string(&self) -> Option<String> {
        to_naive(self.time).map(|utc| utc.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
    }

    /// `Sun Mar 09 2025 19:34:56 GMT+0700 (WIB)`, or `Invalid Date`.
    pub fn to_date_string(&self, zone: &TimeZone) -> String {
        let Some(wall) = to_naive(zone.local_time(self.time)) else {
            return INVALID.to_string();
        };
        format!(
            "{} {} ({})",
            wall.format(DATE_STRING_LAYOUT),
            gmt_offset(zone.offset_ms(self.time)),
            zone.abbreviation(self.time)
        )
    }

    fn map_local(
        &self,
        zone: &TimeZone,
        edit: impl FnOnce(NaiveDateTime) -> Option<NaiveDateTime>,
    ) -> Self {
        to_naive(zone.local_time(self.time))
            .and_then(edit)
            .map_or_else(Date::invalid, |wall| {
                Date::from_millis(zone.utc_time(from_naive(&wall)))
            })
    }
}

const INVALID: &str = "Invalid Date";

const DATE_STRING_LAYOUT: &str = "%a %b %d %Y %H:%M:%S";

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_iso_string() {
            Some(iso) => f.write_str(&iso),
            None => f.write_str(INVALID),
        }
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.to_iso_string() {
            Some(iso) => serializer.serialize_str(&iso),
            None => serializer.serialize_none(),
        }
    }
}

fn wall_clock(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// `YYYY`, `YYYY-MM` and `YYYY-MM-DD` are read as UTC midnight. Date-times
/// are local unless followed by `Z` or a `±HH:MM` offset.
fn parse_iso(text: &str, zone: &TimeZone) -> Option<f64> {
    if let Some(date) = parse_iso_date(text) {
        return Some(from_naive(&date.and_time(NaiveTime::MIN)));
    }
    // `T` may be written lowercase or as a space
    let text = match text.as_bytes().get(10) {
        Some(b't' | b' ') if text.is_char_boundary(11) => format!("{}T{}", &text[..10], &text[11..]),
        _ => text.to_string(),
    };
    let (wall, rest) = DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_and_remainder(&text, format).ok())?;
    match rest {
        "" => Some(zone.utc_time(from_naive(&wall))),
        "Z" | "z" => Some(from_naive(&wall)),
        offset => with_offset(&wall, offset),
    }
}

fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let is_year = |s: &str| s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit());
    match text.len() {
        4 if is_year(text) => NaiveDate::from_ymd_opt(text.parse().ok()?, 1, 1),
        7 if is_year(text.get(..4)?) => {
            NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d").ok()
        }
        10 if is_year(text.get(..4)?) => NaiveDate::parse_from_str(text, "%Y-%m-%d").ok(),
        _ => None,
    }
}

// "Sun Mar 09 2025 19:34:56 GMT+0700 (WIB)", with the offset and name optional
fn parse_date_string_layout(text: &str, zone: &TimeZone) -> Option<f64> {
    let (wall, rest) = NaiveDateTime::parse_and_remainder(text, DATE_STRING_LAYOUT).ok()?;
    let Some(gmt) = rest.split_whitespace().next() else {
        return Some(zone.utc_time(from_naive(&wall)));
    };
    match gmt.strip_prefix("GMT")? {
        "" => Some(from_naive(&wall)),
        offset => with_offset(&wall, offset),
    }
}

fn with_offset(wall: &NaiveDateTime, offset: &str) -> Option<f64> {
    let offset: FixedOffset = offset.parse().ok()?;
    Some(from_naive(wall) - f64::from(offset.local_minus_utc()) * MS_PER_SECOND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;

    const JAKARTA: TimeZone = TimeZone::Named(Tz::Asia__Jakarta);

    #[test]
    fn parses_iso_forms() {
        let utc = TimeZone::Utc;
        assert_eq!(Date::parse("2025-03-09", &utc).time(), 1_741_478_400_000.0);
        assert_eq!(Date::parse("2025-03", &utc).time(), 1_740_787_200_000.0);
        assert_eq!(
            Date::parse("2025-03-09T12:34:56.789Z", &utc).time(),
            1_741_523_696_789.0
        );
        assert_eq!(
            Date::parse("2025-03-09T19:34:56.789+07:00", &utc).time(),
            1_741_523_696_789.0
        );
    }

    #[test]
    fn date_only_is_utc_but_date_time_is_local() {
        assert_eq!(
            Date::parse("2025-03-09", &JAKARTA),
            Date::utc(2025, 3, 9, 0, 0, 0)
        );
        assert_eq!(
            Date::parse("2025-03-09T07:00", &JAKARTA),
            Date::utc(2025, 3, 9, 0, 0, 0)
        );
    }

    #[test]
    fn unparseable_text_is_invalid() {
        assert!(!Date::parse("not a date", &TimeZone::Utc).is_valid());
        assert!(!Date::parse("2025-13-01", &TimeZone::Utc).is_valid());
        assert!(!Date::parse("", &TimeZone::Utc).is_valid());
    }

    #[test]
    fn to_string_round_trips() {
        let date = Date::utc(2025, 3, 9, 12, 34, 56);
        let text = date.to_date_string(&JAKARTA);
        assert_eq!(text, "Sun Mar 09 2025 19:34:56 GMT+0700 (WIB)");
        assert_eq!(Date::parse(&text, &TimeZone::Utc), date);
    }

    #[test]
    fn iso_rendering() {
        let date = Date::from_millis(1_741_523_696_789.0);
        assert_eq!(date.to_iso_string().as_deref(), Some("2025-03-09T12:34:56.789Z"));
        assert_eq!(Date::invalid().to_string(), "Invalid Date");
        assert_eq!(
            serde_json::to_string(&date).ok().as_deref(),
            Some("\"2025-03-09T12:34:56.789Z\"")
        );
        assert_eq!(serde_json::to_string(&Date::invalid()).ok().as_deref(), Some("null"));
    }

    #[test]
    fn local_fields_follow_the_zone() {
        let date = Date::utc(2025, 3, 9, 20, 0, 0);
        let f = date.fields(&JAKARTA).unwrap();
        assert_eq!((f.month, f.day, f.hour, f.weekday), (2, 10, 3, 1));
        assert!(Date::invalid().fields(&JAKARTA).is_none());
    }

    #[test]
    fn with_hms_keeps_the_local_day_and_millis() {
        let date = Date::from_millis(Date::utc(2025, 3, 9, 20, 0, 0).time() + 250.0);
        let set = date.with_hms(&JAKARTA, 8, 15, 0);
        assert_eq!(set.time(), Date::utc(2025, 3, 10, 1, 15, 0).time() + 250.0);
    }

    #[test]
    fn add_days_crosses_month_end() {
        let date = Date::utc(2025, 1, 30, 10, 0, 0);
        assert_eq!(date.add_days(&TimeZone::Utc, 3), Date::utc(2025, 2, 2, 10, 0, 0));
        assert_eq!(date.add_days(&TimeZone::Utc, -30), Date::utc(2024, 12, 31, 10, 0, 0));
    }

    #[test]
    fn separators_and_offsets() {
        let expected = Date::utc(2025, 3, 9, 12, 34, 0);
        assert_eq!(Date::parse("2025-03-09 12:34Z", &JAKARTA), expected);
        assert_eq!(Date::parse("2025-03-09t19:34+0700", &TimeZone::Utc), expected);
        assert_eq!(Date::parse("Sun Mar 09 2025 19:34:00", &JAKARTA), expected);
        assert_eq!(Date::parse("Sun Mar 09 2025 12:34:00 GMT", &JAKARTA), expected);
    }

    #[test]
    fn impossible_fields_are_invalid() {
        assert!(!Date::utc(2025, 2, 30, 0, 0, 0).is_valid());
        assert!(!Date::utc(2025, 1, 1, 24, 0, 0).is_valid());
    }

    #[test]
    fn with_hms_rolls_over_like_set_hours() {
        let date = Date::utc(2025, 3, 9, 20, 0, 0);
        assert_eq!(
            date.with_hms(&TimeZone::Utc, 23, 75, 0),
            Date::utc(2025, 3, 10, 0, 15, 0)
        );
        assert!(!Date::invalid().with_hms(&TimeZone::Utc, 1, 0, 0).is_valid());
    }
}
