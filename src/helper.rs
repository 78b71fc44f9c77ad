//! The date helper: offsets, normalization, distances and Sundays relative
//! to a reference date.

use crate::date::{Date, DateFields};
use crate::error::{DateError, Result};
use crate::format::{Formatted, OutputFormat};
use crate::intl::{LocaleFormatter, LocaleStringOptions, Locales};
use crate::part::{DatePart, Offset};
use crate::unit::{Multipliers, Unit};
use crate::zone::TimeZone;

const SUNDAY: u32 = 0;

/// What [`DateHelper::get_date_part`] decomposes or normalizes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PartSource {
    Date(Date),
    Parts(DatePart),
}

impl From<Date> for PartSource {
    fn from(date: Date) -> Self {
        PartSource::Date(date)
    }
}

impl From<DatePart> for PartSource {
    fn from(parts: DatePart) -> Self {
        PartSource::Parts(parts)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Date arithmetic relative to a reference date.
///
/// Results of `next`, `last`, `next_sunday` and `last_sunday` are rendered in
/// the helper's [`OutputFormat`]; local fields are read in its [`TimeZone`].
///
/// ```
/// use aio_date_helper::{Date, DateHelper, Distance, OutputFormat, TimeZone, Unit};
///
/// let today = Date::utc(2025, 3, 4, 9, 0, 0);
/// let helper = DateHelper::new(today, OutputFormat::Number).with_time_zone(TimeZone::Utc);
/// let tomorrow = helper.next(&[Distance::new(1.0, Unit::Day).into()]).unwrap();
/// assert_eq!(tomorrow.as_number(), Some(today.time() + 86_400_000.0));
/// ```
#[derive(Clone, Debug)]
pub struct DateHelper {
    current_date: Date,
    format: OutputFormat,
    locale: Locales,
    locale_string_options: LocaleStringOptions,
    time_zone: TimeZone,
}

impl Default for DateHelper {
    fn default() -> Self {
        DateHelper::new(Date::now(), OutputFormat::default())
    }
}

impl DateHelper {
    pub fn new(current_date: Date, format: OutputFormat) -> Self {
        DateHelper {
            current_date,
            format,
            locale: Locales::default(),
            locale_string_options: LocaleStringOptions::default(),
            time_zone: TimeZone::system(),
        }
    }

    pub fn with_time_zone(mut self, time_zone: TimeZone) -> Self {
        self.time_zone = time_zone;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<Locales>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_locale_string_options(mut self, options: LocaleStringOptions) -> Self {
        self.locale_string_options = options;
        self
    }

    pub fn current_date(&self) -> Date {
        self.current_date
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn locale(&self) -> &Locales {
        &self.locale
    }

    pub fn set_locale(&mut self, locale: impl Into<Locales>) {
        self.locale = locale.into();
    }

    pub fn locale_string_options(&self) -> &LocaleStringOptions {
        &self.locale_string_options
    }

    pub fn set_locale_string_options(&mut self, options: LocaleStringOptions) {
        self.locale_string_options = options;
    }

    pub fn time_zone(&self) -> &TimeZone {
        &self.time_zone
    }

    pub fn set_time_zone(&mut self, time_zone: TimeZone) {
        self.time_zone = time_zone;
    }

    pub fn multiplier(&self, unit: Unit) -> i64 {
        unit.multiplier()
    }

    pub fn multipliers(&self) -> Multipliers {
        Multipliers::new()
    }

    /// Decomposes a date into its local fields, or normalizes date parts.
    ///
    /// For a date the result holds `year`, `month` (0-based), `day`, `hour`,
    /// `minute` and `second`, zeros included. For date parts see
    /// [`DatePart::normalized`].
    pub fn get_date_part(&self, source: impl Into<PartSource>) -> Result<DatePart> {
        match source.into() {
            PartSource::Date(date) => {
                let f = self.local_fields(date)?;
                Ok(DatePart {
                    year: Some(f.year.into()),
                    month: Some(f.month.into()),
                    week: None,
                    day: Some(f.day.into()),
                    hour: Some(f.hour.into()),
                    minute: Some(f.minute.into()),
                    second: Some(f.second.into()),
                })
            }
            PartSource::Parts(parts) => Ok(parts.normalized()),
        }
    }

    /// The first Sunday on or after `date` (default: the current date).
    pub fn next_sunday(&self, date: Option<Date>) -> Result<Formatted> {
        let date = date.unwrap_or(self.current_date);
        let shifted = match date.fields(&self.time_zone) {
            Some(f) => date.add_days(&self.time_zone, ((SUNDAY + 7 - f.weekday) % 7).into()),
            None => date,
        };
        self.format_result(shifted)
    }

    /// The last Sunday on or before `date` (default: the current date).
    pub fn last_sunday(&self, date: Option<Date>) -> Result<Formatted> {
        let date = date.unwrap_or(self.current_date);
        let shifted = match date.fields(&self.time_zone) {
            Some(f) => date.add_days(&self.time_zone, -i64::from((f.weekday + 7 - SUNDAY) % 7)),
            None => date,
        };
        self.format_result(shifted)
    }

    /// The current date moved forward by every offset.
    pub fn next(&self, offsets: &[Offset]) -> Result<Formatted> {
        self.format_result(self.shift(offsets, Direction::Forward))
    }

    /// The current date moved back by every offset.
    pub fn last(&self, offsets: &[Offset]) -> Result<Formatted> {
        self.format_result(self.shift(offsets, Direction::Backward))
    }

    /// The gap between two dates (`date2` defaults to the current date).
    ///
    /// The absolute millisecond delta is read back as a UTC date, so months
    /// follow the calendar from January 1970. Zero fields are dropped. A delta
    /// too large to be a date fails with [`DateError::DistanceOutOfRange`].
    pub fn distance(&self, date1: Date, date2: Option<Date>) -> Result<DatePart> {
        let date2 = date2.unwrap_or(self.current_date);
        validate_dates(&[date1, date2])?;
        let delta = (date2.time() - date1.time()).abs();
        let f = Date::from_millis(delta)
            .utc_fields()
            .ok_or(DateError::DistanceOutOfRange(delta))?;
        let part = DatePart {
            year: Some(i64::from(f.year) - 1970),
            month: Some(f.month.into()),
            week: None,
            day: Some(i64::from(f.day) - 1),
            hour: Some(f.hour.into()),
            minute: Some(f.minute.into()),
            second: Some(f.second.into()),
        };
        Ok(part.without_zeros())
    }

    pub(crate) fn shift_forward(&self, offsets: &[Offset]) -> Date {
        self.shift(offsets, Direction::Forward)
    }

    fn shift(&self, offsets: &[Offset], direction: Direction) -> Date {
        let total: f64 = offsets.iter().map(Offset::millis).sum();
        let delta = match direction {
            Direction::Forward => total,
            Direction::Backward => -total,
        };
        tracing::debug!(offsets = offsets.len(), delta, ?direction, "shifting reference date");
        Date::from_millis(self.current_date.time() + delta)
    }

    fn local_fields(&self, date: Date) -> Result<DateFields> {
        date.fields(&self.time_zone)
            .ok_or(DateError::InvalidDate { position: 1 })
    }

    fn format_result(&self, date: Date) -> Result<Formatted> {
        self.render(date).map_err(|error| self.generating(error))
    }

    /// Passes a computed date through the same validation as formatted
    /// results, without formatting it.
    pub(crate) fn checked_result(&self, date: Date) -> Result<Date> {
        validate_dates(&[date])
            .map(|()| date)
            .map_err(|error| self.generating(error))
    }

    fn generating(&self, error: DateError) -> DateError {
        tracing::error!(%error, format = %self.format, "failed to generate result");
        DateError::generating(error)
    }

    fn render(&self, date: Date) -> Result<Formatted> {
        validate_dates(&[date])?;
        let formatted = match self.format {
            OutputFormat::Date => Formatted::Date(date),
            OutputFormat::Number => Formatted::Number(date.time()),
            OutputFormat::String => Formatted::Text(date.to_date_string(&self.time_zone)),
            OutputFormat::LocaleString | OutputFormat::LocaleDateString => {
                let fields = self.local_fields(date)?;
                let formatter = LocaleFormatter::new(&self.locale)?;
                Formatted::Text(formatter.format_date(&fields, &self.locale_string_options))
            }
            OutputFormat::LocaleTimeString => {
                let fields = self.local_fields(date)?;
                let formatter = LocaleFormatter::new(&self.locale)?;
                Formatted::Text(formatter.format_time(&fields, &LocaleStringOptions::empty()))
            }
        };
        Ok(formatted)
    }
}

/// Fails with the 1-based position of the first invalid date.
pub fn validate_dates(dates: &[Date]) -> Result<()> {
    match dates.iter().position(|date| !date.is_valid()) {
        Some(index) => Err(DateError::InvalidDate { position: index + 1 }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::Distance;

    // Tuesday 2025-03-04 09:30:00 UTC
    fn reference() -> Date {
        Date::utc(2025, 3, 4, 9, 30, 0)
    }

    fn helper(format: OutputFormat) -> DateHelper {
        DateHelper::new(reference(), format).with_time_zone(TimeZone::Utc)
    }

    #[test]
    fn next_day_is_one_day_of_millis() {
        let next = helper(OutputFormat::Number)
            .next(&[Distance::new(1.0, Unit::Day).into()])
            .unwrap();
        assert_eq!(next.as_number(), Some(reference().time() + 86_400_000.0));
    }

    #[test]
    fn next_and_last_sum_offsets() {
        let h = helper(OutputFormat::Date);
        let offsets = [
            Offset::from(Distance::new(1.0, Unit::Hour)),
            Offset::from(DatePart::new().with(Unit::Minute, 15).with(Unit::Second, 25)),
        ];
        let next = h.next(&offsets).unwrap().as_date().unwrap();
        assert_eq!(next, Date::utc(2025, 3, 4, 10, 45, 25));
        let last = h.last(&offsets).unwrap().as_date().unwrap();
        assert_eq!(last, Date::utc(2025, 3, 4, 8, 14, 35));
    }

    #[test]
    fn months_and_years_are_fixed_lengths() {
        let h = helper(OutputFormat::Date);
        let month = h.next(&[Distance::new(1.0, Unit::Month).into()]).unwrap();
        assert_eq!(month.as_date(), Some(Date::utc(2025, 4, 4, 9, 30, 0)));
        let year = h.next(&[DatePart::new().with(Unit::Year, 1).into()]).unwrap();
        assert_eq!(year.as_date(), Some(Date::utc(2026, 3, 4, 9, 30, 0)));
    }

    #[test]
    fn sundays() {
        let h = helper(OutputFormat::Date);
        assert_eq!(
            h.next_sunday(None).unwrap().as_date(),
            Some(Date::utc(2025, 3, 9, 9, 30, 0))
        );
        assert_eq!(
            h.last_sunday(None).unwrap().as_date(),
            Some(Date::utc(2025, 3, 2, 9, 30, 0))
        );
    }

    #[test]
    fn a_sunday_is_its_own_next_and_last_sunday() {
        let h = helper(OutputFormat::Date);
        let sunday = Date::utc(2025, 3, 9, 18, 0, 0);
        assert_eq!(h.next_sunday(Some(sunday)).unwrap().as_date(), Some(sunday));
        assert_eq!(h.last_sunday(Some(sunday)).unwrap().as_date(), Some(sunday));
    }

    #[test]
    fn distance_reads_delta_as_calendar_fields() {
        let h = helper(OutputFormat::Date);
        let d1 = Date::parse("2020-01-01", &TimeZone::Utc);
        let d2 = Date::parse("2022-06-15", &TimeZone::Utc);
        let expected = DatePart::new()
            .with(Unit::Year, 2)
            .with(Unit::Month, 5)
            .with(Unit::Day, 14);
        assert_eq!(h.distance(d1, Some(d2)).unwrap(), expected);
        assert_eq!(h.distance(d2, Some(d1)).unwrap(), expected);
        assert!(h.distance(d1, Some(d1)).unwrap().is_empty());
    }

    #[test]
    fn distance_defaults_to_the_current_date() {
        let h = helper(OutputFormat::Date);
        let earlier = Date::utc(2025, 3, 4, 7, 0, 30);
        let expected = DatePart::new()
            .with(Unit::Hour, 2)
            .with(Unit::Minute, 29)
            .with(Unit::Second, 30);
        assert_eq!(h.distance(earlier, None).unwrap(), expected);
    }

    #[test]
    fn invalid_dates_report_their_position() {
        let h = helper(OutputFormat::Date);
        assert!(matches!(
            h.distance(Date::invalid(), Some(reference())),
            Err(DateError::InvalidDate { position: 1 })
        ));
        assert!(matches!(
            h.distance(reference(), Some(Date::invalid())),
            Err(DateError::InvalidDate { position: 2 })
        ));
        assert!(matches!(
            validate_dates(&[reference(), reference(), Date::invalid()]),
            Err(DateError::InvalidDate { position: 3 })
        ));
    }

    #[test]
    fn distances_beyond_the_time_range_fail() {
        let h = helper(OutputFormat::Date);
        let err = h
            .distance(Date::from_millis(-8e15), Some(Date::from_millis(8e15)))
            .unwrap_err();
        assert!(matches!(err, DateError::DistanceOutOfRange(delta) if delta == 1.6e16));
    }

    #[test]
    fn formatting_failures_are_wrapped() {
        let h = DateHelper::new(Date::invalid(), OutputFormat::Number);
        let err = h.next(&[]).unwrap_err();
        assert_eq!(err.to_string(), "Error generating result");
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("Invalid date! You must pass a date on 1 position.")
        );
    }

    #[test]
    fn date_parts_of_a_date() {
        let h = helper(OutputFormat::Date);
        let parts = h.get_date_part(reference()).unwrap();
        assert_eq!(parts.year, Some(2025));
        assert_eq!(parts.month, Some(2));
        assert_eq!(parts.day, Some(4));
        assert_eq!(parts.hour, Some(9));
        assert_eq!(parts.minute, Some(30));
        assert_eq!(parts.second, Some(0));
    }

    #[test]
    fn output_formats() {
        let h = helper(OutputFormat::LocaleString);
        assert_eq!(
            h.next(&[]).unwrap().as_text(),
            Some("Tuesday, 4 March 2025")
        );
        let h = helper(OutputFormat::LocaleTimeString).with_locale("id-ID");
        assert_eq!(h.next(&[]).unwrap().as_text(), Some("09.30.00"));
        let h = helper(OutputFormat::String);
        assert_eq!(
            h.next(&[]).unwrap().as_text(),
            Some("Tue Mar 04 2025 09:30:00 GMT+0000 (UTC)")
        );
    }
}
