//! Locale selection and locale-aware rendering of date fields.
//!
//! Names, field order, separators and hour cycles come from a small built-in
//! table; digits go through `icu::decimal` so locales with their own
//! numbering system render native digits.

use std::fmt;
use std::str::FromStr;

use fixed_decimal::Decimal;
use icu::decimal::options::{DecimalFormatterOptions, GroupingStrategy};
use icu::decimal::{DecimalFormatter, DecimalFormatterPreferences};
use icu::locale::{Locale as IcuLocale, locale};
use serde::{Deserialize, Serialize};

use crate::date::DateFields;
use crate::error::{DateError, Result};

pub const DEFAULT_LOCALE: &str = "en-ID";

/// A locale request: one or more BCP-47 tags in preference order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locales(Vec<String>);

impl Locales {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Locales(tags.into_iter().map(Into::into).collect())
    }

    pub fn tags(&self) -> &[String] {
        &self.0
    }

    /// First tag that parses, or `en`.
    pub fn resolve(&self) -> IcuLocale {
        self.0
            .iter()
            .find_map(|tag| tag.parse::<IcuLocale>().ok())
            .unwrap_or_else(|| locale!("en"))
    }
}

impl Default for Locales {
    fn default() -> Self {
        Locales::from(DEFAULT_LOCALE)
    }
}

impl From<&str> for Locales {
    fn from(tag: &str) -> Self {
        Locales(vec![tag.to_string()])
    }
}

impl From<String> for Locales {
    fn from(tag: String) -> Self {
        Locales(vec![tag])
    }
}

impl From<Vec<String>> for Locales {
    fn from(tags: Vec<String>) -> Self {
        Locales(tags)
    }
}

impl FromStr for Locales {
    type Err = std::convert::Infallible;

    /// Comma-separated tags.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Locales::new(
            s.split(',').map(str::trim).filter(|tag| !tag.is_empty()),
        ))
    }
}

impl fmt::Display for Locales {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    Long,
    Short,
    Narrow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumericStyle {
    #[serde(rename = "numeric")]
    Numeric,
    #[serde(rename = "2-digit")]
    TwoDigit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonthStyle {
    #[serde(rename = "numeric")]
    Numeric,
    #[serde(rename = "2-digit")]
    TwoDigit,
    #[serde(rename = "long")]
    Long,
    #[serde(rename = "short")]
    Short,
    #[serde(rename = "narrow")]
    Narrow,
}

/// The subset of `Intl.DateTimeFormatOptions` the helper understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleStringOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday: Option<TextStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<NumericStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<MonthStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<NumericStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<NumericStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<NumericStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<NumericStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour12: Option<bool>,
}

impl Default for LocaleStringOptions {
    /// Long weekday, numeric day, long month and numeric year.
    fn default() -> Self {
        LocaleStringOptions {
            weekday: Some(TextStyle::Long),
            year: Some(NumericStyle::Numeric),
            month: Some(MonthStyle::Long),
            day: Some(NumericStyle::Numeric),
            ..LocaleStringOptions::empty()
        }
    }
}

impl LocaleStringOptions {
    pub const fn empty() -> Self {
        LocaleStringOptions {
            weekday: None,
            year: None,
            month: None,
            day: None,
            hour: None,
            minute: None,
            second: None,
            hour12: None,
        }
    }

    fn has_date_fields(&self) -> bool {
        self.weekday.is_some() || self.year.is_some() || self.month.is_some() || self.day.is_some()
    }

    fn has_time_fields(&self) -> bool {
        self.hour.is_some() || self.minute.is_some() || self.second.is_some()
    }

    fn with_date_defaults(mut self) -> Self {
        if !self.has_date_fields() {
            self.year = Some(NumericStyle::Numeric);
            self.month = Some(MonthStyle::Numeric);
            self.day = Some(NumericStyle::Numeric);
        }
        self
    }

    fn with_time_defaults(mut self) -> Self {
        if !self.has_time_fields() {
            self.hour = Some(NumericStyle::Numeric);
            self.minute = Some(NumericStyle::Numeric);
            self.second = Some(NumericStyle::Numeric);
        }
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FieldOrder {
    Dmy,
    Mdy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HourCycle {
    H12,
    H23,
}

struct LocaleData {
    months_long: [&'static str; 12],
    months_short: [&'static str; 12],
    weekdays_long: [&'static str; 7],
    weekdays_short: [&'static str; 7],
    order: FieldOrder,
    numeric_separator: &'static str,
    /// Numeric day and month are zero-padded.
    numeric_pad: bool,
    day_suffix: &'static str,
    text_joiner: &'static str,
    weekday_separator: &'static str,
    date_time_separator: &'static str,
    time_separator: &'static str,
    hour_cycle: HourCycle,
}

const EN_MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const EN_MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const EN_WEEKDAYS: [&str; 7] = [
    "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
];
const EN_WEEKDAYS_SHORT: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const EN: LocaleData = LocaleData {
    months_long: EN_MONTHS,
    months_short: EN_MONTHS_SHORT,
    weekdays_long: EN_WEEKDAYS,
    weekdays_short: EN_WEEKDAYS_SHORT,
    order: FieldOrder::Dmy,
    numeric_separator: "/",
    numeric_pad: false,
    day_suffix: "",
    text_joiner: " ",
    weekday_separator: ", ",
    date_time_separator: ", ",
    time_separator: ":",
    hour_cycle: HourCycle::H12,
};

const EN_US: LocaleData = LocaleData {
    order: FieldOrder::Mdy,
    ..EN
};

const ID: LocaleData = LocaleData {
    months_long: [
        "Januari", "Februari", "Maret", "April", "Mei", "Juni", "Juli", "Agustus", "September",
        "Oktober", "November", "Desember",
    ],
    months_short: [
        "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
    ],
    weekdays_long: ["Minggu", "Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu"],
    weekdays_short: ["Min", "Sen", "Sel", "Rab", "Kam", "Jum", "Sab"],
    order: FieldOrder::Dmy,
    numeric_separator: "/",
    numeric_pad: false,
    day_suffix: "",
    text_joiner: " ",
    weekday_separator: ", ",
    date_time_separator: ", ",
    time_separator: ".",
    hour_cycle: HourCycle::H23,
};

const DE: LocaleData = LocaleData {
    months_long: [
        "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August", "September",
        "Oktober", "November", "Dezember",
    ],
    months_short: [
        "Jan.", "Feb.", "März", "Apr.", "Mai", "Juni", "Juli", "Aug.", "Sept.", "Okt.", "Nov.",
        "Dez.",
    ],
    weekdays_long: [
        "Sonntag", "Montag", "Dienstag", "Mittwoch", "Donnerstag", "Freitag", "Samstag",
    ],
    weekdays_short: ["So.", "Mo.", "Di.", "Mi.", "Do.", "Fr.", "Sa."],
    order: FieldOrder::Dmy,
    numeric_separator: ".",
    numeric_pad: false,
    day_suffix: ".",
    text_joiner: " ",
    weekday_separator: ", ",
    date_time_separator: ", ",
    time_separator: ":",
    hour_cycle: HourCycle::H23,
};

const FR: LocaleData = LocaleData {
    months_long: [
        "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
        "octobre", "novembre", "décembre",
    ],
    months_short: [
        "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.",
        "nov.", "déc.",
    ],
    weekdays_long: [
        "dimanche", "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi",
    ],
    weekdays_short: ["dim.", "lun.", "mar.", "mer.", "jeu.", "ven.", "sam."],
    order: FieldOrder::Dmy,
    numeric_separator: "/",
    numeric_pad: true,
    day_suffix: "",
    text_joiner: " ",
    weekday_separator: " ",
    date_time_separator: " ",
    time_separator: ":",
    hour_cycle: HourCycle::H23,
};

const ES: LocaleData = LocaleData {
    months_long: [
        "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre",
        "octubre", "noviembre", "diciembre",
    ],
    months_short: [
        "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
    ],
    weekdays_long: [
        "domingo", "lunes", "martes", "miércoles", "jueves", "viernes", "sábado",
    ],
    weekdays_short: ["dom", "lun", "mar", "mié", "jue", "vie", "sáb"],
    order: FieldOrder::Dmy,
    numeric_separator: "/",
    numeric_pad: false,
    day_suffix: "",
    text_joiner: " de ",
    weekday_separator: ", ",
    date_time_separator: ", ",
    time_separator: ":",
    hour_cycle: HourCycle::H23,
};

const NL: LocaleData = LocaleData {
    months_long: [
        "januari", "februari", "maart", "april", "mei", "juni", "juli", "augustus", "september",
        "oktober", "november", "december",
    ],
    months_short: [
        "jan", "feb", "mrt", "apr", "mei", "jun", "jul", "aug", "sep", "okt", "nov", "dec",
    ],
    weekdays_long: [
        "zondag", "maandag", "dinsdag", "woensdag", "donderdag", "vrijdag", "zaterdag",
    ],
    weekdays_short: ["zo", "ma", "di", "wo", "do", "vr", "za"],
    order: FieldOrder::Dmy,
    numeric_separator: "-",
    numeric_pad: false,
    day_suffix: "",
    text_joiner: " ",
    weekday_separator: " ",
    date_time_separator: ", ",
    time_separator: ":",
    hour_cycle: HourCycle::H23,
};

fn locale_data(locale: &IcuLocale) -> &'static LocaleData {
    let region = locale.id.region.as_ref().map(|r| r.as_str());
    match locale.id.language.as_str() {
        "id" => &ID,
        "de" => &DE,
        "fr" => &FR,
        "es" => &ES,
        "nl" => &NL,
        "en" if matches!(region, None | Some("US")) => &EN_US,
        _ => &EN,
    }
}

/// Renders date fields for one resolved locale.
pub struct LocaleFormatter {
    locale: IcuLocale,
    data: &'static LocaleData,
    decimal: DecimalFormatter,
}

impl LocaleFormatter {
    pub fn new(locales: &Locales) -> Result<Self> {
        let locale = locales.resolve();
        let prefs = DecimalFormatterPreferences::from(&locale);
        let mut options = DecimalFormatterOptions::default();
        options.grouping_strategy = Some(GroupingStrategy::Never);
        let decimal =
            DecimalFormatter::try_new(prefs, options).map_err(|e| DateError::LocaleData {
                locale: locale.to_string(),
                reason: e.to_string(),
            })?;
        Ok(LocaleFormatter {
            data: locale_data(&locale),
            locale,
            decimal,
        })
    }

    pub fn locale(&self) -> &IcuLocale {
        &self.locale
    }

    /// `toLocaleDateString`: adds numeric year/month/day when no date field
    /// is requested.
    pub fn format_date(&self, fields: &DateFields, options: &LocaleStringOptions) -> String {
        self.format(fields, &options.with_date_defaults())
    }

    /// `toLocaleTimeString`: adds numeric hour/minute/second when no time
    /// field is requested.
    pub fn format_time(&self, fields: &DateFields, options: &LocaleStringOptions) -> String {
        self.format(fields, &options.with_time_defaults())
    }

    /// Renders exactly the requested fields.
    pub fn format(&self, fields: &DateFields, options: &LocaleStringOptions) -> String {
        let date = self.date_part(fields, options);
        let time = self.time_part(fields, options);
        match (date.is_empty(), time.is_empty()) {
            (false, false) => format!("{}{}{}", date, self.data.date_time_separator, time),
            (false, true) => date,
            _ => time,
        }
    }

    fn date_part(&self, f: &DateFields, o: &LocaleStringOptions) -> String {
        let data = self.data;
        let day = o.day.map(|style| {
            let style = if data.numeric_pad && !is_textual(o.month) {
                NumericStyle::TwoDigit
            } else {
                style
            };
            self.number(f.day as i64, style)
        });
        let year = o.year.map(|style| match style {
            NumericStyle::Numeric => self.digits(f.year as i64),
            NumericStyle::TwoDigit => self.number(f.year.rem_euclid(100) as i64, style),
        });

        let body = match o.month {
            Some(MonthStyle::Long) => self.textual(day, data.months_long[f.month as usize], year),
            Some(MonthStyle::Short) => self.textual(day, data.months_short[f.month as usize], year),
            Some(MonthStyle::Narrow) => {
                self.textual(day, narrow(data.months_long[f.month as usize]), year)
            }
            Some(style) => {
                let style = match style {
                    MonthStyle::TwoDigit => NumericStyle::TwoDigit,
                    _ if data.numeric_pad => NumericStyle::TwoDigit,
                    _ => NumericStyle::Numeric,
                };
                let month = Some(self.number(f.month as i64 + 1, style));
                let ordered = match data.order {
                    FieldOrder::Dmy => [day, month, year],
                    FieldOrder::Mdy => [month, day, year],
                };
                ordered
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(data.numeric_separator)
            }
            None => [day, year].into_iter().flatten().collect::<Vec<_>>().join(" "),
        };

        let Some(style) = o.weekday else {
            return body;
        };
        let weekday = match style {
            TextStyle::Long => data.weekdays_long[f.weekday as usize].to_string(),
            TextStyle::Short => data.weekdays_short[f.weekday as usize].to_string(),
            TextStyle::Narrow => narrow(data.weekdays_long[f.weekday as usize]),
        };
        if body.is_empty() {
            weekday
        } else {
            format!("{}{}{}", weekday, data.weekday_separator, body)
        }
    }

    fn textual(&self, day: Option<String>, month: impl Into<String>, year: Option<String>) -> String {
        let data = self.data;
        let month = month.into();
        let day = day.map(|d| format!("{}{}", d, data.day_suffix));
        match (data.order, day, year) {
            (FieldOrder::Mdy, Some(d), Some(y)) => format!("{} {}, {}", month, d, y),
            (FieldOrder::Mdy, Some(d), None) => format!("{} {}", month, d),
            (FieldOrder::Mdy, None, Some(y)) => format!("{} {}", month, y),
            (FieldOrder::Dmy, day, year) => [day, Some(month), year]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(data.text_joiner),
            (_, None, None) => month,
        }
    }

    fn time_part(&self, f: &DateFields, o: &LocaleStringOptions) -> String {
        let data = self.data;
        let cycle = match o.hour12 {
            Some(true) => HourCycle::H12,
            Some(false) => HourCycle::H23,
            None => data.hour_cycle,
        };
        let hour = o.hour.map(|style| match cycle {
            HourCycle::H12 => {
                let h = match f.hour % 12 {
                    0 => 12,
                    h => h,
                };
                self.number(h as i64, style)
            }
            HourCycle::H23 => self.number(f.hour as i64, NumericStyle::TwoDigit),
        });
        let has_hour = hour.is_some();
        let minute = o.minute.map(|style| {
            let style = if has_hour { NumericStyle::TwoDigit } else { style };
            self.number(f.minute as i64, style)
        });
        let second = o.second.map(|style| {
            let style = if has_hour || minute.is_some() {
                NumericStyle::TwoDigit
            } else {
                style
            };
            self.number(f.second as i64, style)
        });

        let clock = [hour, minute, second]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(data.time_separator);
        if has_hour && cycle == HourCycle::H12 {
            let period = if f.hour < 12 { "AM" } else { "PM" };
            format!("{} {}", clock, period)
        } else {
            clock
        }
    }

    fn number(&self, n: i64, style: NumericStyle) -> String {
        match style {
            NumericStyle::Numeric => self.digits(n),
            NumericStyle::TwoDigit => {
                let n = n.rem_euclid(100);
                if n < 10 {
                    format!("{}{}", self.digits(0), self.digits(n))
                } else {
                    self.digits(n)
                }
            }
        }
    }

    fn digits(&self, n: i64) -> String {
        self.decimal.format(&Decimal::from(n)).to_string()
    }
}

fn is_textual(month: Option<MonthStyle>) -> bool {
    matches!(
        month,
        Some(MonthStyle::Long | MonthStyle::Short | MonthStyle::Narrow)
    )
}

fn narrow(name: &str) -> String {
    name.chars().next().map(|c| c.to_uppercase().collect()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Sunday 2025-03-09 14:05:09
    const FIELDS: DateFields = DateFields {
        year: 2025,
        month: 2,
        day: 9,
        weekday: 0,
        hour: 14,
        minute: 5,
        second: 9,
        millisecond: 0,
    };

    fn formatter(tag: &str) -> LocaleFormatter {
        LocaleFormatter::new(&Locales::from(tag)).unwrap()
    }

    #[test]
    fn default_options_per_locale() {
        let options = LocaleStringOptions::default();
        let cases = [
            ("en-ID", "Sunday, 9 March 2025"),
            ("en-US", "Sunday, March 9, 2025"),
            ("id-ID", "Minggu, 9 Maret 2025"),
            ("de-DE", "Sonntag, 9. März 2025"),
            ("fr-FR", "dimanche 9 mars 2025"),
            ("es-ES", "domingo, 9 de marzo de 2025"),
            ("nl-NL", "zondag 9 maart 2025"),
        ];
        for (tag, expected) in cases {
            assert_eq!(formatter(tag).format_date(&FIELDS, &options), expected, "{tag}");
        }
    }

    #[test]
    fn numeric_dates() {
        let options = LocaleStringOptions::empty();
        assert_eq!(formatter("en-US").format_date(&FIELDS, &options), "3/9/2025");
        assert_eq!(formatter("en-ID").format_date(&FIELDS, &options), "9/3/2025");
        assert_eq!(formatter("de").format_date(&FIELDS, &options), "9.3.2025");
        assert_eq!(formatter("fr").format_date(&FIELDS, &options), "09/03/2025");
        assert_eq!(formatter("nl").format_date(&FIELDS, &options), "9-3-2025");
    }

    #[test]
    fn times() {
        let options = LocaleStringOptions::empty();
        assert_eq!(formatter("en-US").format_time(&FIELDS, &options), "2:05:09 PM");
        assert_eq!(formatter("id-ID").format_time(&FIELDS, &options), "14.05.09");
        assert_eq!(formatter("de-DE").format_time(&FIELDS, &options), "14:05:09");
        let forced = LocaleStringOptions {
            hour12: Some(false),
            ..LocaleStringOptions::empty()
        };
        assert_eq!(formatter("en-US").format_time(&FIELDS, &forced), "14:05:09");
    }

    #[test]
    fn short_and_two_digit_styles() {
        let options = LocaleStringOptions {
            weekday: Some(TextStyle::Short),
            day: Some(NumericStyle::TwoDigit),
            month: Some(MonthStyle::Short),
            year: Some(NumericStyle::TwoDigit),
            ..LocaleStringOptions::empty()
        };
        assert_eq!(formatter("en-US").format_date(&FIELDS, &options), "Sun, Mar 09, 25");
    }

    #[test]
    fn date_with_time_fields() {
        let options = LocaleStringOptions {
            hour: Some(NumericStyle::Numeric),
            minute: Some(NumericStyle::Numeric),
            ..LocaleStringOptions::empty()
        };
        assert_eq!(formatter("en-US").format_date(&FIELDS, &options), "3/9/2025, 2:05 PM");
    }

    #[test]
    fn locale_lists_fall_back() {
        let locales = Locales::new(["not a tag!", "de-AT"]);
        assert_eq!(locales.resolve().to_string(), "de-AT");
        assert_eq!(Locales::new(Vec::<String>::new()).resolve().to_string(), "en");
        assert_eq!("en-US, id-ID".parse::<Locales>().ok(), Some(Locales::new(["en-US", "id-ID"])));
    }

    #[test]
    fn options_deserialize_like_intl() {
        let options: LocaleStringOptions =
            serde_json::from_str(r#"{"month": "2-digit", "hour12": true}"#).unwrap();
        assert_eq!(options.month, Some(MonthStyle::TwoDigit));
        assert_eq!(options.hour12, Some(true));
        assert_eq!(options.weekday, None);
    }
}
