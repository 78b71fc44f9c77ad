//! Output formats for the dates returned by the helper.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::date::Date;
use crate::error::DateError;

/// How the helper returns a computed date. Parsed from the flag strings
/// `false`, `toLocaleString`, `toLocaleDateString`, `toNumber`, `toString`
/// and `toLocaleTimeString`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Date,
    LocaleString,
    LocaleDateString,
    Number,
    String,
    LocaleTimeString,
}

impl OutputFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Date => "false",
            OutputFormat::LocaleString => "toLocaleString",
            OutputFormat::LocaleDateString => "toLocaleDateString",
            OutputFormat::Number => "toNumber",
            OutputFormat::String => "toString",
            OutputFormat::LocaleTimeString => "toLocaleTimeString",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "false" | "date" => Ok(OutputFormat::Date),
            "toLocaleString" => Ok(OutputFormat::LocaleString),
            "toLocaleDateString" => Ok(OutputFormat::LocaleDateString),
            "toNumber" => Ok(OutputFormat::Number),
            "toString" => Ok(OutputFormat::String),
            "toLocaleTimeString" => Ok(OutputFormat::LocaleTimeString),
            other => Err(DateError::UnknownFormat(other.to_string())),
        }
    }
}

/// A date rendered according to an [`OutputFormat`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Formatted {
    Date(Date),
    Text(String),
    Number(f64),
}

impl Formatted {
    pub fn as_date(&self) -> Option<Date> {
        match self {
            Formatted::Date(date) => Some(*date),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Formatted::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Formatted::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Formatted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formatted::Date(date) => fmt::Display::fmt(date, f),
            Formatted::Text(text) => f.write_str(text),
            Formatted::Number(n) => f.write_str(&number_to_string(*n)),
        }
    }
}

/// JS `Number.prototype.toString` rendering.
fn number_to_string(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x == 0.0 {
        return "0".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let mut buf = ryu_js::Buffer::new();
    buf.format(x).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        assert_eq!("false".parse::<OutputFormat>().ok(), Some(OutputFormat::Date));
        assert_eq!("toNumber".parse::<OutputFormat>().ok(), Some(OutputFormat::Number));
        assert_eq!(
            "toLocaleTimeString".parse::<OutputFormat>().ok(),
            Some(OutputFormat::LocaleTimeString)
        );
        assert!(matches!(
            "toJSON".parse::<OutputFormat>(),
            Err(DateError::UnknownFormat(_))
        ));
    }

    #[test]
    fn numbers_print_like_js() {
        assert_eq!(Formatted::Number(1_741_478_400_000.0).to_string(), "1741478400000");
        assert_eq!(Formatted::Number(-0.0).to_string(), "0");
        assert_eq!(Formatted::Number(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn dates_print_as_iso() {
        let formatted = Formatted::Date(Date::from_millis(0.0));
        assert_eq!(formatted.to_string(), "1970-01-01T00:00:00.000Z");
        assert_eq!(
            serde_json::to_string(&formatted).ok().as_deref(),
            Some("\"1970-01-01T00:00:00.000Z\"")
        );
    }
}
