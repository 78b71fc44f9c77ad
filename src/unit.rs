use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DateError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

const SECOND: i64 = 1000;
const MINUTE: i64 = SECOND * 60;
const HOUR: i64 = MINUTE * 60;
const DAY: i64 = HOUR * 24;
const WEEK: i64 = DAY * 7;
// Months and years are fixed-length approximations.
const MONTH: i64 = DAY * 31;
const YEAR: i64 = DAY * 365;

impl Unit {
    pub const ALL: [Unit; 7] = [
        Unit::Second,
        Unit::Minute,
        Unit::Hour,
        Unit::Day,
        Unit::Week,
        Unit::Month,
        Unit::Year,
    ];

    /// Length of one unit in milliseconds.
    pub const fn multiplier(self) -> i64 {
        match self {
            Unit::Second => SECOND,
            Unit::Minute => MINUTE,
            Unit::Hour => HOUR,
            Unit::Day => DAY,
            Unit::Week => WEEK,
            Unit::Month => MONTH,
            Unit::Year => YEAR,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Unit::Second => "second",
            Unit::Minute => "minute",
            Unit::Hour => "hour",
            Unit::Day => "day",
            Unit::Week => "week",
            Unit::Month => "month",
            Unit::Year => "year",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let name = name.strip_suffix('s').unwrap_or(&name);
        Unit::ALL
            .into_iter()
            .find(|unit| unit.as_str() == name)
            .ok_or_else(|| DateError::UnknownUnit(s.to_string()))
    }
}

/// Every unit with its length in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Multipliers {
    pub second: i64,
    pub minute: i64,
    pub hour: i64,
    pub day: i64,
    pub week: i64,
    pub month: i64,
    pub year: i64,
}

impl Multipliers {
    pub const fn new() -> Self {
        Multipliers {
            second: SECOND,
            minute: MINUTE,
            hour: HOUR,
            day: DAY,
            week: WEEK,
            month: MONTH,
            year: YEAR,
        }
    }

    pub const fn get(&self, unit: Unit) -> i64 {
        match unit {
            Unit::Second => self.second,
            Unit::Minute => self.minute,
            Unit::Hour => self.hour,
            Unit::Day => self.day,
            Unit::Week => self.week,
            Unit::Month => self.month,
            Unit::Year => self.year,
        }
    }
}

impl Default for Multipliers {
    fn default() -> Self {
        Multipliers::new()
    }
}
