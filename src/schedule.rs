//! Recurring notification dates.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::date::Date;
use crate::error::Result;
use crate::helper::DateHelper;
use crate::part::Distance;
use crate::unit::Unit;

/// How often a notification repeats.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Range {
    TwiceADay,
    ThreeTimesADay,
    Daily,
    Weekly,
    TwiceAWeek,
    Monthly,
    /// Unrecognized ranges schedule at the current date.
    Other(String),
}

impl Range {
    pub fn as_str(&self) -> &str {
        match self {
            Range::TwiceADay => "twice a day",
            Range::ThreeTimesADay => "three times a day",
            Range::Daily => "dialy",
            Range::Weekly => "weekly",
            Range::TwiceAWeek => "twice a week",
            Range::Monthly => "monthly",
            Range::Other(other) => other,
        }
    }
}

impl FromStr for Range {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "twice a day" => Range::TwiceADay,
            "three times a day" => Range::ThreeTimesADay,
            "dialy" | "daily" => Range::Daily,
            "weekly" => Range::Weekly,
            "twice a week" => Range::TwiceAWeek,
            "monthly" => Range::Monthly,
            other => Range::Other(other.to_string()),
        })
    }
}

impl From<String> for Range {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(range) => range,
            Err(never) => match never {},
        }
    }
}

impl From<Range> for String {
    fn from(range: Range) -> Self {
        range.as_str().to_string()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local time of day a notification fires at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTime {
    pub hour: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<u32>,
}

impl ScheduleTime {
    pub fn new(hour: u32) -> Self {
        ScheduleTime {
            hour,
            minute: None,
            second: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationConfig {
    pub range: Range,
    pub time: ScheduleTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_id: Option<i64>,
}

impl NotificationConfig {
    pub fn new(range: Range, time: ScheduleTime) -> Self {
        NotificationConfig {
            range,
            time,
            qty: None,
            start_id: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScheduledNotification {
    pub id: i64,
    pub at: Date,
}

/// The `i`-th notification date relative to the helper's current date.
///
/// Fails with [`DateError::Generating`](crate::DateError::Generating) when the
/// result is not a valid date.
pub fn schedule_date(helper: &DateHelper, i: u32, config: &NotificationConfig) -> Result<Date> {
    let zone = helper.time_zone();
    let minute = config.time.minute.unwrap_or(0);
    let second = config.time.second.unwrap_or(0);
    let i = f64::from(i);

    let (count, unit, hour) = match config.range {
        Range::TwiceADay => {
            let hour = if i % 2.0 == 0.0 { 7 } else { 21 };
            (i * 4.0, Unit::Hour, hour)
        }
        Range::ThreeTimesADay => {
            let hour = match i % 3.0 {
                r if r == 0.0 => 8,
                r if r == 1.0 => 13,
                _ => 20,
            };
            (i * 8.0, Unit::Hour, hour)
        }
        Range::Daily => {
            let current_hour = helper
                .current_date()
                .fields(zone)
                .map_or(0, |f| i64::from(f.hour));
            let days = if current_hour < i64::from(config.time.hour) - 1 {
                i
            } else {
                i + 1.0
            };
            (days, Unit::Day, config.time.hour)
        }
        Range::Weekly => (i, Unit::Week, config.time.hour),
        Range::TwiceAWeek => (i * 3.0, Unit::Day, config.time.hour),
        Range::Monthly => (i, Unit::Month, config.time.hour),
        Range::Other(_) => return helper.checked_result(helper.current_date()),
    };

    let at = helper
        .shift_forward(&[Distance::new(count, unit).into()])
        .with_hms(zone, hour, minute, second);
    helper.checked_result(at)
}

/// [`schedule_date`] against a fresh helper at the current instant.
pub fn generate_schedule_date(i: u32, config: &NotificationConfig) -> Result<Date> {
    schedule_date(&DateHelper::default(), i, config)
}

/// `qty` notifications (default 1) numbered from `start_id` (default 0).
pub fn generate_schedule(
    helper: &DateHelper,
    config: &NotificationConfig,
) -> Result<Vec<ScheduledNotification>> {
    let start_id = config.start_id.unwrap_or(0);
    let qty = config.qty.unwrap_or(1);
    tracing::debug!(range = %config.range, qty, start_id, "generating schedule");
    (0..qty)
        .map(|i| {
            Ok(ScheduledNotification {
                id: start_id.saturating_add(i64::from(i)),
                at: schedule_date(helper, i, config)?,
            })
        })
        .collect()
}
