//! The time zone used to read and write "local" date fields.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, Offset, TimeZone as _, Utc};
use chrono_tz::Tz;

use crate::error::DateError;
use crate::time::{MS_PER_DAY, MS_PER_MINUTE, MS_PER_SECOND, to_naive};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeZone {
    Utc,
    /// Host offset as reported by chrono, used when the host zone has no IANA name.
    Local,
    Named(Tz),
}

impl TimeZone {
    /// The host's zone, resolved to its IANA name when possible.
    pub fn system() -> Self {
        match iana_time_zone::get_timezone() {
            Ok(name) => match name.parse::<Tz>() {
                Ok(tz) => TimeZone::Named(tz),
                Err(_) => {
                    tracing::debug!(zone = %name, "host zone not in tz database, using local offset");
                    TimeZone::Local
                }
            },
            Err(error) => {
                tracing::debug!(%error, "host zone lookup failed, using local offset");
                TimeZone::Local
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TimeZone::Utc => "UTC",
            TimeZone::Local => "Local",
            TimeZone::Named(tz) => tz.name(),
        }
    }

    /// UTC offset in milliseconds at the UTC instant `t`.
    pub fn offset_ms(&self, t: f64) -> f64 {
        let Some(naive) = to_naive(t) else {
            return 0.0;
        };
        let secs = match self {
            TimeZone::Utc => 0,
            TimeZone::Local => Local.offset_from_utc_datetime(&naive).local_minus_utc(),
            TimeZone::Named(tz) => tz.offset_from_utc_datetime(&naive).fix().local_minus_utc(),
        };
        secs as f64 * MS_PER_SECOND
    }

    pub fn local_time(&self, t: f64) -> f64 {
        t + self.offset_ms(t)
    }

    /// Resolves a local wall-clock time value back to UTC.
    ///
    /// Ambiguous wall-clock times take the earlier instant. Times skipped by a
    /// forward transition are read with the offset in force before it, which
    /// moves them forward by the size of the gap.
    pub fn utc_time(&self, lt: f64) -> f64 {
        let Some(naive) = to_naive(lt) else {
            return lt;
        };
        let secs = match self {
            TimeZone::Utc => Some(0),
            TimeZone::Local => Local
                .offset_from_local_datetime(&naive)
                .earliest()
                .map(|o| o.local_minus_utc()),
            TimeZone::Named(tz) => tz
                .offset_from_local_datetime(&naive)
                .earliest()
                .map(|o| o.fix().local_minus_utc()),
        };
        match secs {
            Some(secs) => lt - secs as f64 * MS_PER_SECOND,
            None => lt - self.offset_ms(lt - MS_PER_DAY),
        }
    }

    /// Short zone name at `t`, as shown by `toString` output.
    pub fn abbreviation(&self, t: f64) -> String {
        match (self, to_naive(t)) {
            (TimeZone::Utc, _) => "UTC".to_string(),
            (TimeZone::Named(tz), Some(naive)) => tz.offset_from_utc_datetime(&naive).to_string(),
            (TimeZone::Local, Some(naive)) => {
                DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc)
                    .with_timezone(&Local)
                    .format("%Z")
                    .to_string()
            }
            (_, None) => gmt_offset(self.offset_ms(t)),
        }
    }
}

impl Default for TimeZone {
    fn default() -> Self {
        TimeZone::system()
    }
}

impl fmt::Display for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimeZone {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("utc") || s.eq_ignore_ascii_case("z") {
            return Ok(TimeZone::Utc);
        }
        if s.eq_ignore_ascii_case("local") || s.eq_ignore_ascii_case("system") {
            return Ok(TimeZone::system());
        }
        s.parse::<Tz>()
            .map(TimeZone::Named)
            .map_err(|_| DateError::UnknownTimeZone(s.to_string()))
    }
}

impl From<Tz> for TimeZone {
    fn from(tz: Tz) -> Self {
        TimeZone::Named(tz)
    }
}

/// `GMT+0700`-style rendering of an offset in milliseconds.
pub(crate) fn gmt_offset(offset_ms: f64) -> String {
    let offset_min = (offset_ms / MS_PER_MINUTE) as i32;
    let sign = if offset_min >= 0 { '+' } else { '-' };
    let abs = offset_min.unsigned_abs();
    format!("GMT{}{:02}{:02}", sign, abs / 60, abs % 60)
}
