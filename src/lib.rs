//! Date arithmetic relative to a reference date: offsets by unit or by date
//! parts, carry normalization, distances between dates, Sunday lookup and
//! recurring notification schedules.

pub mod cli;
pub mod date;
pub mod error;
pub mod format;
pub mod helper;
pub mod intl;
pub mod part;
pub mod schedule;
pub mod time;
pub mod unit;
pub mod zone;

pub use date::{Date, DateFields};
pub use error::{DateError, Result};
pub use format::{Formatted, OutputFormat};
pub use helper::{DateHelper, PartSource, validate_dates};
pub use intl::{LocaleFormatter, LocaleStringOptions, Locales};
pub use part::{DatePart, Distance, Offset};
pub use schedule::{
    NotificationConfig, Range, ScheduleTime, ScheduledNotification, generate_schedule,
    generate_schedule_date, schedule_date,
};
pub use unit::{Multipliers, Unit};
pub use zone::TimeZone;
