//! Command-line front end for `aio-date`.

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::date::Date;
use crate::error::{DateError, Result};
use crate::format::{Formatted, OutputFormat};
use crate::helper::DateHelper;
use crate::intl::Locales;
use crate::part::{DatePart, Distance, Offset};
use crate::schedule::{NotificationConfig, Range, ScheduleTime, generate_schedule};
use crate::unit::Unit;
use crate::zone::TimeZone;

#[derive(Debug, Parser)]
#[command(
    name = "aio-date",
    version,
    about = "Date arithmetic relative to a reference date"
)]
pub struct Cli {
    /// Reference date (ISO-8601 or `toString` layout); defaults to now
    #[arg(long, global = true)]
    pub at: Option<String>,

    /// Time zone for local fields: `utc`, `local` or an IANA name
    #[arg(long, global = true, env = "AIO_DATE_TZ")]
    pub tz: Option<TimeZone>,

    /// Comma-separated locale tags
    #[arg(long, global = true, env = "AIO_DATE_LOCALE")]
    pub locale: Option<Locales>,

    /// Output format: false, toLocaleString, toLocaleDateString, toNumber,
    /// toString or toLocaleTimeString
    #[arg(long, global = true, default_value = "false")]
    pub format: OutputFormat,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Gap between two dates (the second defaults to the reference date)
    Distance { from: String, to: Option<String> },
    /// Move the reference date forward
    Next(ShiftArgs),
    /// Move the reference date back
    Last(ShiftArgs),
    /// Milliseconds per unit, or the whole table
    Multiplier { unit: Option<Unit> },
    /// Local fields of a date
    Part { date: String },
    /// Carry excess between units
    Normalize(PartArgs),
    /// Next and last Sunday of a date (defaults to the reference date)
    Sundays { date: Option<String> },
    /// Notification dates for a recurring range
    Schedule(ScheduleArgs),
}

#[derive(Debug, Default, Args)]
pub struct PartArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub year: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub month: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub week: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub day: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub hour: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub minute: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub second: Option<i64>,
}

impl From<&PartArgs> for DatePart {
    fn from(args: &PartArgs) -> Self {
        DatePart {
            year: args.year,
            month: args.month,
            week: args.week,
            day: args.day,
            hour: args.hour,
            minute: args.minute,
            second: args.second,
        }
    }
}

#[derive(Debug, Args)]
pub struct ShiftArgs {
    #[command(flatten)]
    pub parts: PartArgs,

    /// A count of `--unit`, added to any per-unit flags
    #[arg(long, requires = "unit", allow_negative_numbers = true)]
    pub distance: Option<f64>,

    #[arg(long, requires = "distance")]
    pub unit: Option<Unit>,
}

impl ShiftArgs {
    fn offsets(&self) -> Vec<Offset> {
        let mut offsets = Vec::new();
        let parts = DatePart::from(&self.parts);
        if !parts.is_empty() {
            offsets.push(parts.into());
        }
        if let (Some(distance), Some(unit)) = (self.distance, self.unit) {
            offsets.push(Distance::new(distance, unit).into());
        }
        offsets
    }
}

#[derive(Debug, Args)]
pub struct ScheduleArgs {
    /// twice a day, three times a day, dialy, weekly, twice a week or monthly
    #[arg(long)]
    pub range: Range,
    #[arg(long)]
    pub hour: u32,
    #[arg(long)]
    pub minute: Option<u32>,
    #[arg(long)]
    pub second: Option<u32>,
    #[arg(long)]
    pub qty: Option<u32>,
    #[arg(long)]
    pub start_id: Option<i64>,
}

impl From<&ScheduleArgs> for NotificationConfig {
    fn from(args: &ScheduleArgs) -> Self {
        NotificationConfig {
            range: args.range.clone(),
            time: ScheduleTime {
                hour: args.hour,
                minute: args.minute,
                second: args.second,
            },
            qty: args.qty,
            start_id: args.start_id,
        }
    }
}

#[derive(Serialize)]
struct Sundays {
    next: Formatted,
    last: Formatted,
}

impl Cli {
    /// The helper described by the global options.
    pub fn helper(&self) -> DateHelper {
        let zone = self.tz.unwrap_or_else(TimeZone::system);
        let at = match &self.at {
            Some(text) => Date::parse(text, &zone),
            None => Date::now(),
        };
        let helper = DateHelper::new(at, self.format).with_time_zone(zone);
        match &self.locale {
            Some(locale) => helper.with_locale(locale.clone()),
            None => helper,
        }
    }
}

/// Runs the command and returns what should be printed.
pub fn run(cli: &Cli) -> Result<String> {
    let helper = cli.helper();
    let zone = *helper.time_zone();
    tracing::debug!(
        at = %helper.current_date(),
        zone = %zone,
        format = %helper.format(),
        "running command"
    );

    match &cli.command {
        Command::Distance { from, to } => {
            let from = Date::parse(from, &zone);
            let to = to.as_deref().map(|text| Date::parse(text, &zone));
            to_json(&helper.distance(from, to)?)
        }
        Command::Next(args) => Ok(helper.next(&args.offsets())?.to_string()),
        Command::Last(args) => Ok(helper.last(&args.offsets())?.to_string()),
        Command::Multiplier { unit: Some(unit) } => Ok(helper.multiplier(*unit).to_string()),
        Command::Multiplier { unit: None } => to_json(&helper.multipliers()),
        Command::Part { date } => {
            let date = Date::parse(date, &zone);
            to_json(&helper.get_date_part(date)?)
        }
        Command::Normalize(args) => to_json(&helper.get_date_part(DatePart::from(args))?),
        Command::Sundays { date } => {
            let date = date.as_deref().map(|text| Date::parse(text, &zone));
            to_json(&Sundays {
                next: helper.next_sunday(date)?,
                last: helper.last_sunday(date)?,
            })
        }
        Command::Schedule(args) => to_json(&generate_schedule(&helper, &args.into())?),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(DateError::from)
}
