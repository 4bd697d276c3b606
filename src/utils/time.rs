//! Time utilities for timezone resolution and offset parsing

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Zone in which instants are rendered for a given run.
///
/// `Source` keeps whatever offset the instant was parsed with, the other
/// variants convert every instant to a single convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneSpec {
    Source,
    Utc,
    Named(Tz),
    Fixed(FixedOffset),
}

impl ZoneSpec {
    /// Re-express an instant in this zone without changing the instant itself
    pub fn apply(&self, dt: &DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        match self {
            ZoneSpec::Source => *dt,
            ZoneSpec::Utc => dt.with_timezone(&Utc).fixed_offset(),
            ZoneSpec::Named(tz) => dt.with_timezone(tz).fixed_offset(),
            ZoneSpec::Fixed(offset) => dt.with_timezone(offset),
        }
    }
}

impl FromStr for ZoneSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "source" => return Ok(ZoneSpec::Source),
            "utc" | "gmt" | "z" => return Ok(ZoneSpec::Utc),
            _ => {}
        }

        if trimmed.starts_with('+') || trimmed.starts_with('-') {
            return parse_fixed_offset(trimmed).map(ZoneSpec::Fixed);
        }

        parse_timezone(trimmed).map(ZoneSpec::Named)
    }
}

impl fmt::Display for ZoneSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneSpec::Source => write!(f, "source"),
            ZoneSpec::Utc => write!(f, "utc"),
            ZoneSpec::Named(tz) => write!(f, "{}", tz.name()),
            ZoneSpec::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

/// Parse a named IANA timezone such as "Asia/Kathmandu"
pub fn parse_timezone(tz_str: &str) -> Result<Tz, String> {
    tz_str.trim().parse::<Tz>().map_err(|_| {
        format!("Invalid timezone: '{tz_str}'. Use a named timezone (e.g., 'Asia/Kathmandu')")
    })
}

/// Parse fixed offset timezone formats like "+01:00", "+0545", etc.
pub fn parse_fixed_offset(offset_str: &str) -> Result<FixedOffset, String> {
    let offset_str = offset_str.trim();

    let re = Regex::new(r"^([+-])(\d{2}):?(\d{2})$").map_err(|e| format!("Regex error: {e}"))?;

    let caps = re
        .captures(offset_str)
        .ok_or_else(|| format!("Invalid offset format: '{offset_str}'"))?;

    let sign = if &caps[1] == "+" { 1 } else { -1 };
    let hours: i32 = caps[2].parse().map_err(|_| "Invalid hours in offset")?;
    let minutes: i32 = caps[3].parse().map_err(|_| "Invalid minutes in offset")?;

    if hours > 23 || minutes > 59 {
        return Err("Invalid time values in offset".to_string());
    }

    let total_seconds = sign * (hours * 3600 + minutes * 60);

    FixedOffset::east_opt(total_seconds).ok_or_else(|| "Invalid timezone offset".to_string())
}

/// Midnight at the start of `date` in `tz`.
///
/// Zones that skip midnight on a DST change resolve to the earliest valid
/// instant of that day.
pub fn local_midnight(tz: &Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| (1..=3).find_map(|h| tz.from_local_datetime(&date.and_hms_opt(h, 0, 0)?).earliest()))
}

/// Drop minutes, seconds and sub-seconds on the instant's own local clock
pub fn truncate_to_hour<T: TimeZone>(dt: &DateTime<T>) -> DateTime<T> {
    dt.with_nanosecond(0)
        .and_then(|d| d.with_second(0))
        .and_then(|d| d.with_minute(0))
        .unwrap_or_else(|| dt.clone())
}
