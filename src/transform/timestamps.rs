//! Programme start/stop resolution.
//!
//! Upstream variants encode programme timing three ways: ISO-8601 instants
//! (`start`/`stop`), epoch milliseconds (`startTime`/`endTime` numbers) and a
//! provider-local calendar date paired with time-of-day strings. Anything
//! that cannot be resolved yields `None` and the programme is dropped.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde_json::Value;

use crate::models::RawProgramme;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%d-%m-%Y", "%d/%m/%Y"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];
const ZONED_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Resolve a programme's start and stop instants
pub fn resolve_instants(
    raw: &RawProgramme,
    tz: &Tz,
) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    if raw.start.is_some() || raw.stop.is_some() {
        let start = parse_instant(raw.start.as_ref()?, tz)?;
        let stop = parse_instant(raw.stop.as_ref()?, tz)?;
        return Some((start, stop));
    }

    let start_value = raw.start_time.as_ref()?;
    let end_value = raw.end_time.as_ref()?;

    if let (Some(start_ms), Some(end_ms)) = (epoch_millis(start_value), epoch_millis(end_value)) {
        return Some((from_epoch_millis(start_ms, tz)?, from_epoch_millis(end_ms, tz)?));
    }

    let date = parse_date(raw.date.as_ref()?)?;
    combine_date_and_times(date, start_value.as_str()?, end_value.as_str()?, tz)
}

/// Combine a local date with start/end times of day; an end earlier than
/// (or equal to) the start belongs to the following day
pub fn combine_date_and_times(
    date: NaiveDate,
    start: &str,
    end: &str,
    tz: &Tz,
) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    let start_time = parse_time_of_day(start)?;
    let end_time = parse_time_of_day(end)?;

    let end_date = if end_time <= start_time {
        date.succ_opt()?
    } else {
        date
    };

    Some((
        localize(tz, &date.and_time(start_time))?,
        localize(tz, &end_date.and_time(end_time))?,
    ))
}

/// Parse a single instant: epoch milliseconds, a zoned ISO-8601 string, or
/// a zone-less ISO string interpreted in the provider zone
pub fn parse_instant(value: &Value, tz: &Tz) -> Option<DateTime<FixedOffset>> {
    if let Some(ms) = epoch_millis(value) {
        return from_epoch_millis(ms, tz);
    }

    let text = value.as_str()?.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }
    if let Some(dt) = ZONED_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
    {
        return Some(dt);
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .and_then(|naive| localize(tz, &naive))
}

/// Epoch milliseconds from a JSON number or an all-digit string
pub fn epoch_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
                s.parse().ok()
            } else {
                None
            }
        }
        _ => None,
    }
}

fn from_epoch_millis(ms: i64, tz: &Tz) -> Option<DateTime<FixedOffset>> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.with_timezone(tz).fixed_offset())
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn parse_time_of_day(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
}

fn localize(tz: &Tz, naive: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    tz.from_local_datetime(naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
}
