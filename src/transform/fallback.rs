//! Placeholder schedule for channels that arrive without guide data.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde_json::Value;

use crate::models::{RawChannel, RawProgramme};
use crate::utils::time::truncate_to_hour;

/// One-hour programmes covering `days` days from the current local hour,
/// carrying the channel's own title, synopsis, tags, genres and artwork
pub fn fallback_programmes(
    channel: &RawChannel,
    now: DateTime<Utc>,
    tz: &Tz,
    days: u32,
) -> Vec<RawProgramme> {
    let first_hour = truncate_to_hour(&now.with_timezone(tz));
    let slots = i64::from(days) * 24;

    (0..slots)
        .map(|slot| {
            let start = first_hour + Duration::hours(slot);
            let stop = start + Duration::hours(1);
            RawProgramme {
                title: channel.title.clone(),
                full_synopsis: channel.full_synopsis.clone(),
                catogory: channel.catogory.clone(),
                genres: channel.genres.clone(),
                images: channel.images.iter().take(1).cloned().collect(),
                start: Some(Value::String(start.fixed_offset().to_rfc3339())),
                stop: Some(Value::String(stop.fixed_offset().to_rfc3339())),
                ..RawProgramme::default()
            }
        })
        .collect()
}
