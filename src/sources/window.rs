//! Request time window and its two wire encodings.

use chrono::{DateTime, Days, Duration, FixedOffset, Utc};
use chrono_tz::Tz;

use crate::config::{WindowConfig, WindowEncoding};
use crate::utils::time::{ZoneSpec, local_midnight};

const QUERY_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Closed interval of instants requested from the listings endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl TimeWindow {
    /// From provider-local midnight `days_behind` days ago to one second
    /// before provider-local midnight `days_ahead` days from today
    pub fn around(now: DateTime<Utc>, tz: &Tz, days_behind: u32, days_ahead: u32) -> Option<Self> {
        let today = now.with_timezone(tz).date_naive();
        let first_day = today.checked_sub_days(Days::new(u64::from(days_behind)))?;
        let last_midnight = today.checked_add_days(Days::new(u64::from(days_ahead)))?;

        Some(Self {
            start: local_midnight(tz, first_day)?.fixed_offset(),
            end: (local_midnight(tz, last_midnight)? - Duration::seconds(1)).fixed_offset(),
        })
    }

    /// `start`/`stop` parameters as percent-encoded `YYYY-MM-DD HH:MM:SS`
    /// strings rendered in `zone`
    pub fn encoded_query(&self, config: &WindowConfig, zone: ZoneSpec) -> String {
        format!(
            "{}={}&{}={}",
            config.start_param,
            urlencoding::encode(&self.format_in(&self.start, zone)),
            config.stop_param,
            urlencoding::encode(&self.format_in(&self.end, zone)),
        )
    }

    /// `start`/`stop` form fields as epoch milliseconds
    pub fn form_fields(&self, config: &WindowConfig) -> Vec<(String, String)> {
        vec![
            (
                config.start_param.clone(),
                self.start.timestamp_millis().to_string(),
            ),
            (
                config.stop_param.clone(),
                self.end.timestamp_millis().to_string(),
            ),
        ]
    }

    fn format_in(&self, instant: &DateTime<FixedOffset>, zone: ZoneSpec) -> String {
        zone.apply(instant).format(QUERY_DATETIME_FORMAT).to_string()
    }
}

/// How the window travels to the listings endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowPayload {
    /// Appended to the URL query string of a GET
    Query(String),
    /// Sent as a form-encoded POST body
    Form(Vec<(String, String)>),
}

impl WindowPayload {
    pub fn build(window: &TimeWindow, config: &WindowConfig, zone: ZoneSpec) -> Self {
        match config.encoding {
            WindowEncoding::IsoQuery => Self::Query(window.encoded_query(config, zone)),
            WindowEncoding::EpochForm => Self::Form(window.form_fields(config)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn kathmandu() -> Tz {
        "Asia/Kathmandu".parse().unwrap()
    }

    #[test]
    fn test_window_spans_provider_local_midnights() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 6, 0, 0).unwrap();
        let window = TimeWindow::around(now, &kathmandu(), 1, 4).unwrap();

        let config = WindowConfig::default();
        assert_eq!(
            window.encoded_query(&config, ZoneSpec::Utc),
            "start=2024-03-08%2018%3A15%3A00&stop=2024-03-13%2018%3A14%3A59"
        );
    }

    #[test]
    fn test_window_rendered_in_source_zone() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 6, 0, 0).unwrap();
        let window = TimeWindow::around(now, &kathmandu(), 0, 1).unwrap();

        let config = WindowConfig::default();
        assert_eq!(
            window.encoded_query(&config, ZoneSpec::Source),
            "start=2024-03-10%2000%3A00%3A00&stop=2024-03-10%2023%3A59%3A59"
        );
    }

    #[test]
    fn test_epoch_form_payload() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 6, 0, 0).unwrap();
        let window = TimeWindow::around(now, &kathmandu(), 0, 1).unwrap();
        let config = WindowConfig {
            encoding: WindowEncoding::EpochForm,
            ..WindowConfig::default()
        };

        let payload = WindowPayload::build(&window, &config, ZoneSpec::Utc);
        let expected_start = Utc
            .with_ymd_and_hms(2024, 3, 9, 18, 15, 0)
            .unwrap()
            .timestamp_millis();
        assert_eq!(
            payload,
            WindowPayload::Form(vec![
                ("start".to_string(), expected_start.to_string()),
                (
                    "stop".to_string(),
                    (expected_start + 86_399_000).to_string()
                ),
            ])
        );
    }
}
