//! Optional restriction of programmes to a single provider-local day.

use chrono::{DateTime, Days, FixedOffset, Utc};
use chrono_tz::Tz;

use crate::config::WindowPredicate;
use crate::utils::time::local_midnight;

/// Half-open window from local midnight to the next local midnight
#[derive(Debug, Clone, Copy)]
pub struct DayWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    predicate: WindowPredicate,
}

impl DayWindow {
    /// The provider-local day containing `now`
    pub fn for_day_of(now: DateTime<Utc>, tz: &Tz, predicate: WindowPredicate) -> Option<Self> {
        let today = now.with_timezone(tz).date_naive();
        let tomorrow = today.checked_add_days(Days::new(1))?;
        Some(Self {
            start: local_midnight(tz, today)?.with_timezone(&Utc),
            end: local_midnight(tz, tomorrow)?.with_timezone(&Utc),
            predicate,
        })
    }

    /// `Start` keeps programmes beginning inside the day; `Stop` keeps those
    /// ending inside it (a stop exactly at the closing midnight counts)
    pub fn contains(&self, start: &DateTime<FixedOffset>, stop: &DateTime<FixedOffset>) -> bool {
        match self.predicate {
            WindowPredicate::Start => *start >= self.start && *start < self.end,
            WindowPredicate::Stop => *stop > self.start && *stop <= self.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(text: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(text).unwrap()
    }

    #[test]
    fn test_start_and_stop_predicates() {
        let tz: Tz = "Asia/Kathmandu".parse().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 6, 0, 0).unwrap();

        let by_start = DayWindow::for_day_of(now, &tz, WindowPredicate::Start).unwrap();
        let by_stop = DayWindow::for_day_of(now, &tz, WindowPredicate::Stop).unwrap();

        // Straddles the opening midnight
        let early = (at("2024-03-09T23:30:00+05:45"), at("2024-03-10T00:30:00+05:45"));
        assert!(!by_start.contains(&early.0, &early.1));
        assert!(by_stop.contains(&early.0, &early.1));

        // Straddles the closing midnight
        let late = (at("2024-03-10T23:30:00+05:45"), at("2024-03-11T00:30:00+05:45"));
        assert!(by_start.contains(&late.0, &late.1));
        assert!(!by_stop.contains(&late.0, &late.1));

        // Ends exactly at the closing midnight
        let last = (at("2024-03-10T23:00:00+05:45"), at("2024-03-11T00:00:00+05:45"));
        assert!(by_start.contains(&last.0, &last.1));
        assert!(by_stop.contains(&last.0, &last.1));
    }
}
