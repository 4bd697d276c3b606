//! Raw upstream records to canonical schedule.
//!
//! The transformer is pure: the clock, the provider zone and the genre
//! mapping are all explicit inputs, so the same records always produce the
//! same schedule.

use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::config::TransformConfig;
use crate::config::defaults::{CATCHUP_CHANNEL_PREFIX_LEN, DEFAULT_TEXT};
use crate::models::{Channel, GenreMapping, Programme, RawChannel, RawProgramme, Schedule};
use crate::utils::url::UrlUtils;

pub mod categories;
pub mod day_filter;
pub mod fallback;
pub mod sanitize;
pub mod timestamps;

pub use categories::{CategoryResolver, map_genre_ids};
pub use day_filter::DayWindow;
pub use fallback::fallback_programmes;
pub use sanitize::{clean_text, sanitize, truncate_with_ellipsis};
pub use timestamps::resolve_instants;

/// Counters gathered while transforming one fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    /// Channel records without any usable id
    pub skipped_channels: usize,
    /// Channel records whose id was already seen
    pub duplicate_channels: usize,
    /// Programmes whose timing could not be resolved
    pub unparseable_programmes: usize,
    /// Programmes with a stop at or before their start
    pub invalid_span_programmes: usize,
    /// Programmes outside the configured day window
    pub filtered_programmes: usize,
}

impl TransformStats {
    pub fn dropped_programmes(&self) -> usize {
        self.unparseable_programmes + self.invalid_span_programmes + self.filtered_programmes
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransformOutcome {
    pub schedule: Schedule,
    pub stats: TransformStats,
}

/// Converts fetched channel records into a [`Schedule`]
pub struct Transformer<'a> {
    config: &'a TransformConfig,
    tz: Tz,
    now: DateTime<Utc>,
    genres: Option<&'a GenreMapping>,
}

/// Channel-level values that programmes fall back to
struct ChannelContext<'c> {
    channel: &'c Channel,
    catchup_prefix: String,
}

impl<'a> Transformer<'a> {
    pub fn new(config: &'a TransformConfig, tz: Tz, now: DateTime<Utc>) -> Self {
        Self {
            config,
            tz,
            now,
            genres: None,
        }
    }

    /// Resolve categories through a genre mapping instead of free-text tags
    pub fn with_genres(mut self, genres: Option<&'a GenreMapping>) -> Self {
        self.genres = genres;
        self
    }

    pub fn transform(&self, records: &[RawChannel]) -> TransformOutcome {
        let mut outcome = TransformOutcome::default();
        let mut seen_ids = HashSet::new();

        let day_window = if self.config.day_filter.enabled {
            let window = DayWindow::for_day_of(self.now, &self.tz, self.config.day_filter.predicate);
            if window.is_none() {
                warn!("Could not compute the local day window, day filter disabled for this run");
            }
            window
        } else {
            None
        };

        let stamp = self.now.with_timezone(&self.tz).format("%d%m%y").to_string();

        for raw in records {
            let Some(channel) = self.build_channel(raw) else {
                warn!("Skipping channel record without an id (title: {:?})", raw.title());
                outcome.stats.skipped_channels += 1;
                continue;
            };
            if !seen_ids.insert(channel.id.clone()) {
                warn!("Skipping duplicate channel id '{}'", channel.id);
                outcome.stats.duplicate_channels += 1;
                continue;
            }

            let context = ChannelContext {
                channel: &channel,
                catchup_prefix: format!(
                    "{stamp}{}",
                    channel.id.chars().take(CATCHUP_CHANNEL_PREFIX_LEN).collect::<String>()
                ),
            };

            let synthesized;
            let programmes: &[RawProgramme] = match raw.programmes() {
                Some(list) => list,
                None => {
                    debug!("Channel '{}' has no guide data, synthesizing fallback", channel.id);
                    synthesized =
                        fallback_programmes(raw, self.now, &self.tz, self.config.fallback_days);
                    &synthesized
                }
            };

            for (index, prog) in programmes.iter().enumerate() {
                let Some((start, stop)) = resolve_instants(prog, &self.tz) else {
                    debug!(
                        "Dropping programme {} of channel '{}': unparseable timing",
                        index, channel.id
                    );
                    outcome.stats.unparseable_programmes += 1;
                    continue;
                };
                if stop <= start {
                    debug!(
                        "Dropping programme {} of channel '{}': stop {} is not after start {}",
                        index, channel.id, stop, start
                    );
                    outcome.stats.invalid_span_programmes += 1;
                    continue;
                }
                if let Some(window) = &day_window
                    && !window.contains(&start, &stop)
                {
                    outcome.stats.filtered_programmes += 1;
                    continue;
                }

                outcome
                    .schedule
                    .programmes
                    .push(self.build_programme(&context, prog, index, start, stop));
            }

            outcome.schedule.channels.push(channel);
        }

        info!(
            "Transformed {} channels ({} with guide data) into {} programmes, {} dropped",
            outcome.schedule.channels.len(),
            outcome.schedule.channels_with_guide_data(),
            outcome.schedule.programmes.len(),
            outcome.stats.dropped_programmes()
        );

        outcome
    }

    fn build_channel(&self, raw: &RawChannel) -> Option<Channel> {
        let id = raw.resolved_id()?;
        let title = raw
            .title()
            .map(|t| self.text(&t))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TEXT.to_string());

        Some(Channel {
            id,
            title,
            description: raw.full_synopsis().and_then(|d| self.optional_text(&d)),
            icon: raw
                .first_image_path()
                .and_then(|path| UrlUtils::join_asset(&self.config.asset_base_url, path)),
            category_tags: raw.category_tags(),
            genre_ids: raw.genre_ids(),
            has_guide_data: raw.programmes().is_some(),
        })
    }

    fn build_programme(
        &self,
        context: &ChannelContext<'_>,
        prog: &RawProgramme,
        index: usize,
        start: DateTime<FixedOffset>,
        stop: DateTime<FixedOffset>,
    ) -> Programme {
        let channel = context.channel;

        let title = prog
            .title()
            .and_then(|t| self.optional_text(&t))
            .unwrap_or_else(|| channel.title.clone());

        let description = prog
            .full_synopsis()
            .and_then(|d| self.optional_text(&d))
            .or_else(|| channel.description.clone())
            .unwrap_or_else(|| self.config.description_default().to_string());

        let subtitle = prog
            .short_synopsis()
            .and_then(|s| self.optional_text(&s))
            .unwrap_or_else(|| truncate_with_ellipsis(&description, self.config.subtitle_max_chars));

        let categories = CategoryResolver::new(
            self.genres,
            self.config.uncategorized_policy,
            &self.config.default_category,
        )
        .resolve(
            &prog.genre_ids(),
            &channel.genre_ids,
            &prog.category_tags(),
            &channel.category_tags,
        );

        let icon = prog
            .first_image_path()
            .and_then(|path| UrlUtils::join_asset(&self.config.asset_base_url, path))
            .or_else(|| channel.icon.clone());

        let catchup_id = match prog.upstream_id() {
            Some(id) if self.config.catchup_prefers_upstream_id => id,
            _ => format!("{}{:03}", context.catchup_prefix, index),
        };

        Programme {
            channel_id: channel.id.clone(),
            title,
            subtitle,
            description,
            start,
            stop,
            categories,
            icon,
            catchup_id,
        }
    }

    /// Trimmed text, sanitized when configured; empty results become `None`
    fn optional_text(&self, input: &str) -> Option<String> {
        if self.config.sanitize {
            clean_text(input)
        } else {
            let trimmed = input.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
    }

    fn text(&self, input: &str) -> String {
        self.optional_text(input).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{UncategorizedPolicy, WindowPredicate};
    use chrono::{Duration, TimeZone};
    use serde_json::json;
    use tracing_test::traced_test;

    fn kathmandu() -> Tz {
        "Asia/Kathmandu".parse().unwrap()
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 6, 40, 0).unwrap()
    }

    fn channels(value: serde_json::Value) -> Vec<RawChannel> {
        serde_json::from_value(value).unwrap()
    }

    fn config() -> TransformConfig {
        TransformConfig {
            asset_base_url: "https://assets.example.com/".to_string(),
            ..TransformConfig::default()
        }
    }

    #[test]
    fn test_channel_without_programmes_gets_fallback_schedule() {
        let config = config();
        let records = channels(json!([{
            "id": 42,
            "title": "Mountain TV",
            "fullSynopsis": "Scenic views",
            "catogory": ["Nature"],
            "images": [{"path": "/logos/mtv.png"}],
            "epgPrograms": {"list": []}
        }]));

        let outcome = Transformer::new(&config, kathmandu(), fixed_now()).transform(&records);
        let schedule = outcome.schedule;

        assert_eq!(schedule.channels.len(), 1);
        assert!(!schedule.channels[0].has_guide_data);
        assert_eq!(schedule.programmes.len(), 120);

        let first = &schedule.programmes[0];
        assert_eq!(first.title, "Mountain TV");
        assert_eq!(first.description, "Scenic views");
        assert_eq!(first.categories, vec!["Nature".to_string()]);
        assert_eq!(
            first.icon.as_deref(),
            Some("https://assets.example.com/logos/mtv.png")
        );
        assert_eq!(first.start.format("%H:%M").to_string(), "12:00");

        for pair in schedule.programmes.windows(2) {
            assert_eq!(pair[0].stop, pair[1].start);
        }
        assert!(schedule
            .programmes
            .iter()
            .all(|p| p.duration() == Duration::hours(1)));
    }

    #[test]
    fn test_catchup_ids_use_run_date_channel_prefix_and_index() {
        let config = config();
        let records = channels(json!([{
            "epgId": "kantipur-hd",
            "title": "Kantipur",
            "epgPrograms": {"list": [
                {"title": "News", "start": "2024-03-10T01:00:00Z", "stop": "2024-03-10T02:00:00Z"},
                {"title": "Broken", "start": "yesterday", "stop": "today"},
                {"title": "Sport", "start": "2024-03-10T02:00:00Z", "stop": "2024-03-10T03:00:00Z"}
            ]}
        }]));

        let outcome = Transformer::new(&config, kathmandu(), fixed_now()).transform(&records);
        let ids: Vec<&str> = outcome
            .schedule
            .programmes
            .iter()
            .map(|p| p.catchup_id.as_str())
            .collect();

        assert_eq!(ids, vec!["100324kantip000", "100324kantip002"]);
        assert_eq!(outcome.stats.unparseable_programmes, 1);
    }

    #[test]
    fn test_upstream_catchup_id_when_preferred() {
        let config = TransformConfig {
            catchup_prefers_upstream_id: true,
            ..config()
        };
        let records = channels(json!([{
            "id": "7",
            "epgPrograms": {"list": [
                {"id": 99001, "start": "2024-03-10T01:00:00Z", "stop": "2024-03-10T02:00:00Z"},
                {"start": "2024-03-10T02:00:00Z", "stop": "2024-03-10T03:00:00Z"}
            ]}
        }]));

        let outcome = Transformer::new(&config, kathmandu(), fixed_now()).transform(&records);
        assert_eq!(outcome.schedule.programmes[0].catchup_id, "99001");
        assert_eq!(outcome.schedule.programmes[1].catchup_id, "1003247001");
    }

    #[test]
    fn test_subtitle_truncates_long_description() {
        let config = config();
        let long = "a".repeat(150);
        let records = channels(json!([{
            "id": "1",
            "epgPrograms": {"list": [
                {"fullSynopsis": long, "start": "2024-03-10T01:00:00Z", "stop": "2024-03-10T02:00:00Z"},
                {"fullSynopsis": "Short one", "start": "2024-03-10T02:00:00Z", "stop": "2024-03-10T03:00:00Z"},
                {"fullSynopsis": "Ignored", "shortSynopsis": "Explicit", "start": "2024-03-10T03:00:00Z", "stop": "2024-03-10T04:00:00Z"}
            ]}
        }]));

        let outcome = Transformer::new(&config, kathmandu(), fixed_now()).transform(&records);
        let subtitles: Vec<&str> = outcome
            .schedule
            .programmes
            .iter()
            .map(|p| p.subtitle.as_str())
            .collect();

        assert_eq!(subtitles[0], format!("{}...", "a".repeat(100)));
        assert_eq!(subtitles[1], "Short one");
        assert_eq!(subtitles[2], "Explicit");
    }

    #[test]
    fn test_sanitize_toggle_controls_text_and_description_default() {
        let records = channels(json!([{
            "id": "1",
            "title": "  News *24* ",
            "epgPrograms": {"list": [
                {"title": "Héadlines!!", "start": "2024-03-10T01:00:00Z", "stop": "2024-03-10T02:00:00Z"}
            ]}
        }]));

        let lenient = config();
        let outcome = Transformer::new(&lenient, kathmandu(), fixed_now()).transform(&records);
        assert_eq!(outcome.schedule.channels[0].title, "News *24*");
        assert_eq!(outcome.schedule.programmes[0].title, "Héadlines!!");
        assert_eq!(outcome.schedule.programmes[0].description, "");

        let strict = TransformConfig {
            sanitize: true,
            ..config()
        };
        let outcome = Transformer::new(&strict, kathmandu(), fixed_now()).transform(&records);
        assert_eq!(outcome.schedule.channels[0].title, "News 24");
        assert_eq!(outcome.schedule.programmes[0].title, "Hadlines");
        assert_eq!(outcome.schedule.programmes[0].description, "TBA");
        assert_eq!(outcome.schedule.programmes[0].subtitle, "TBA");
    }

    #[test]
    #[traced_test]
    fn test_channel_title_defaults_and_missing_id_skipped() {
        let config = config();
        let records = channels(json!([
            {"title": "No id here"},
            {"id": "", "epgId": null, "title": "Still no id"},
            {"id": "2"},
            {"id": "2", "title": "Duplicate"}
        ]));

        let outcome = Transformer::new(&config, kathmandu(), fixed_now()).transform(&records);
        assert_eq!(outcome.schedule.channels.len(), 1);
        assert_eq!(outcome.schedule.channels[0].title, "TBA");
        assert_eq!(outcome.stats.skipped_channels, 2);
        assert_eq!(outcome.stats.duplicate_channels, 1);
        assert!(logs_contain("Skipping duplicate channel id '2'"));
        assert!(outcome
            .schedule
            .programmes
            .iter()
            .all(|p| p.channel_id == "2"));
    }

    #[test]
    fn test_programme_with_stop_before_start_is_dropped() {
        let config = config();
        let records = channels(json!([{
            "id": "1",
            "epgPrograms": {"list": [
                {"start": "2024-03-10T02:00:00Z", "stop": "2024-03-10T01:00:00Z"},
                {"start": "2024-03-10T02:00:00Z", "stop": "2024-03-10T02:00:00Z"}
            ]}
        }]));

        let outcome = Transformer::new(&config, kathmandu(), fixed_now()).transform(&records);
        assert!(outcome.schedule.programmes.is_empty());
        assert_eq!(outcome.stats.invalid_span_programmes, 2);
        assert!(outcome.schedule.channels[0].has_guide_data);
    }

    #[test]
    fn test_genre_mapping_resolves_categories() {
        let config = TransformConfig {
            uncategorized_policy: UncategorizedPolicy::DropWhenOthers,
            ..config()
        };
        let genres: GenreMapping = [("1", "News"), ("2", "Sports")].into_iter().collect();
        let records = channels(json!([{
            "id": "1",
            "genres": [2],
            "epgPrograms": {"list": [
                {"genres": ["1", "1", "404"], "start": "2024-03-10T01:00:00Z", "stop": "2024-03-10T02:00:00Z"},
                {"start": "2024-03-10T02:00:00Z", "stop": "2024-03-10T03:00:00Z"},
                {"genres": ["404", "405"], "start": "2024-03-10T03:00:00Z", "stop": "2024-03-10T04:00:00Z"}
            ]}
        }]));

        let outcome = Transformer::new(&config, kathmandu(), fixed_now())
            .with_genres(Some(&genres))
            .transform(&records);
        let categories: Vec<&Vec<String>> = outcome
            .schedule
            .programmes
            .iter()
            .map(|p| &p.categories)
            .collect();

        assert_eq!(categories[0], &vec!["News".to_string()]);
        assert_eq!(categories[1], &vec!["Sports".to_string()]);
        assert!(categories[2].is_empty());
    }

    #[test]
    fn test_day_filter_keeps_only_todays_programmes() {
        let config = TransformConfig {
            day_filter: crate::config::DayFilterConfig {
                enabled: true,
                predicate: WindowPredicate::Start,
            },
            ..config()
        };
        // 2024-03-10 local day in Kathmandu is 2024-03-09T18:15Z .. 2024-03-10T18:15Z
        let records = channels(json!([{
            "id": "1",
            "epgPrograms": {"list": [
                {"start": "2024-03-09T17:00:00Z", "stop": "2024-03-09T18:00:00Z"},
                {"start": "2024-03-10T01:00:00Z", "stop": "2024-03-10T02:00:00Z"},
                {"start": "2024-03-10T19:00:00Z", "stop": "2024-03-10T20:00:00Z"}
            ]}
        }]));

        let outcome = Transformer::new(&config, kathmandu(), fixed_now()).transform(&records);
        assert_eq!(outcome.schedule.programmes.len(), 1);
        assert_eq!(outcome.stats.filtered_programmes, 2);
        assert_eq!(outcome.schedule.programmes[0].catchup_id, "1003241001");
    }
}
