//! Canonical schedule model.
//!
//! These types are what the transformer produces and the XMLTV generator
//! consumes. Upstream JSON shapes live in [`upstream`].

use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;

use crate::config::defaults::UNCATEGORIZED;

pub mod upstream;

pub use upstream::{RawChannel, RawGenre, RawImage, RawProgramme, RawProgrammeList};

/// A channel as it will appear in the guide
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    /// Free-text category tags carried by the channel record
    pub category_tags: Vec<String>,
    /// Genre-id references resolved through a [`GenreMapping`]
    pub genre_ids: Vec<String>,
    /// Whether upstream supplied real programmes for this channel
    pub has_guide_data: bool,
}

/// A single guide entry, linked to its channel by id
#[derive(Debug, Clone, PartialEq)]
pub struct Programme {
    pub channel_id: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub start: DateTime<FixedOffset>,
    pub stop: DateTime<FixedOffset>,
    pub categories: Vec<String>,
    pub icon: Option<String>,
    pub catchup_id: String,
}

impl Programme {
    pub fn duration(&self) -> chrono::Duration {
        self.stop - self.start
    }
}

/// Channels and programmes in upstream order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    pub channels: Vec<Channel>,
    pub programmes: Vec<Programme>,
}

impl Schedule {
    pub fn channels_with_guide_data(&self) -> usize {
        self.channels.iter().filter(|c| c.has_guide_data).count()
    }

    pub fn channels_with_fallback(&self) -> usize {
        self.channels.len() - self.channels_with_guide_data()
    }
}

/// Read-only genre-id to display-name lookup for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenreMapping {
    names: HashMap<String, String>,
}

impl GenreMapping {
    /// Build a mapping from upstream genre records, skipping entries
    /// without an id or a name
    pub fn from_records(records: &[RawGenre]) -> Self {
        let names = records
            .iter()
            .filter_map(|genre| Some((genre.id()?, genre.name()?)))
            .collect();
        Self { names }
    }

    /// Display name for a genre id; unknown ids resolve to "Uncategorized"
    pub fn resolve(&self, id: &str) -> &str {
        self.names.get(id).map(String::as_str).unwrap_or(UNCATEGORIZED)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for GenreMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_mapping_resolves_unknown_ids() {
        let genres: GenreMapping = [("1", "News"), ("2", "Sports")].into_iter().collect();
        assert_eq!(genres.resolve("1"), "News");
        assert_eq!(genres.resolve("99"), "Uncategorized");
        assert_eq!(genres.len(), 2);
    }

    #[test]
    fn test_genre_mapping_from_records() {
        let records: Vec<RawGenre> = serde_json::from_value(serde_json::json!([
            {"id": 7, "name": "Movies"},
            {"id": "8", "title": "Kids"},
            {"name": "No id"},
            {"id": 9}
        ]))
        .unwrap();

        let genres = GenreMapping::from_records(&records);
        assert_eq!(genres.len(), 2);
        assert_eq!(genres.resolve("7"), "Movies");
        assert_eq!(genres.resolve("8"), "Kids");
    }
}
