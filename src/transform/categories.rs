//! Category resolution for programmes.

use crate::config::UncategorizedPolicy;
use crate::config::defaults::UNCATEGORIZED;
use crate::models::GenreMapping;

/// Resolves the category list for one programme from genre ids or tags
#[derive(Debug, Clone, Copy)]
pub struct CategoryResolver<'a> {
    genres: Option<&'a GenreMapping>,
    policy: UncategorizedPolicy,
    default_category: &'a str,
}

impl<'a> CategoryResolver<'a> {
    pub fn new(
        genres: Option<&'a GenreMapping>,
        policy: UncategorizedPolicy,
        default_category: &'a str,
    ) -> Self {
        Self {
            genres,
            policy,
            default_category,
        }
    }

    /// Programme-level references win over channel-level ones. Genre ids are
    /// only consulted when a mapping was fetched; otherwise the first free
    /// text tag is used, then the configured default.
    pub fn resolve(
        &self,
        programme_genres: &[String],
        channel_genres: &[String],
        programme_tags: &[String],
        channel_tags: &[String],
    ) -> Vec<String> {
        if let Some(genres) = self.genres {
            let ids = if programme_genres.is_empty() {
                channel_genres
            } else {
                programme_genres
            };
            if !ids.is_empty() {
                return map_genre_ids(ids, genres, self.policy);
            }
        }

        let tag = programme_tags
            .first()
            .or_else(|| channel_tags.first())
            .map(String::as_str)
            .unwrap_or(self.default_category);
        vec![tag.to_string()]
    }
}

/// Map ids to names, deduplicate in first-seen order and apply the
/// "Uncategorized" policy.
///
/// Several ids that all collapse to "Uncategorized" produce no category;
/// a single id always produces exactly one, even when unmapped.
pub fn map_genre_ids(
    ids: &[String],
    genres: &GenreMapping,
    policy: UncategorizedPolicy,
) -> Vec<String> {
    let mut resolved: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        let name = genres.resolve(id);
        if !resolved.iter().any(|existing| existing == name) {
            resolved.push(name.to_string());
        }
    }

    if ids.len() > 1 && resolved.iter().all(|name| name == UNCATEGORIZED) {
        return Vec::new();
    }

    if policy == UncategorizedPolicy::DropWhenOthers && resolved.len() > 1 {
        resolved.retain(|name| name != UNCATEGORIZED);
    }

    resolved
}
