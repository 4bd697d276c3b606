//! Fetcher seam between the pipeline and the upstream API.

use async_trait::async_trait;

use super::window::TimeWindow;
use crate::errors::AppResult;
use crate::models::{GenreMapping, RawChannel};

/// Everything fetched for one run, handed by value to the transformer
#[derive(Debug, Clone, Default)]
pub struct FetchedGuide {
    pub channels: Vec<RawChannel>,
    pub genres: Option<GenreMapping>,
}

/// A provider of raw guide records.
///
/// Implementations issue their requests one after another; a failure of
/// any request fails the whole fetch.
#[async_trait]
pub trait GuideSource: Send + Sync {
    /// Human-readable origin for logs (credentials removed)
    fn describe(&self) -> String;

    /// Channel records, with their nested programmes, for the window
    async fn fetch_channels(&self, window: &TimeWindow) -> AppResult<Vec<RawChannel>>;

    /// Genre-id lookup, when the source has one
    async fn fetch_genres(&self) -> AppResult<Option<GenreMapping>>;

    async fn fetch(&self, window: &TimeWindow) -> AppResult<FetchedGuide> {
        let channels = self.fetch_channels(window).await?;
        let genres = self.fetch_genres().await?;
        Ok(FetchedGuide { channels, genres })
    }
}
