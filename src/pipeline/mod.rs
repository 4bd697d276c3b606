//! Fetch, transform and write, strictly in that order.
//!
//! Every stage runs to completion before the next one starts. A failure in
//! any stage aborts the run before a file is written.

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Instant;
use tracing::info;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::output::{PublishedFiles, XmltvRenderer, publish};
use crate::sources::{GuideSource, TimeWindow};
use crate::transform::{TransformStats, Transformer};
use crate::utils::{compression_ratio, format_duration, format_memory};

/// Outcome of one run, printed for the operator
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub channels: usize,
    pub with_guide_data: usize,
    pub with_fallback: usize,
    pub programmes: usize,
    pub stats: TransformStats,
    /// Size of the rendered document, also known for dry runs
    pub document_bytes: u64,
    /// `None` for dry runs
    pub published: Option<PublishedFiles>,
    pub elapsed_ms: u64,
}

impl RunSummary {
    /// Space saved by the gzip copy, in percent
    pub fn compression_percent(&self) -> Option<f64> {
        self.published
            .as_ref()
            .map(|files| compression_ratio(files.xml_bytes, files.gz_bytes))
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Channels:            {}", self.channels)?;
        writeln!(f, "  with EPG data:     {}", self.with_guide_data)?;
        writeln!(f, "  with fallback:     {}", self.with_fallback)?;
        writeln!(f, "Programmes:          {}", self.programmes)?;
        writeln!(f, "  dropped:           {}", self.stats.dropped_programmes())?;
        match &self.published {
            Some(files) => {
                writeln!(
                    f,
                    "XML file:            {} ({:.1} KB)",
                    files.xml_path.display(),
                    files.xml_bytes as f64 / 1024.0
                )?;
                writeln!(
                    f,
                    "Compressed file:     {} ({:.1} KB)",
                    files.gz_path.display(),
                    files.gz_bytes as f64 / 1024.0
                )?;
                writeln!(
                    f,
                    "Compression:         {:.1}%",
                    compression_ratio(files.xml_bytes, files.gz_bytes)
                )?;
            }
            None => {
                writeln!(
                    f,
                    "Dry run:             {} rendered, nothing written",
                    format_memory(self.document_bytes as f64)
                )?;
            }
        }
        write!(f, "Elapsed:             {}", format_duration(self.elapsed_ms))
    }
}

/// Run the whole pipeline once against `source`, using `now` as the clock
pub async fn run(
    config: &Config,
    source: &dyn GuideSource,
    now: DateTime<Utc>,
    dry_run: bool,
) -> AppResult<RunSummary> {
    let started = Instant::now();
    let tz = config.provider.tz()?;
    let window_config = &config.source.window;

    let window = TimeWindow::around(now, &tz, window_config.days_behind, window_config.days_ahead)
        .ok_or_else(|| AppError::configuration("request window is out of range"))?;
    info!(
        "Fetching guide from {} for {} .. {}",
        source.describe(),
        window.start,
        window.end
    );

    let fetched = source.fetch(&window).await?;

    let outcome = Transformer::new(&config.transform, tz, now)
        .with_genres(fetched.genres.as_ref())
        .transform(&fetched.channels);
    let schedule = outcome.schedule;

    let document = XmltvRenderer::new(&config.output)?.render(&schedule)?;
    info!("Rendered XMLTV document: {}", format_memory(document.len() as f64));

    let published = if dry_run {
        info!("Dry run, skipping file output");
        None
    } else {
        Some(publish(
            &document,
            &config.output.xml_path,
            &config.output.gz_path(),
        )?)
    };

    let summary = RunSummary {
        channels: schedule.channels.len(),
        with_guide_data: schedule.channels_with_guide_data(),
        with_fallback: schedule.channels_with_fallback(),
        programmes: schedule.programmes.len(),
        stats: outcome.stats,
        document_bytes: document.len() as u64,
        published,
        elapsed_ms: started.elapsed().as_millis() as u64,
    };

    info!(
        "Run complete: channels={} with_epg={} with_fallback={} programmes={} dropped={} duration={}",
        summary.channels,
        summary.with_guide_data,
        summary.with_fallback,
        summary.programmes,
        summary.stats.dropped_programmes(),
        format_duration(summary.elapsed_ms)
    );

    Ok(summary)
}
