use chrono_tz::Tz;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub mod defaults;
pub mod duration_serde;

use defaults::*;

use crate::errors::{AppError, AppResult};
use crate::utils::time::{ZoneSpec, parse_timezone};
use crate::utils::url::UrlUtils;

/// Complete run configuration.
///
/// Each section maps to one pipeline stage; the policy switches that the
/// upstream variants disagree on (window encoding, sanitization, day
/// filtering, output offset) are explicit fields rather than code paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub source: SourceConfig,
    pub transform: TransformConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// IANA zone the provider's local date/time fields are expressed in
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub genre_url: Option<String>,
    pub user_agent: String,
    pub auth_token: Option<String>,
    #[serde(with = "duration_serde::duration")]
    pub request_timeout: Duration,
    /// Top-level JSON key holding the channel list
    pub list_key: String,
    /// Top-level JSON key holding the genre list
    pub genre_list_key: String,
    /// Extra static headers sent with every request
    pub headers: BTreeMap<String, String>,
    pub window: WindowConfig,
    pub pagination: PaginationConfig,
}

/// How the requested time window is put on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowEncoding {
    /// GET with `YYYY-MM-DD HH:MM:SS` datetimes percent-encoded in the query
    IsoQuery,
    /// POST form body with millisecond epoch timestamps
    EpochForm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub encoding: WindowEncoding,
    pub start_param: String,
    pub stop_param: String,
    pub days_behind: u32,
    pub days_ahead: u32,
    /// Zone the ISO datetimes are rendered in ("utc", "source" or a zone name)
    pub request_zone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub enabled: bool,
    pub max_pages: u32,
    pub page_param: String,
}

/// What to do with "Uncategorized" once genre ids are mapped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UncategorizedPolicy {
    /// Suppress only when several ids all resolved to "Uncategorized"
    OnlyUncategorized,
    /// Additionally drop "Uncategorized" whenever a real category exists
    DropWhenOthers,
}

/// Which instant decides membership in the day window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowPredicate {
    Start,
    Stop,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DayFilterConfig {
    pub enabled: bool,
    pub predicate: WindowPredicate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub asset_base_url: String,
    pub sanitize: bool,
    pub fallback_days: u32,
    pub subtitle_max_chars: usize,
    pub default_category: String,
    pub uncategorized_policy: UncategorizedPolicy,
    pub catchup_prefers_upstream_id: bool,
    pub day_filter: DayFilterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub xml_path: PathBuf,
    pub generator_name: String,
    pub generator_url: String,
    /// "utc", "source", a zone name or a fixed "+HHMM" offset
    pub timezone: String,
    pub include_date: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_PROVIDER_TIMEZONE.to_string(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            genre_url: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            auth_token: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            list_key: DEFAULT_LIST_KEY.to_string(),
            genre_list_key: DEFAULT_LIST_KEY.to_string(),
            headers: BTreeMap::new(),
            window: WindowConfig::default(),
            pagination: PaginationConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            encoding: WindowEncoding::IsoQuery,
            start_param: DEFAULT_START_PARAM.to_string(),
            stop_param: DEFAULT_STOP_PARAM.to_string(),
            days_behind: DEFAULT_DAYS_BEHIND,
            days_ahead: DEFAULT_DAYS_AHEAD,
            request_zone: DEFAULT_REQUEST_ZONE.to_string(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_PAGINATION_ENABLED,
            max_pages: DEFAULT_MAX_PAGES,
            page_param: DEFAULT_PAGE_PARAM.to_string(),
        }
    }
}

impl Default for DayFilterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            predicate: WindowPredicate::Start,
        }
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            asset_base_url: DEFAULT_ASSET_BASE_URL.to_string(),
            sanitize: DEFAULT_SANITIZE,
            fallback_days: DEFAULT_FALLBACK_DAYS,
            subtitle_max_chars: DEFAULT_SUBTITLE_MAX_CHARS,
            default_category: DEFAULT_CATEGORY.to_string(),
            uncategorized_policy: UncategorizedPolicy::OnlyUncategorized,
            catchup_prefers_upstream_id: false,
            day_filter: DayFilterConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            xml_path: PathBuf::from(DEFAULT_XML_PATH),
            generator_name: DEFAULT_GENERATOR_NAME.to_string(),
            generator_url: DEFAULT_GENERATOR_URL.to_string(),
            timezone: DEFAULT_OUTPUT_TIMEZONE.to_string(),
            include_date: DEFAULT_INCLUDE_DATE,
        }
    }
}

impl ProviderConfig {
    pub fn tz(&self) -> AppResult<Tz> {
        parse_timezone(&self.timezone).map_err(AppError::configuration)
    }
}

impl WindowConfig {
    pub fn request_zone(&self) -> AppResult<ZoneSpec> {
        self.request_zone
            .parse()
            .map_err(|e: String| AppError::configuration(format!("source.window.request_zone: {e}")))
    }
}

impl TransformConfig {
    /// Default for a missing description; strict (sanitizing) runs use "TBA"
    pub fn description_default(&self) -> &'static str {
        if self.sanitize { DEFAULT_TEXT } else { "" }
    }
}

impl OutputConfig {
    pub fn zone(&self) -> AppResult<ZoneSpec> {
        self.timezone
            .parse()
            .map_err(|e: String| AppError::configuration(format!("output.timezone: {e}")))
    }

    /// Path of the gzip copy: the XML path with `.gz` appended
    pub fn gz_path(&self) -> PathBuf {
        let mut name = self.xml_path.clone().into_os_string();
        name.push(".gz");
        PathBuf::from(name)
    }
}

impl Config {
    /// Layer defaults, the TOML file (if present) and `GOTV_EPG_*` variables
    pub fn load_from_file<P: AsRef<Path>>(config_file: P) -> AppResult<Self> {
        let path = config_file.as_ref();
        if path.exists() {
            info!("Loading configuration from: {}", path.display());
        } else {
            debug!("Config file {} not found, using defaults", path.display());
        }

        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| AppError::configuration(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from TOML text only (no file, no environment)
    pub fn from_toml_str(contents: &str) -> AppResult<Self> {
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string(contents))
            .extract()
            .map_err(|e| AppError::configuration(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml_string(&self) -> AppResult<String> {
        toml::to_string_pretty(self).map_err(|e| AppError::configuration(e.to_string()))
    }

    pub fn validate(&self) -> AppResult<()> {
        self.provider.tz()?;
        self.source.window.request_zone()?;
        self.output.zone()?;

        UrlUtils::parse_and_validate(&self.source.url)
            .map_err(|e| AppError::configuration(format!("source.url '{}': {e}", self.source.url)))?;
        if let Some(genre_url) = &self.source.genre_url {
            UrlUtils::parse_and_validate(genre_url)
                .map_err(|e| AppError::configuration(format!("source.genre_url '{genre_url}': {e}")))?;
        }

        if self.source.pagination.enabled && self.source.pagination.max_pages == 0 {
            return Err(AppError::configuration(
                "source.pagination.max_pages must be at least 1",
            ));
        }
        if self.transform.fallback_days == 0 {
            return Err(AppError::configuration(
                "transform.fallback_days must be at least 1",
            ));
        }
        if self.transform.subtitle_max_chars == 0 {
            return Err(AppError::configuration(
                "transform.subtitle_max_chars must be at least 1",
            ));
        }
        if self.output.xml_path.as_os_str().is_empty() {
            return Err(AppError::configuration("output.xml_path must not be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.source.pagination.max_pages, 20);
        assert_eq!(config.transform.fallback_days, 5);
        assert_eq!(config.output.gz_path(), PathBuf::from("gotv.xml.gz"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [source]
            url = "https://api.example.com/epg"
            request_timeout = "10s"

            [source.window]
            encoding = "epoch-form"

            [transform]
            sanitize = true
            uncategorized_policy = "drop-when-others"

            [transform.day_filter]
            enabled = true
            predicate = "stop"
            "#,
        )
        .unwrap();

        assert_eq!(config.source.url, "https://api.example.com/epg");
        assert_eq!(config.source.request_timeout, Duration::from_secs(10));
        assert_eq!(config.source.window.encoding, WindowEncoding::EpochForm);
        assert_eq!(config.source.window.start_param, "start");
        assert!(config.transform.sanitize);
        assert_eq!(config.transform.description_default(), "TBA");
        assert_eq!(
            config.transform.uncategorized_policy,
            UncategorizedPolicy::DropWhenOthers
        );
        assert_eq!(config.transform.day_filter.predicate, WindowPredicate::Stop);
        assert_eq!(config.provider.timezone, "Asia/Kathmandu");
    }

    #[test]
    fn test_invalid_zone_is_rejected() {
        let err = Config::from_toml_str("[output]\ntimezone = \"Mars/Olympus\"").unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));

        let err = Config::from_toml_str("[provider]\ntimezone = \"+0545\"").unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[test]
    fn test_zero_fallback_days_rejected() {
        let err = Config::from_toml_str("[transform]\nfallback_days = 0").unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
        assert!(err.to_string().contains("fallback_days"));

        assert!(Config::from_toml_str("[transform]\nfallback_days = 1").is_ok());
    }

    #[test]
    fn test_round_trips_through_toml() {
        let rendered = Config::default().to_toml_string().unwrap();
        assert!(rendered.contains("request_timeout = \"30s\""));
        let reparsed = Config::from_toml_str(&rendered).unwrap();
        assert_eq!(reparsed.output.generator_name, DEFAULT_GENERATOR_NAME);
    }
}
