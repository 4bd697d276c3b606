/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location. The defaults
/// target the DishHome GO web guide.

// Provider defaults
pub const DEFAULT_PROVIDER_TIMEZONE: &str = "Asia/Kathmandu";

// Source defaults
pub const DEFAULT_SOURCE_URL: &str = "https://storefront.dishhomego.com.np/dhome/web-app/webepg";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:146.0) Gecko/20100101 Firefox/146.0";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LIST_KEY: &str = "list";
pub const DEFAULT_START_PARAM: &str = "start";
pub const DEFAULT_STOP_PARAM: &str = "stop";
pub const DEFAULT_PAGE_PARAM: &str = "page";
pub const DEFAULT_DAYS_BEHIND: u32 = 1;
pub const DEFAULT_DAYS_AHEAD: u32 = 4;
pub const DEFAULT_REQUEST_ZONE: &str = "utc";
pub const DEFAULT_PAGINATION_ENABLED: bool = true;
pub const DEFAULT_MAX_PAGES: u32 = 20;

// Transform defaults
pub const DEFAULT_ASSET_BASE_URL: &str = "https://assets.dishhomego.com.np/";
pub const DEFAULT_SANITIZE: bool = false;
pub const DEFAULT_FALLBACK_DAYS: u32 = 5;
pub const DEFAULT_SUBTITLE_MAX_CHARS: usize = 100;
pub const DEFAULT_CATEGORY: &str = "General";
pub const UNCATEGORIZED: &str = "Uncategorized";
pub const DEFAULT_TEXT: &str = "TBA";
pub const ELLIPSIS: &str = "...";
pub const CATCHUP_CHANNEL_PREFIX_LEN: usize = 6;

// Output defaults
pub const DEFAULT_XML_PATH: &str = "gotv.xml";
pub const DEFAULT_GENERATOR_NAME: &str = "DishHomeGo EPG";
pub const DEFAULT_GENERATOR_URL: &str = "https://storefront.dishhomego.com.np";
pub const DEFAULT_OUTPUT_TIMEZONE: &str = "utc";
pub const DEFAULT_INCLUDE_DATE: bool = true;

// CLI defaults
pub const DEFAULT_CONFIG_FILE: &str = "gotv-epg.toml";
pub const ENV_PREFIX: &str = "GOTV_EPG_";
