//! HTTP implementation of the guide source.
//!
//! Listings come from a single endpoint, optionally paginated, with the
//! request window carried either in the query string or a form body. A
//! secondary endpoint may supply the genre-id lookup.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::traits::GuideSource;
use super::window::{TimeWindow, WindowPayload};
use crate::config::SourceConfig;
use crate::errors::{AppError, AppResult, SourceError, SourceResult};
use crate::models::{GenreMapping, RawChannel, RawGenre};
use crate::utils::time::ZoneSpec;
use crate::utils::url::UrlUtils;

/// Guide source backed by the provider's JSON API
pub struct HttpGuideSource {
    client: Client,
    config: SourceConfig,
    request_zone: ZoneSpec,
}

impl HttpGuideSource {
    /// Build the client with the configured deadline and fixed header set
    pub fn new(config: &SourceConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| AppError::configuration(format!("source.headers '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| AppError::configuration(format!("source.headers '{name}': {e}")))?;
            headers.insert(name, value);
        }
        if let Some(token) = &config.auth_token {
            let mut value = HeaderValue::from_str(token)
                .map_err(|e| AppError::configuration(format!("source.auth_token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
            request_zone: config.window.request_zone()?,
        })
    }

    /// Listings request for one page (`None` when pagination is off)
    fn listings_request(&self, payload: &WindowPayload, page: Option<u32>) -> (String, RequestBuilder) {
        let page_param = &self.config.pagination.page_param;
        match payload {
            WindowPayload::Query(query) => {
                let mut query = query.clone();
                if let Some(page) = page {
                    query.push_str(&format!("&{page_param}={page}"));
                }
                let url = append_query(&self.config.url, &query);
                let request = self.client.get(&url);
                (url, request)
            }
            WindowPayload::Form(fields) => {
                let mut fields = fields.clone();
                if let Some(page) = page {
                    fields.push((page_param.clone(), page.to_string()));
                }
                let url = self.config.url.clone();
                let request = self.client.post(&url).form(&fields);
                (url, request)
            }
        }
    }

    /// Send a request and decode the body as JSON.
    ///
    /// Timeouts, non-2xx statuses and malformed bodies all abort the fetch.
    async fn get_json(&self, request: RequestBuilder, url: &str) -> AppResult<Value> {
        let safe_url = UrlUtils::obfuscate_credentials(url);
        debug!("Requesting {}", safe_url);

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(e, &safe_url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                message: format!(
                    "{} from {}",
                    status.canonical_reason().unwrap_or("Unexpected status"),
                    safe_url
                ),
            }
            .into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, &safe_url))?;
        debug!("Received {} bytes from {}", body.len(), safe_url);

        serde_json::from_slice(&body)
            .map_err(|e| SourceError::parse("json", format!("{safe_url}: {e}")).into())
    }
}

#[async_trait]
impl GuideSource for HttpGuideSource {
    fn describe(&self) -> String {
        UrlUtils::obfuscate_credentials(&self.config.url)
    }

    async fn fetch_channels(&self, window: &TimeWindow) -> AppResult<Vec<RawChannel>> {
        let payload = WindowPayload::build(window, &self.config.window, self.request_zone);
        let pagination = &self.config.pagination;
        let mut channels = Vec::new();

        if !pagination.enabled {
            let (url, request) = self.listings_request(&payload, None);
            let body = self.get_json(request, &url).await?;
            channels = extract_list(&body, &self.config.list_key, "channels")?;
        } else {
            for page in 1..=pagination.max_pages {
                let (url, request) = self.listings_request(&payload, Some(page));
                let body = self.get_json(request, &url).await?;
                let batch: Vec<RawChannel> = extract_list(&body, &self.config.list_key, "channels")?;

                if batch.is_empty() {
                    debug!("Page {} returned no channels, stopping", page);
                    break;
                }
                info!("Fetched page {}: {} channels", page, batch.len());
                channels.extend(batch);

                if page == pagination.max_pages {
                    warn!(
                        "Reached the page limit ({}), remaining pages are not fetched",
                        pagination.max_pages
                    );
                }
            }
        }

        if channels.is_empty() {
            return Err(SourceError::NoChannels { url: self.describe() }.into());
        }

        info!("Fetched {} channel records from {}", channels.len(), self.describe());
        Ok(channels)
    }

    async fn fetch_genres(&self) -> AppResult<Option<GenreMapping>> {
        let Some(genre_url) = &self.config.genre_url else {
            return Ok(None);
        };

        let body = self.get_json(self.client.get(genre_url), genre_url).await?;
        let records: Vec<RawGenre> = extract_list(&body, &self.config.genre_list_key, "genres")?;
        let mapping = GenreMapping::from_records(&records);
        if mapping.is_empty() {
            warn!("Genre endpoint returned no usable genres, ignoring it");
            return Ok(None);
        }

        info!("Loaded {} genre names", mapping.len());
        Ok(Some(mapping))
    }
}

fn transport_error(error: reqwest::Error, url: &str) -> AppError {
    if error.is_timeout() {
        SourceError::Timeout {
            url: url.to_string(),
        }
        .into()
    } else {
        AppError::Http(error.without_url())
    }
}

fn append_query(base: &str, query: &str) -> String {
    if base.contains('?') {
        format!("{base}&{query}")
    } else {
        format!("{base}?{query}")
    }
}

/// Records under `key` in a response body.
///
/// An absent key is an error; `null` or an empty array is an empty page.
/// Items that are not objects are skipped.
fn extract_list<T: DeserializeOwned>(
    body: &Value,
    key: &str,
    source_type: &str,
) -> SourceResult<Vec<T>> {
    let object = body.as_object().ok_or_else(|| {
        SourceError::parse(source_type, "response body is not a JSON object")
    })?;

    match object.get(key) {
        None => Err(SourceError::MissingKey {
            key: key.to_string(),
        }),
        Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items
            .iter()
            .filter_map(|item| match serde_json::from_value(item.clone()) {
                Ok(record) => Some(record),
                Err(e) => {
                    debug!("Skipping malformed {} record: {}", source_type, e);
                    None
                }
            })
            .collect()),
        Some(other) => Err(SourceError::parse(
            source_type,
            format!("'{key}' is not a list (found {other})"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_list_missing_key_is_error() {
        let err = extract_list::<RawChannel>(&json!({"data": []}), "list", "channels").unwrap_err();
        assert!(matches!(err, SourceError::MissingKey { key } if key == "list"));
    }

    #[test]
    fn test_extract_list_null_and_empty_are_empty_pages() {
        let from_null: Vec<RawChannel> =
            extract_list(&json!({"list": null}), "list", "channels").unwrap();
        let from_empty: Vec<RawChannel> =
            extract_list(&json!({"list": []}), "list", "channels").unwrap();
        assert!(from_null.is_empty());
        assert!(from_empty.is_empty());
    }

    #[test]
    fn test_extract_list_skips_non_object_items() {
        let channels: Vec<RawChannel> = extract_list(
            &json!({"list": [{"id": 1}, "garbage", 7, {"id": 2}]}),
            "list",
            "channels",
        )
        .unwrap();
        let ids: Vec<_> = channels.iter().filter_map(|c| c.resolved_id()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_extract_list_rejects_non_list() {
        let err = extract_list::<RawChannel>(&json!({"list": "nope"}), "list", "channels").unwrap_err();
        assert!(matches!(err, SourceError::ParseError { .. }));

        let err = extract_list::<RawChannel>(&json!([1, 2]), "list", "channels").unwrap_err();
        assert!(matches!(err, SourceError::ParseError { .. }));
    }

    #[test]
    fn test_append_query() {
        assert_eq!(
            append_query("https://api.example.com/epg", "start=a"),
            "https://api.example.com/epg?start=a"
        );
        assert_eq!(
            append_query("https://api.example.com/epg?lang=en", "start=a"),
            "https://api.example.com/epg?lang=en&start=a"
        );
    }

    #[test]
    fn test_invalid_header_rejected() {
        let mut config = SourceConfig::default();
        config
            .headers
            .insert("bad header".to_string(), "value".to_string());
        assert!(matches!(
            HttpGuideSource::new(&config),
            Err(AppError::Configuration { .. })
        ));
    }
}
