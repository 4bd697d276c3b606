//! URL utilities for asset joining and log-safe rendering

use url::Url;

/// URL utilities for consistent URL handling
pub struct UrlUtils;

impl UrlUtils {
    /// Parse and validate a URL
    pub fn parse_and_validate(url: &str) -> Result<Url, url::ParseError> {
        Url::parse(url)
    }

    /// Join an asset path onto a base URL.
    ///
    /// A leading `/` on the path is dropped and the base gets a trailing `/`
    /// when missing, so exactly one separator ends up between them. Empty
    /// paths produce no URL.
    ///
    /// ```rust
    /// use gotv_epg::utils::url::UrlUtils;
    ///
    /// assert_eq!(
    ///     UrlUtils::join_asset("https://assets.example.com", "/logos/a.png").as_deref(),
    ///     Some("https://assets.example.com/logos/a.png")
    /// );
    /// assert_eq!(UrlUtils::join_asset("https://assets.example.com/", "  "), None);
    /// ```
    pub fn join_asset(base: &str, path: &str) -> Option<String> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        if path.starts_with("http://") || path.starts_with("https://") {
            return Some(path.to_string());
        }

        let path = path.strip_prefix('/').unwrap_or(path);
        if base.ends_with('/') {
            Some(format!("{base}{path}"))
        } else {
            Some(format!("{base}/{path}"))
        }
    }

    /// Obfuscate credentials carried in a URL's query string before logging
    pub fn obfuscate_credentials(url: &str) -> String {
        const SENSITIVE: &[&str] = &["token", "auth", "password", "key", "secret"];

        let Ok(mut parsed) = Url::parse(url) else {
            return url.to_string();
        };
        if parsed.query().is_none() {
            return url.to_string();
        }

        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| {
                let lower = k.to_lowercase();
                if SENSITIVE.iter().any(|s| lower.contains(s)) {
                    (k.into_owned(), "****".to_string())
                } else {
                    (k.into_owned(), v.into_owned())
                }
            })
            .collect();

        parsed.query_pairs_mut().clear().extend_pairs(pairs);
        parsed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_asset_avoids_double_separator() {
        assert_eq!(
            UrlUtils::join_asset("https://assets.example.com/", "/img/1.png").as_deref(),
            Some("https://assets.example.com/img/1.png")
        );
        assert_eq!(
            UrlUtils::join_asset("https://assets.example.com/", "img/1.png").as_deref(),
            Some("https://assets.example.com/img/1.png")
        );
        assert_eq!(UrlUtils::join_asset("https://assets.example.com/", ""), None);
    }

    #[test]
    fn test_join_asset_keeps_absolute_urls() {
        assert_eq!(
            UrlUtils::join_asset("https://assets.example.com/", "https://cdn.example.org/x.jpg")
                .as_deref(),
            Some("https://cdn.example.org/x.jpg")
        );
    }

    #[test]
    fn test_obfuscate_credentials() {
        let url = "https://api.example.com/epg?page=1&token=abc123";
        let obfuscated = UrlUtils::obfuscate_credentials(url);
        assert!(obfuscated.contains("page=1"));
        assert!(!obfuscated.contains("abc123"));
        assert_eq!(
            UrlUtils::obfuscate_credentials("https://api.example.com/epg"),
            "https://api.example.com/epg"
        );
    }
}
