//! Client configuration

use crate::error::{Error, Result};
use std::time::Duration;
use url::Url;

/// Default backend location (the summarization service's development address)
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Connection and resource configuration for the PDF summary client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL all endpoint paths are resolved against
    pub base_url: Url,
    /// Per-request timeout (default: 60s)
    pub request_timeout: Duration,
    /// Maximum download size in bytes for documents (default: 100MB)
    pub max_download_bytes: u64,
    /// Maximum number of cached documents (default: 32)
    pub cache_max_entries: usize,
    /// Maximum total bytes in the document cache (default: 256MB)
    pub cache_max_bytes: usize,
    /// Open documents in the system browser (default: true)
    pub open_browser: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).unwrap(),
            request_timeout: Duration::from_secs(60),
            max_download_bytes: 100 * 1024 * 1024, // 100MB
            cache_max_entries: 32,
            cache_max_bytes: 256 * 1024 * 1024, // 256MB
            open_browser: true,
        }
    }
}

impl ClientConfig {
    /// Create a configuration pointing at the given base URL, other values default
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            ..Self::default()
        })
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    /// Unset or blank keys keep their default value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("SUMMARY_API_URL") {
            config.base_url = parse_base_url(&url).map_err(|e| Error::Config {
                key: "SUMMARY_API_URL".to_string(),
                reason: e.to_string(),
            })?;
        }
        if let Some(secs) = get("SUMMARY_API_TIMEOUT_SECS") {
            config.request_timeout =
                Duration::from_secs(parse_number("SUMMARY_API_TIMEOUT_SECS", &secs)?);
        }
        if let Some(bytes) = get("SUMMARY_MAX_DOWNLOAD_BYTES") {
            config.max_download_bytes = parse_number("SUMMARY_MAX_DOWNLOAD_BYTES", &bytes)?;
        }
        if let Some(entries) = get("SUMMARY_CACHE_MAX_ENTRIES") {
            config.cache_max_entries = parse_number("SUMMARY_CACHE_MAX_ENTRIES", &entries)?;
        }
        if let Some(bytes) = get("SUMMARY_CACHE_MAX_BYTES") {
            config.cache_max_bytes = parse_number("SUMMARY_CACHE_MAX_BYTES", &bytes)?;
        }
        if let Some(flag) = get("SUMMARY_OPEN_BROWSER") {
            config.open_browser = parse_flag("SUMMARY_OPEN_BROWSER", &flag)?;
        }

        Ok(config)
    }
}

/// Parse a base URL, requiring an http(s) scheme
fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" if !url.cannot_be_a_base() => Ok(url),
        _ => Err(Error::InvalidBaseUrl {
            url: raw.to_string(),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| Error::Config {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config {
            key: key.to_string(),
            reason: format!("expected a boolean, got {:?}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:5000/");
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert!(config.open_browser);
    }

    #[test]
    fn test_empty_environment_keeps_defaults() {
        let config = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.base_url, ClientConfig::default().base_url);
        assert_eq!(config.max_download_bytes, 100 * 1024 * 1024);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("SUMMARY_API_URL", "https://summaries.example.com/api"),
            ("SUMMARY_API_TIMEOUT_SECS", "5"),
            ("SUMMARY_CACHE_MAX_ENTRIES", "4"),
            ("SUMMARY_OPEN_BROWSER", "off"),
        ]))
        .unwrap();

        assert_eq!(config.base_url.as_str(), "https://summaries.example.com/api");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.cache_max_entries, 4);
        assert!(!config.open_browser);
    }

    #[test]
    fn test_blank_value_is_ignored() {
        let config = ClientConfig::from_lookup(lookup_from(&[("SUMMARY_API_URL", "  ")])).unwrap();
        assert_eq!(config.base_url, ClientConfig::default().base_url);
    }

    #[test]
    fn test_invalid_number_names_key() {
        let result =
            ClientConfig::from_lookup(lookup_from(&[("SUMMARY_API_TIMEOUT_SECS", "soon")]));
        match result {
            Err(Error::Config { key, .. }) => assert_eq!(key, "SUMMARY_API_TIMEOUT_SECS"),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_flag() {
        let result = ClientConfig::from_lookup(lookup_from(&[("SUMMARY_OPEN_BROWSER", "maybe")]));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_non_http_base_url_rejected() {
        assert!(matches!(
            ClientConfig::with_base_url("ftp://127.0.0.1/"),
            Err(Error::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            ClientConfig::with_base_url("mailto:someone@example.com"),
            Err(Error::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            ClientConfig::with_base_url("/relative/path"),
            Err(Error::Url(_))
        ));
    }
}
