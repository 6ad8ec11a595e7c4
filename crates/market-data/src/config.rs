use std::time::Duration;

pub const MARKETSTACK_KEY_VAR: &str = "marketstack_api_key";
pub const EODHD_KEY_VAR: &str = "key_EODHD";
pub const REQUEST_TIMEOUT_VAR: &str = "MKDL_REQUEST_TIMEOUT_MS";
pub const MARKETSTACK_BASE_URL_VAR: &str = "MKDL_MARKETSTACK_BASE_URL";
pub const EODHD_BASE_URL_VAR: &str = "MKDL_EODHD_BASE_URL";

pub const DEFAULT_MARKETSTACK_BASE_URL: &str = "http://api.marketstack.com";
pub const DEFAULT_EODHD_BASE_URL: &str = "https://eodhd.com";

/// Default HTTP request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client configuration: provider credentials and HTTP settings.
///
/// Pass one to [`MarketDataClient::new`](crate::MarketDataClient::new), or
/// build it from the process environment with [`MarketDataConfig::from_env`].
#[derive(Clone)]
pub struct MarketDataConfig {
    pub marketstack_api_key: Option<String>,
    pub eodhd_api_key: Option<String>,
    pub request_timeout: Duration,
    pub marketstack_base_url: String,
    pub eodhd_base_url: String,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            marketstack_api_key: None,
            eodhd_api_key: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            marketstack_base_url: DEFAULT_MARKETSTACK_BASE_URL.to_string(),
            eodhd_base_url: DEFAULT_EODHD_BASE_URL.to_string(),
        }
    }
}

// Keys stay out of Debug output.
impl std::fmt::Debug for MarketDataConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "***");
        f.debug_struct("MarketDataConfig")
            .field("marketstack_api_key", &redact(&self.marketstack_api_key))
            .field("eodhd_api_key", &redact(&self.eodhd_api_key))
            .field("request_timeout", &self.request_timeout)
            .field("marketstack_base_url", &self.marketstack_base_url)
            .field("eodhd_base_url", &self.eodhd_base_url)
            .finish()
    }
}

impl MarketDataConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// Blank values count as unset. An unparsable timeout falls back to
    /// the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timeout_ms: u64 = read(REQUEST_TIMEOUT_VAR)
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT.as_millis() as u64);

        Self {
            marketstack_api_key: read(MARKETSTACK_KEY_VAR),
            eodhd_api_key: read(EODHD_KEY_VAR),
            request_timeout: Duration::from_millis(timeout_ms),
            marketstack_base_url: read(MARKETSTACK_BASE_URL_VAR)
                .unwrap_or_else(|| DEFAULT_MARKETSTACK_BASE_URL.to_string()),
            eodhd_base_url: read(EODHD_BASE_URL_VAR)
                .unwrap_or_else(|| DEFAULT_EODHD_BASE_URL.to_string()),
        }
    }

    pub fn with_marketstack_api_key(mut self, key: impl Into<String>) -> Self {
        self.marketstack_api_key = Some(key.into());
        self
    }

    pub fn with_eodhd_api_key(mut self, key: impl Into<String>) -> Self {
        self.eodhd_api_key = Some(key.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_marketstack_base_url(mut self, url: impl Into<String>) -> Self {
        self.marketstack_base_url = url.into();
        self
    }

    pub fn with_eodhd_base_url(mut self, url: impl Into<String>) -> Self {
        self.eodhd_base_url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = MarketDataConfig::from_lookup(lookup(&[]));
        assert!(config.marketstack_api_key.is_none());
        assert!(config.eodhd_api_key.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.marketstack_base_url, "http://api.marketstack.com");
        assert_eq!(config.eodhd_base_url, "https://eodhd.com");
    }

    #[test]
    fn test_reads_credentials() {
        let config = MarketDataConfig::from_lookup(lookup(&[
            ("marketstack_api_key", "ms-key"),
            ("key_EODHD", "eod-key"),
            ("MKDL_REQUEST_TIMEOUT_MS", "5000"),
        ]));
        assert_eq!(config.marketstack_api_key.as_deref(), Some("ms-key"));
        assert_eq!(config.eodhd_api_key.as_deref(), Some("eod-key"));
        assert_eq!(config.request_timeout, Duration::from_millis(5000));
    }

    #[test]
    fn test_blank_and_invalid_values() {
        let config = MarketDataConfig::from_lookup(lookup(&[
            ("marketstack_api_key", "  "),
            ("MKDL_REQUEST_TIMEOUT_MS", "soon"),
        ]));
        assert!(config.marketstack_api_key.is_none());
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = MarketDataConfig::default().with_eodhd_api_key("secret-token");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("***"));
    }
}
