//! Marketstack provider implementation.
//!
//! Fetches end-of-day records from the Marketstack v2 API.
//!
//! # API Endpoint
//!
//! `http://api.marketstack.com/v2/eod?symbols={symbol}&access_key={key}&sort={ASC|DESC}&limit=1000`
//! with `date_from`, `date_to` and `timeframe` appended only when set.
//!
//! # Response Format
//!
//! `{"pagination": {...}, "data": [{"date": "...", "open": ..., ...}]}` on
//! success, `{"error": {"code": "...", "message": "..."}}` on failure.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::MarketDataError;
use crate::models::{PriceQuery, PriceTable};
use crate::provider::http;
use crate::provider::HistoryProvider;

const PROVIDER_ID: &str = "MARKETSTACK";
const EOD_PATH: &str = "/v2/eod";

/// Records per request. Only the first page is fetched.
const PAGE_LIMIT: &str = "1000";

/// Field promoted to the table index
const INDEX_FIELD: &str = "date";

/// Response from the eod endpoint.
#[derive(Debug, Deserialize)]
struct EodResponse {
    #[serde(default)]
    data: Option<Vec<Value>>,
}

/// Error payload returned with non-200 statuses.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Marketstack provider for end-of-day and intraday records.
///
/// # Example
///
/// ```ignore
/// let provider = MarketstackProvider::new(client, Some(api_key), "http://api.marketstack.com");
/// let table = provider.get_history(&PriceQuery::new("AAPL")).await?;
/// ```
pub struct MarketstackProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl MarketstackProvider {
    pub fn new(client: Client, api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.into(),
        }
    }

    fn api_key(&self) -> Result<&str, MarketDataError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| MarketDataError::MissingApiKey {
                provider: PROVIDER_ID.to_string(),
            })
    }

    /// Build the request URL. Optional parameters are appended only when set,
    /// after the fixed ones.
    pub fn build_url(
        base_url: &str,
        api_key: &str,
        symbol: &str,
        query: &PriceQuery,
    ) -> Result<Url, MarketDataError> {
        let date_from = query.date_from_str();
        let date_to = query.date_to_str();

        let mut params: Vec<(&str, &str)> = vec![
            ("symbols", symbol),
            ("access_key", api_key),
            ("sort", query.sort.as_str()),
            ("limit", PAGE_LIMIT),
        ];
        if let Some(date_from) = date_from.as_deref() {
            params.push(("date_from", date_from));
        }
        if let Some(date_to) = date_to.as_deref() {
            params.push(("date_to", date_to));
        }
        if let Some(timeframe) = query.timeframe_str() {
            params.push(("timeframe", timeframe));
        }

        let endpoint = format!("{}{}", base_url.trim_end_matches('/'), EOD_PATH);
        Url::parse_with_params(&endpoint, &params).map_err(|e| MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to build URL: {}", e),
        })
    }

    /// Turn a status and body into a table.
    fn parse_response(status: StatusCode, body: &str) -> Result<PriceTable, MarketDataError> {
        if status != StatusCode::OK {
            let detail = serde_json::from_str::<ErrorResponse>(body)
                .ok()
                .and_then(|e| match (e.error.code, e.error.message) {
                    (Some(code), Some(message)) => Some(format!("{} ({})", message, code)),
                    (None, Some(message)) => Some(message),
                    (Some(code), None) => Some(code),
                    (None, None) => None,
                });
            http::check_status(PROVIDER_ID, status, detail)?;
        }

        let response: EodResponse =
            serde_json::from_str(body).map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse response: {}", e),
            })?;

        let records = response.data.unwrap_or_default();
        if records.is_empty() {
            return Err(MarketDataError::NoDataForRange);
        }

        PriceTable::from_json_records(&records, INDEX_FIELD)
    }
}

#[async_trait]
impl HistoryProvider for MarketstackProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_history(&self, query: &PriceQuery) -> Result<PriceTable, MarketDataError> {
        let symbol = query.require_symbol()?;
        let api_key = self.api_key()?;

        let url = Self::build_url(&self.base_url, api_key, symbol, query)?;
        let (status, body) = http::get(&self.client, url, PROVIDER_ID, api_key).await?;

        match Self::parse_response(status, &body) {
            Ok(table) => {
                debug!("Marketstack: fetched {} records for {}", table.len(), symbol);
                Ok(table)
            }
            Err(MarketDataError::NoDataForRange) => {
                warn!(
                    "No Marketstack records for '{}' between {} and {}",
                    symbol,
                    query.date_from_str().as_deref().unwrap_or("start"),
                    query.date_to_str().as_deref().unwrap_or("now")
                );
                Err(MarketDataError::NoDataForRange)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SortOrder;
    use chrono::NaiveDate;

    fn query_params(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_provider_id() {
        let provider = MarketstackProvider::new(Client::new(), None, "http://localhost");
        assert_eq!(provider.id(), "MARKETSTACK");
    }

    #[test]
    fn test_build_url_minimal() {
        let url = MarketstackProvider::build_url(
            "http://api.marketstack.com",
            "key",
            "AAPL",
            &PriceQuery::new("AAPL"),
        )
        .unwrap();

        assert_eq!(
            url.as_str(),
            "http://api.marketstack.com/v2/eod?symbols=AAPL&access_key=key&sort=ASC&limit=1000"
        );
        let keys: Vec<String> = query_params(&url).into_iter().map(|(k, _)| k).collect();
        assert!(!keys.contains(&"date_from".to_string()));
        assert!(!keys.contains(&"date_to".to_string()));
        assert!(!keys.contains(&"timeframe".to_string()));
    }

    #[test]
    fn test_build_url_with_all_parameters() {
        let query = PriceQuery::new("AAPL")
            .with_date_from(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap())
            .with_date_to(NaiveDate::from_ymd_opt(2023, 1, 10).unwrap())
            .with_timeframe("1day")
            .with_sort(SortOrder::Desc);
        let url =
            MarketstackProvider::build_url("http://api.marketstack.com/", "key", "AAPL", &query)
                .unwrap();

        assert_eq!(
            url.as_str(),
            "http://api.marketstack.com/v2/eod?symbols=AAPL&access_key=key&sort=DESC&limit=1000\
             &date_from=2023-01-01&date_to=2023-01-10&timeframe=1day"
        );
    }

    #[test]
    fn test_build_url_only_date_to() {
        let query =
            PriceQuery::new("MSFT").with_date_to(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
        let url = MarketstackProvider::build_url("http://h", "k", "MSFT", &query).unwrap();
        let params = query_params(&url);

        assert!(params.contains(&("date_to".to_string(), "2024-06-30".to_string())));
        assert!(!params.iter().any(|(k, _)| k == "date_from"));
    }

    #[test]
    fn test_parse_response_success() {
        let body = r#"{
            "pagination": {"limit": 1000, "offset": 0, "count": 2, "total": 2},
            "data": [
                {"open": 130.28, "high": 130.9, "low": 124.17, "close": 125.07, "volume": 112117500.0,
                 "symbol": "AAPL", "exchange": "XNAS", "date": "2023-01-03T00:00:00+0000"},
                {"open": 126.89, "high": 128.66, "low": 125.08, "close": 126.36, "volume": 89113600.0,
                 "symbol": "AAPL", "exchange": "XNAS", "date": "2023-01-04T00:00:00+0000"}
            ]
        }"#;

        let table = MarketstackProvider::parse_response(StatusCode::OK, body).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.index_name(), "date");
        assert_eq!(
            table.columns(),
            &["open", "high", "low", "close", "volume", "symbol", "exchange"]
        );
        assert!(table.is_sorted(SortOrder::Asc));
    }

    #[test]
    fn test_parse_response_empty_data() {
        let body = r#"{"pagination": {"count": 0}, "data": []}"#;
        let result = MarketstackProvider::parse_response(StatusCode::OK, body);
        assert!(matches!(result, Err(MarketDataError::NoDataForRange)));
    }

    #[test]
    fn test_parse_response_missing_data() {
        let result = MarketstackProvider::parse_response(StatusCode::OK, "{}");
        assert!(matches!(result, Err(MarketDataError::NoDataForRange)));
    }

    #[test]
    fn test_parse_response_error_status() {
        let body = r#"{"error": {"code": "invalid_access_key", "message": "You have not supplied a valid API Access Key."}}"#;
        let result = MarketstackProvider::parse_response(StatusCode::UNAUTHORIZED, body);

        match result {
            Err(MarketDataError::ProviderError { message, .. }) => {
                assert!(message.contains("401"));
                assert!(message.contains("invalid_access_key"));
            }
            other => panic!("Expected ProviderError, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_response_rate_limited() {
        let result = MarketstackProvider::parse_response(StatusCode::TOO_MANY_REQUESTS, "");
        assert!(matches!(result, Err(MarketDataError::RateLimited { .. })));
    }

    #[test]
    fn test_parse_response_garbage_body() {
        let result = MarketstackProvider::parse_response(StatusCode::OK, "<html></html>");
        assert!(matches!(result, Err(MarketDataError::ProviderError { .. })));
    }

    #[test]
    fn test_parse_response_accepted_is_not_success() {
        let body = r#"{"data": [{"date": "2023-01-03T00:00:00+0000", "close": 125.07}]}"#;
        let result = MarketstackProvider::parse_response(StatusCode::ACCEPTED, body);
        match result {
            Err(MarketDataError::ProviderError { message, .. }) => {
                assert!(message.starts_with("HTTP 202 Accepted"));
            }
            other => panic!("Expected ProviderError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_symbol_fails_before_request() {
        let provider =
            MarketstackProvider::new(Client::new(), Some("key".to_string()), "http://127.0.0.1:9");
        let result = provider.get_history(&PriceQuery::default()).await;
        assert!(matches!(result, Err(MarketDataError::MissingSymbol)));
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let provider = MarketstackProvider::new(Client::new(), None, "http://127.0.0.1:9");
        let result = provider.get_history(&PriceQuery::new("AAPL")).await;
        assert!(matches!(result, Err(MarketDataError::MissingApiKey { .. })));
    }
}
