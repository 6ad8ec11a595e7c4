//! EODHD provider implementation.
//!
//! Fetches end-of-day records from the EODHD API.
//!
//! # API Endpoint
//!
//! `https://eodhd.com/api/eod/{symbol}?api_token={key}&fmt=json&period={d|w|m}`
//! with `from` and `to` appended only when set.
//!
//! # Response Format
//!
//! A JSON array of records:
//! `[{"date": "2023-01-03", "open": ..., "adjusted_close": ..., "volume": ...}]`.
//! Failures come back as non-200 statuses with a plain-text or JSON body.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use urlencoding::encode;

use crate::errors::MarketDataError;
use crate::models::{PriceQuery, PriceTable};
use crate::provider::http;
use crate::provider::HistoryProvider;

const PROVIDER_ID: &str = "EODHD";

/// Daily records unless the query says otherwise.
pub const DEFAULT_PERIOD: &str = "d";

const INDEX_FIELD: &str = "date";

/// Longest error body echoed back in an error message.
const MAX_DETAIL_LEN: usize = 200;

/// EODHD provider for end-of-day records.
pub struct EodhdProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl EodhdProvider {
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

    /// Build the request URL. The symbol is a path segment, so it is
    /// percent-encoded; `from`/`to` are appended only when set.
    pub fn build_url(
        base_url: &str,
        api_key: &str,
        symbol: &str,
        query: &PriceQuery,
    ) -> Result<Url, MarketDataError> {
        let date_from = query.date_from_str();
        let date_to = query.date_to_str();
        let period = query.timeframe_str().unwrap_or(DEFAULT_PERIOD);

        let mut params: Vec<(&str, &str)> = vec![
            ("api_token", api_key),
            ("fmt", "json"),
            ("period", period),
        ];
        if let Some(date_from) = date_from.as_deref() {
            params.push(("from", date_from));
        }
        if let Some(date_to) = date_to.as_deref() {
            params.push(("to", date_to));
        }

        let endpoint = format!(
            "{}/api/eod/{}",
            base_url.trim_end_matches('/'),
            encode(symbol)
        );
        Url::parse_with_params(&endpoint, &params).map_err(|e| MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to build URL: {}", e),
        })
    }

    fn parse_response(status: StatusCode, body: &str) -> Result<PriceTable, MarketDataError> {
        if status != StatusCode::OK {
            let detail = body.trim();
            let detail = (!detail.is_empty())
                .then(|| detail.chars().take(MAX_DETAIL_LEN).collect::<String>());
            http::check_status(PROVIDER_ID, status, detail)?;
        }

        let records: Vec<Value> =
            serde_json::from_str(body).map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse response: {}", e),
            })?;

        if records.is_empty() {
            return Err(MarketDataError::NoDataForRange);
        }

        PriceTable::from_json_records(&records, INDEX_FIELD)
    }
}

#[async_trait]
impl HistoryProvider for EodhdProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_history(&self, query: &PriceQuery) -> Result<PriceTable, MarketDataError> {
        let symbol = query.require_symbol()?;
        let api_key = self.api_key()?;

        let url = Self::build_url(&self.base_url, api_key, symbol, query)?;
        let (status, body) = http::get(&self.client, url, PROVIDER_ID, api_key).await?;

        let table = Self::parse_response(status, &body).inspect_err(|e| {
            if e.is_no_data() {
                warn!("No EODHD records for '{}'", symbol);
            }
        })?;

        debug!("EODHD: fetched {} records for {}", table.len(), symbol);
        Ok(table)
    }
}
