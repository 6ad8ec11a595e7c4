//! Client facade over the three providers.

use std::sync::Arc;

use tracing::debug;

use crate::config::MarketDataConfig;
use crate::errors::MarketDataError;
use crate::models::{PriceQuery, PriceTable};
use crate::provider::eodhd::EodhdProvider;
use crate::provider::marketstack::MarketstackProvider;
use crate::provider::yahoo::{YahooDownloader, YahooProvider};
use crate::provider::HistoryProvider;

/// Historical price client for Marketstack, EODHD and Yahoo Finance.
///
/// Each operation targets exactly one provider, sends one request and
/// returns a date-indexed [`PriceTable`]. Nothing is cached or retried.
///
/// # Example
///
/// ```ignore
/// let client = MarketDataClient::new(
///     MarketDataConfig::default().with_marketstack_api_key("..."),
/// )?;
/// let query = PriceQuery::new("AAPL")
///     .with_date_from(PriceQuery::parse_date("2023-01-01")?)
///     .with_date_to(PriceQuery::parse_date("2023-01-10")?);
///
/// match client.get_data_marketstack(&query).await {
///     Ok(table) => println!("{} rows", table.len()),
///     Err(e) if e.is_no_data() => println!("nothing in range"),
///     Err(e) => eprintln!("request failed: {}", e),
/// }
/// ```
pub struct MarketDataClient {
    config: MarketDataConfig,
    marketstack: MarketstackProvider,
    eodhd: EodhdProvider,
    yahoo: YahooProvider,
}

impl MarketDataClient {
    /// Create a client using `yahoo_finance_api` for Yahoo downloads.
    pub fn new(config: MarketDataConfig) -> Result<Self, MarketDataError> {
        let yahoo = YahooProvider::new()?;
        Ok(Self::build(config, yahoo))
    }

    /// Create a client from `.env` and the process environment.
    pub fn from_env() -> Result<Self, MarketDataError> {
        Self::new(MarketDataConfig::from_env())
    }

    /// Create a client with a custom Yahoo bulk-download implementation.
    pub fn with_yahoo_downloader(
        config: MarketDataConfig,
        downloader: Arc<dyn YahooDownloader>,
    ) -> Self {
        Self::build(config, YahooProvider::with_downloader(downloader))
    }

    fn build(config: MarketDataConfig, yahoo: YahooProvider) -> Self {
        let client = crate::provider::build_client(config.request_timeout);
        let marketstack = MarketstackProvider::new(
            client.clone(),
            config.marketstack_api_key.clone(),
            config.marketstack_base_url.clone(),
        );
        let eodhd = EodhdProvider::new(
            client,
            config.eodhd_api_key.clone(),
            config.eodhd_base_url.clone(),
        );

        Self {
            config,
            marketstack,
            eodhd,
            yahoo,
        }
    }

    pub fn config(&self) -> &MarketDataConfig {
        &self.config
    }

    /// End-of-day (or intraday, per `timeframe`) records from Marketstack,
    /// ordered by `query.sort`.
    pub async fn get_data_marketstack(
        &self,
        query: &PriceQuery,
    ) -> Result<PriceTable, MarketDataError> {
        Self::fetch(&self.marketstack, query).await
    }

    /// End-of-day records from EODHD. `timeframe` is the EODHD period
    /// (`d`, `w`, `m`), daily when unset.
    pub async fn get_data_eodhd(&self, query: &PriceQuery) -> Result<PriceTable, MarketDataError> {
        Self::fetch(&self.eodhd, query).await
    }

    /// Canonical `Open, High, Low, Close, Volume` records from Yahoo
    /// Finance. `timeframe` is the Yahoo interval, `1d` when unset.
    pub async fn get_data_yfinance(
        &self,
        query: &PriceQuery,
    ) -> Result<PriceTable, MarketDataError> {
        Self::fetch(&self.yahoo, query).await
    }

    async fn fetch(
        provider: &dyn HistoryProvider,
        query: &PriceQuery,
    ) -> Result<PriceTable, MarketDataError> {
        debug!(
            provider = provider.id(),
            symbol = query.symbol.as_deref().unwrap_or(""),
            "Fetching price history"
        );
        provider.get_history(query).await
    }
}
