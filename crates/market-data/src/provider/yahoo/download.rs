//! Bulk-download seam for Yahoo Finance.
//!
//! A [`YahooDownloadRequest`] is built once from a query, omitting every
//! parameter the query leaves unset, and handed to a [`YahooDownloader`].

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::{Number, Value};
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::{PriceQuery, PriceTable};

use super::PROVIDER_ID;

/// Sampling interval used when the query sets none.
pub const DEFAULT_INTERVAL: &str = "1d";

/// Columns produced by [`ConnectorDownloader`], in its output order.
pub const DOWNLOAD_COLUMNS: [&str; 6] = ["Adj Close", "Close", "High", "Low", "Open", "Volume"];

/// Time span to download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DownloadWindow {
    /// Everything the provider has
    Max,
    /// An explicit window, both ends inclusive
    Range {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Parameters of one bulk download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YahooDownloadRequest {
    pub symbol: String,
    pub interval: String,
    pub window: DownloadWindow,
}

impl YahooDownloadRequest {
    /// Build the request from a query.
    ///
    /// With no bounds the full history is requested. A missing upper bound
    /// means `now`. A missing lower bound means the longest lookback the
    /// interval allows, counted back from the upper bound.
    pub fn from_query(query: &PriceQuery, now: DateTime<Utc>) -> Result<Self, MarketDataError> {
        let symbol = query.require_symbol()?.to_string();
        let interval = query.timeframe_str().unwrap_or(DEFAULT_INTERVAL).to_string();

        let start = query.date_from.map(start_of_day);
        let end = query.date_to.map(end_of_day);

        let window = if start.is_none() && end.is_none() {
            DownloadWindow::Max
        } else {
            let end = end.unwrap_or(now);
            let start = start.unwrap_or_else(|| end - max_lookback(&interval));
            if start > end {
                return Err(MarketDataError::ValidationFailed {
                    message: format!("Start {} is after end {}", start, end),
                });
            }
            DownloadWindow::Range { start, end }
        };

        Ok(Self {
            symbol,
            interval,
            window,
        })
    }
}

/// Longest history Yahoo serves for an interval.
pub fn max_lookback(interval: &str) -> Duration {
    match interval {
        "1m" => Duration::days(7),
        "2m" | "5m" | "15m" | "30m" | "90m" => Duration::days(60),
        "60m" | "1h" => Duration::days(730),
        _ => Duration::days(99 * 365),
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + Duration::days(1) - Duration::seconds(1)
}

/// Bulk-download capability producing a raw, date-indexed table.
///
/// The returned columns may come in any order and may include extras;
/// the provider selects and orders the ones it needs.
#[async_trait]
pub trait YahooDownloader: Send + Sync {
    async fn download(&self, request: &YahooDownloadRequest) -> Result<PriceTable, MarketDataError>;
}

/// [`YahooDownloader`] backed by `yahoo_finance_api`.
pub struct ConnectorDownloader {
    connector: yahoo::YahooConnector,
}

impl ConnectorDownloader {
    pub fn new() -> Result<Self, MarketDataError> {
        let connector =
            yahoo::YahooConnector::new().map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to initialize Yahoo connector: {}", e),
            })?;
        Ok(Self { connector })
    }

    /// Convert chrono DateTime<Utc> to time::OffsetDateTime for the Yahoo API.
    fn chrono_to_offset_datetime(dt: DateTime<Utc>) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(dt.timestamp())
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
    }

    fn map_error(symbol: &str, error: yahoo::YahooError) -> MarketDataError {
        if matches!(error, yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) {
            debug!("Yahoo returned no quotes for {}", symbol);
            MarketDataError::NoDataForRange
        } else {
            MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: error.to_string(),
            }
        }
    }

    /// Build the raw table. Non-finite prices become nulls.
    fn quotes_to_table(quotes: Vec<yahoo::Quote>) -> Result<PriceTable, MarketDataError> {
        let price = |v: f64| Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null);

        let mut table = PriceTable::new(
            "Date",
            DOWNLOAD_COLUMNS.iter().map(|c| c.to_string()).collect(),
        );
        for quote in quotes {
            let timestamp = Utc
                .timestamp_opt(quote.timestamp as i64, 0)
                .single()
                .ok_or_else(|| MarketDataError::ValidationFailed {
                    message: format!("Invalid timestamp: {}", quote.timestamp),
                })?;
            table.push(
                timestamp,
                vec![
                    price(quote.adjclose),
                    price(quote.close),
                    price(quote.high),
                    price(quote.low),
                    price(quote.open),
                    Value::from(quote.volume),
                ],
            )?;
        }
        Ok(table)
    }
}

#[async_trait]
impl YahooDownloader for ConnectorDownloader {
    async fn download(
        &self,
        request: &YahooDownloadRequest,
    ) -> Result<PriceTable, MarketDataError> {
        let symbol = request.symbol.as_str();
        let response = match &request.window {
            DownloadWindow::Max => {
                self.connector
                    .get_quote_range(symbol, &request.interval, "max")
                    .await
            }
            DownloadWindow::Range { start, end } => {
                self.connector
                    .get_quote_history_interval(
                        symbol,
                        Self::chrono_to_offset_datetime(*start),
                        Self::chrono_to_offset_datetime(*end),
                        &request.interval,
                    )
                    .await
            }
        }
        .map_err(|e| Self::map_error(symbol, e))?;

        let quotes = response.quotes().map_err(|e| Self::map_error(symbol, e))?;
        Self::quotes_to_table(quotes)
    }
}
