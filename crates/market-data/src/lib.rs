//! mkdl Market Data Crate
//!
//! Fetches historical stock prices from Marketstack, EODHD and Yahoo
//! Finance and normalizes every response into a date-indexed
//! [`PriceTable`].
//!
//! # Overview
//!
//! ```text
//! +------------------+     +------------------+
//! | MarketDataConfig | --> | MarketDataClient |  (one operation per provider)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | HistoryProvider  |  (Marketstack, EODHD, Yahoo)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |   PriceTable     |  (timestamp index + columns)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`MarketDataClient`] - Entry point with `get_data_marketstack`,
//!   `get_data_eodhd` and `get_data_yfinance`
//! - [`MarketDataConfig`] - Credentials and HTTP settings
//! - [`PriceQuery`] - Symbol, date bounds, timeframe and sort order
//! - [`PriceTable`] - Date-indexed result table
//! - [`Quote`] - Typed OHLCV view of a table row
//! - [`MarketDataError`] - Failure taxonomy; `NoDataForRange` marks an
//!   empty but successful answer

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod provider;

pub use client::MarketDataClient;
pub use config::MarketDataConfig;
pub use errors::MarketDataError;
pub use models::{PriceQuery, PriceRecord, PriceTable, Quote, SortOrder};

pub use provider::eodhd::EodhdProvider;
pub use provider::marketstack::MarketstackProvider;
pub use provider::yahoo::{
    ConnectorDownloader, DownloadWindow, YahooDownloadRequest, YahooDownloader, YahooProvider,
};
pub use provider::HistoryProvider;
