//! Yahoo Finance provider.
//!
//! Delegates the download to a [`YahooDownloader`] and reshapes the result
//! into the canonical `Open, High, Low, Close, Volume` table.

mod download;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{PriceQuery, PriceTable};
use crate::provider::HistoryProvider;

pub use download::{
    max_lookback, ConnectorDownloader, DownloadWindow, YahooDownloadRequest, YahooDownloader,
    DEFAULT_INTERVAL, DOWNLOAD_COLUMNS,
};

pub(crate) const PROVIDER_ID: &str = "YAHOO";

/// Output columns, in output order.
pub const CANONICAL_COLUMNS: [&str; 5] = ["Open", "High", "Low", "Close", "Volume"];

/// Yahoo Finance historical price provider.
pub struct YahooProvider {
    downloader: Arc<dyn YahooDownloader>,
}

impl YahooProvider {
    /// Create a provider backed by `yahoo_finance_api`.
    pub fn new() -> Result<Self, MarketDataError> {
        Ok(Self::with_downloader(Arc::new(ConnectorDownloader::new()?)))
    }

    pub fn with_downloader(downloader: Arc<dyn YahooDownloader>) -> Self {
        Self { downloader }
    }
}

/// Select the five price columns (matched ignoring case, any input order),
/// rename them to [`CANONICAL_COLUMNS`] and drop incomplete rows.
pub fn canonicalize(table: PriceTable) -> Result<PriceTable, MarketDataError> {
    if table.is_empty() {
        return Err(MarketDataError::NoDataForRange);
    }

    let mut selection = Vec::with_capacity(CANONICAL_COLUMNS.len());
    for name in CANONICAL_COLUMNS {
        let pos = table
            .position_ignore_case(name)
            .ok_or_else(|| MarketDataError::ValidationFailed {
                message: format!(
                    "Yahoo download has no '{}' column (got {:?})",
                    name,
                    table.columns()
                ),
            })?;
        selection.push((pos, name));
    }

    let before = table.len();
    let table = table.select_columns(&selection)?.drop_incomplete();
    if table.len() < before {
        debug!("Dropped {} incomplete Yahoo rows", before - table.len());
    }
    if table.is_empty() {
        return Err(MarketDataError::NoDataForRange);
    }
    Ok(table)
}

#[async_trait]
impl HistoryProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_history(&self, query: &PriceQuery) -> Result<PriceTable, MarketDataError> {
        let request = YahooDownloadRequest::from_query(query, Utc::now())?;

        debug!(
            "Fetching {} history for {} ({:?}) from Yahoo",
            request.interval, request.symbol, request.window
        );

        let raw = self.downloader.download(&request).await?;
        canonicalize(raw).inspect_err(|e| {
            warn!("Yahoo download for {} unusable: {}", request.symbol, e);
        })
    }
}
