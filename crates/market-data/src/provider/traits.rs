//! Historical data provider trait definition.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{PriceQuery, PriceTable};

/// Trait for historical price providers.
///
/// Each provider turns a [`PriceQuery`] into exactly one upstream request
/// and normalizes the answer into a [`PriceTable`]. Providers never retry.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use mkdl_market_data::provider::HistoryProvider;
///
/// struct MyProvider {
///     api_key: String,
/// }
///
/// #[async_trait]
/// impl HistoryProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     async fn get_history(&self, query: &PriceQuery) -> Result<PriceTable, MarketDataError> {
///         let symbol = query.require_symbol()?;
///         // ... build the request, fetch, normalize
///     }
/// }
/// ```
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// A constant string like "MARKETSTACK" or "YAHOO", used in logs,
    /// errors and as the `source` of extracted quotes.
    fn id(&self) -> &'static str;

    /// Fetch historical records for the query.
    ///
    /// # Returns
    ///
    /// - `Ok(table)` when the provider returned at least one record
    /// - `Err(MarketDataError::NoDataForRange)` when it returned none
    /// - `Err(MarketDataError::MissingSymbol)` without any request when the
    ///   query has no symbol
    /// - any other error when the request failed
    async fn get_history(&self, query: &PriceQuery) -> Result<PriceTable, MarketDataError>;
}
