use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// Wire format for date bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Sort order of the returned records (Marketstack only).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortOrder::Asc),
            "DESC" => Ok(SortOrder::Desc),
            other => Err(MarketDataError::ValidationFailed {
                message: format!("Invalid sort order: {}", other),
            }),
        }
    }
}

/// Parameters of a historical price request.
///
/// Every field except `sort` is optional; providers only forward the
/// fields that are set. A missing or blank symbol makes every operation
/// fail with [`MarketDataError::MissingSymbol`] before any request is sent.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use mkdl_market_data::{PriceQuery, SortOrder};
///
/// let query = PriceQuery::new("AAPL")
///     .with_date_from(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap())
///     .with_date_to(NaiveDate::from_ymd_opt(2023, 1, 10).unwrap())
///     .with_sort(SortOrder::Desc);
///
/// assert_eq!(query.date_from_str().as_deref(), Some("2023-01-01"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuery {
    /// Ticker identifier
    pub symbol: Option<String>,
    /// Inclusive lower date bound
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound
    pub date_to: Option<NaiveDate>,
    /// Sampling granularity, in the target provider's vocabulary
    pub timeframe: Option<String>,
    /// Record order (Marketstack only)
    #[serde(default)]
    pub sort: SortOrder,
}

impl PriceQuery {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            ..Default::default()
        }
    }

    pub fn with_date_from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn with_date_to(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    pub fn with_timeframe(mut self, timeframe: impl Into<String>) -> Self {
        self.timeframe = Some(timeframe.into());
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Parse an ISO 8601 `YYYY-MM-DD` date bound.
    pub fn parse_date(value: &str) -> Result<NaiveDate, MarketDataError> {
        NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
            MarketDataError::ValidationFailed {
                message: format!("Invalid date '{}': {}", value, e),
            }
        })
    }

    /// The trimmed symbol, or `MissingSymbol` when absent or blank.
    pub fn require_symbol(&self) -> Result<&str, MarketDataError> {
        match self.symbol.as_deref().map(str::trim) {
            Some(symbol) if !symbol.is_empty() => Ok(symbol),
            _ => Err(MarketDataError::MissingSymbol),
        }
    }

    /// The timeframe, ignoring blank values.
    pub fn timeframe_str(&self) -> Option<&str> {
        self.timeframe
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn date_from_str(&self) -> Option<String> {
        self.date_from.map(|d| d.format(DATE_FORMAT).to_string())
    }

    pub fn date_to_str(&self) -> Option<String> {
        self.date_to.map(|d| d.format(DATE_FORMAT).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_symbol() {
        assert_eq!(PriceQuery::new("AAPL").require_symbol().unwrap(), "AAPL");
        assert_eq!(PriceQuery::new("  MSFT ").require_symbol().unwrap(), "MSFT");
        assert!(matches!(
            PriceQuery::default().require_symbol(),
            Err(MarketDataError::MissingSymbol)
        ));
        assert!(matches!(
            PriceQuery::new("   ").require_symbol(),
            Err(MarketDataError::MissingSymbol)
        ));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            PriceQuery::parse_date("2023-01-10").unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 10).unwrap()
        );
        assert!(PriceQuery::parse_date("10/01/2023").is_err());
        assert!(PriceQuery::parse_date("2023-02-30").is_err());
    }

    #[test]
    fn test_date_strings() {
        let query =
            PriceQuery::new("AAPL").with_date_from(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(query.date_from_str().as_deref(), Some("2023-01-01"));
        assert!(query.date_to_str().is_none());
    }

    #[test]
    fn test_blank_timeframe_is_ignored() {
        assert!(PriceQuery::new("AAPL")
            .with_timeframe(" ")
            .timeframe_str()
            .is_none());
        assert_eq!(
            PriceQuery::new("AAPL").with_timeframe("1hour").timeframe_str(),
            Some("1hour")
        );
    }

    #[test]
    fn test_sort_order() {
        assert_eq!(PriceQuery::new("AAPL").sort, SortOrder::Asc);
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert_eq!(SortOrder::Asc.to_string(), "ASC");
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}
