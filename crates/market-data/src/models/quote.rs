use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Typed OHLCV view of one price record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Timestamp of the quote
    pub timestamp: DateTime<Utc>,

    /// Opening price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,

    /// High price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,

    /// Low price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,

    /// Closing price (required)
    pub close: Decimal,

    /// Trading volume
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,

    /// Source of the quote (MARKETSTACK, EODHD, YAHOO)
    pub source: String,
}

impl Quote {
    /// Create a quote with only a close price; the other fields start empty
    pub fn new(timestamp: DateTime<Utc>, close: Decimal, source: String) -> Self {
        Self {
            timestamp,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_new() {
        let quote = Quote::new(Utc::now(), dec!(150.25), "MARKETSTACK".to_string());
        assert_eq!(quote.close, dec!(150.25));
        assert_eq!(quote.source, "MARKETSTACK");
        assert!(quote.open.is_none());
    }

    #[test]
    fn test_quote_serialization_skips_missing_fields() {
        let quote = Quote::new(Utc::now(), dec!(1), "YAHOO".to_string());
        let json = serde_json::to_value(&quote).unwrap();
        assert!(json.get("open").is_none());
        assert!(json.get("close").is_some());
    }
}
