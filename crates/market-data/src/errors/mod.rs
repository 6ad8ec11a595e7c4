//! Error types for the market data crate.
//!
//! Every retrieval operation returns `Result<PriceTable, MarketDataError>`.
//! The variants split into three groups:
//! - precondition failures, raised before any request is sent
//!   ([`MissingSymbol`](MarketDataError::MissingSymbol),
//!   [`MissingApiKey`](MarketDataError::MissingApiKey))
//! - "the provider answered but had nothing"
//!   ([`NoDataForRange`](MarketDataError::NoDataForRange))
//! - request failures (everything else)

use thiserror::Error;

/// Errors that can occur during market data operations.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// No symbol was supplied. No request was made.
    #[error("Symbol is required")]
    MissingSymbol,

    /// The provider's credential is not configured. No request was made.
    #[error("Missing API key for provider: {provider}")]
    MissingApiKey {
        /// The provider lacking a credential
        provider: String,
    },

    /// The provider answered successfully but returned no records
    /// for the requested symbol and date range.
    #[error("No data for date range")]
    NoDataForRange,

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific error occurred: non-200 status, transport
    /// failure, or a body that could not be decoded.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider returned data that could not be normalized,
    /// e.g. an unparsable timestamp or a missing price column.
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Description of the validation failure
        message: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Returns `true` when the provider was reached and simply had no records.
    ///
    /// Callers use this to tell "nothing in this range" apart from
    /// "the request failed".
    ///
    /// # Examples
    ///
    /// ```
    /// use mkdl_market_data::errors::MarketDataError;
    ///
    /// assert!(MarketDataError::NoDataForRange.is_no_data());
    /// assert!(!MarketDataError::MissingSymbol.is_no_data());
    /// ```
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoDataForRange)
    }

    /// Returns `true` for errors raised before any request was sent.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::MissingSymbol | Self::MissingApiKey { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_is_not_a_failure() {
        let error = MarketDataError::NoDataForRange;
        assert!(error.is_no_data());
        assert!(!error.is_precondition());
    }

    #[test]
    fn test_provider_error_is_a_failure() {
        let error = MarketDataError::ProviderError {
            provider: "EODHD".to_string(),
            message: "HTTP 500 Internal Server Error".to_string(),
        };
        assert!(!error.is_no_data());
        assert!(!error.is_precondition());
    }

    #[test]
    fn test_preconditions() {
        assert!(MarketDataError::MissingSymbol.is_precondition());
        assert!(MarketDataError::MissingApiKey {
            provider: "MARKETSTACK".to_string()
        }
        .is_precondition());
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::MissingSymbol;
        assert_eq!(format!("{}", error), "Symbol is required");

        let error = MarketDataError::RateLimited {
            provider: "MARKETSTACK".to_string(),
        };
        assert_eq!(format!("{}", error), "Rate limited: MARKETSTACK");

        let error = MarketDataError::ProviderError {
            provider: "EODHD".to_string(),
            message: "HTTP 401 Unauthorized".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Provider error: EODHD - HTTP 401 Unauthorized"
        );

        let error = MarketDataError::MissingApiKey {
            provider: "EODHD".to_string(),
        };
        assert_eq!(format!("{}", error), "Missing API key for provider: EODHD");
    }
}
