//! Request plumbing shared by the HTTP/JSON providers.

use log::{debug, warn};
use reqwest::{Client, StatusCode, Url};

use crate::errors::MarketDataError;

/// Build a client with the given timeout, falling back to reqwest defaults.
pub(crate) fn build_client(timeout: std::time::Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Replace every occurrence of `secret` (raw or percent-encoded) with `***`.
pub(crate) fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }
    let encoded = urlencoding::encode(secret);
    text.replace(secret, "***").replace(encoded.as_ref(), "***")
}

/// Send one GET request and return the status and body.
///
/// Only transport failures are errors here; status handling is left to
/// the caller so the body of a failed response can still be inspected.
pub(crate) async fn get(
    client: &Client,
    url: Url,
    provider: &str,
    secret: &str,
) -> Result<(StatusCode, String), MarketDataError> {
    debug!("{} request: {}", provider, redact(url.as_str(), secret));

    let response = client.get(url).send().await.map_err(|e| {
        warn!("{} request failed: {}", provider, redact(&e.to_string(), secret));
        if e.is_timeout() {
            MarketDataError::Timeout {
                provider: provider.to_string(),
            }
        } else {
            MarketDataError::ProviderError {
                provider: provider.to_string(),
                message: redact(&e.to_string(), secret),
            }
        }
    })?;

    let status = response.status();
    let body = response.text().await?;

    Ok((status, body))
}

/// Map any status other than 200 to an error. `detail` is the provider's
/// own error message, when one could be extracted from the body.
pub(crate) fn check_status(
    provider: &str,
    status: StatusCode,
    detail: Option<String>,
) -> Result<(), MarketDataError> {
    if status == StatusCode::OK {
        return Ok(());
    }

    warn!(
        "{} returned HTTP {}{}",
        provider,
        status,
        detail.as_deref().map(|d| format!(": {}", d)).unwrap_or_default()
    );

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(MarketDataError::RateLimited {
            provider: provider.to_string(),
        });
    }

    let message = match detail {
        Some(detail) => format!("HTTP {}: {}", status, detail),
        None => format!("HTTP {}", status),
    };
    Err(MarketDataError::ProviderError {
        provider: provider.to_string(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact() {
        assert_eq!(
            redact("https://x/eod?access_key=abc123&sort=ASC", "abc123"),
            "https://x/eod?access_key=***&sort=ASC"
        );
        assert_eq!(redact("token=a%2Fb", "a/b"), "token=***");
        assert_eq!(redact("nothing here", ""), "nothing here");
    }

    #[test]
    fn test_check_status_success() {
        assert!(check_status("EODHD", StatusCode::OK, None).is_ok());
    }

    #[test]
    fn test_check_status_other_2xx_is_an_error() {
        let result = check_status("EODHD", StatusCode::NO_CONTENT, None);
        match result {
            Err(MarketDataError::ProviderError { message, .. }) => {
                assert_eq!(message, "HTTP 204 No Content");
            }
            other => panic!("Expected ProviderError, got {:?}", other),
        }
    }

    #[test]
    fn test_check_status_rate_limited() {
        let result = check_status("EODHD", StatusCode::TOO_MANY_REQUESTS, None);
        assert!(matches!(result, Err(MarketDataError::RateLimited { .. })));
    }

    #[test]
    fn test_check_status_provider_error() {
        let result = check_status(
            "MARKETSTACK",
            StatusCode::UNAUTHORIZED,
            Some("Invalid access key".to_string()),
        );
        match result {
            Err(MarketDataError::ProviderError { provider, message }) => {
                assert_eq!(provider, "MARKETSTACK");
                assert_eq!(message, "HTTP 401 Unauthorized: Invalid access key");
            }
            other => panic!("Expected ProviderError, got {:?}", other),
        }
    }
}
