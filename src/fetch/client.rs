//! HTTP client for the search endpoint
//!
//! This module handles a single page request:
//! - Building the HTTP client with a proper user agent string
//! - Sending one GET with the search parameters
//! - Classifying the response for the retry loop

use crate::config::UserAgentConfig;
use crate::records::SearchPage;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Longest `Retry-After` the client is willing to honor
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(300);

/// Outcome of a single page request
#[derive(Debug)]
pub enum PageResult {
    /// The page was fetched and decoded
    Success(SearchPage),

    /// HTTP 429; the server may suggest how long to wait
    RateLimited {
        /// Parsed `Retry-After` header, if any
        retry_after: Option<Duration>,
    },

    /// Any other non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Connection, timeout or body read failure
    NetworkError {
        /// The underlying client error
        error: reqwest::Error,
    },

    /// The body was not the expected JSON envelope
    DecodeError {
        /// Error description
        message: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Per-request timeout
///
/// # Example
///
/// ```no_run
/// use procurement_dashboard::config::UserAgentConfig;
/// use procurement_dashboard::fetch::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     client_name: "ProcurementDashboard".to_string(),
///     client_version: "0.1.0".to_string(),
///     contact_email: "ops@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sends one page request and classifies the response
///
/// # Response Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 2xx with a valid envelope | Success |
/// | HTTP 2xx with an invalid body | DecodeError |
/// | HTTP 429 | RateLimited |
/// | Other HTTP status | HttpError |
/// | Timeout / connection / read error | NetworkError |
pub async fn fetch_page(client: &Client, base_url: &str, params: &[(&str, String)]) -> PageResult {
    let response = match client.get(base_url).query(params).send().await {
        Ok(response) => response,
        Err(error) => return PageResult::NetworkError { error },
    };

    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return PageResult::RateLimited {
            retry_after: parse_retry_after(response.headers()),
        };
    }

    if !status.is_success() {
        return PageResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(error) => return PageResult::NetworkError { error },
    };

    match serde_json::from_str::<SearchPage>(&body) {
        Ok(page) => PageResult::Success(page),
        Err(e) => PageResult::DecodeError {
            message: e.to_string(),
        },
    }
}

/// Parses a `Retry-After` header given in seconds
///
/// HTTP-date values are ignored; the configured delay applies instead.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Chooses how long to wait after a 429
///
/// The server's `Retry-After` wins when it asks for longer than the
/// configured delay, capped at [`MAX_RETRY_AFTER`].
pub fn backoff_delay(configured: Duration, retry_after: Option<Duration>) -> Duration {
    retry_after
        .map(|ra| ra.min(MAX_RETRY_AFTER))
        .filter(|ra| *ra > configured)
        .unwrap_or(configured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            client_name: "TestDash".to_string(),
            client_version: "1.0".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&create_test_config(), Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("12"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(12)));

        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn test_backoff_delay() {
        let configured = Duration::from_secs(5);

        assert_eq!(backoff_delay(configured, None), configured);
        // a shorter hint never shortens the configured wait
        assert_eq!(
            backoff_delay(configured, Some(Duration::from_secs(1))),
            configured
        );
        assert_eq!(
            backoff_delay(configured, Some(Duration::from_secs(20))),
            Duration::from_secs(20)
        );
        assert_eq!(
            backoff_delay(configured, Some(Duration::from_secs(3600))),
            MAX_RETRY_AFTER
        );
    }
}
