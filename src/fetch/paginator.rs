//! Paginated acquisition loop
//!
//! The paginator walks the search endpoint page by page:
//! - Stops on an empty page, on the last page the server reports, or at
//!   the configured page cap
//! - Retries a page on HTTP 429, sleeping between attempts
//! - Aborts the whole fetch on any other failure
//! - Leaves at least `page-delay` between a response and the next request

use crate::config::ApiConfig;
use crate::fetch::client::{backoff_delay, fetch_page, PageResult};
use crate::fetch::pacer::Pacer;
use crate::fetch::query::SearchQuery;
use crate::fetch::FetchReport;
use crate::records::SearchPage;
use crate::DashboardError;
use reqwest::Client;
use std::time::{Duration, Instant};

/// Drives the page-by-page fetch for one query
pub struct Paginator {
    client: Client,
    api: ApiConfig,
    query: SearchQuery,
    pacer: Pacer,
    rate_limit_retries: u32,
}

impl Paginator {
    /// Creates a paginator for one search
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client to use
    /// * `api` - Endpoint, page cap, delays and attempt limit
    /// * `query` - Search parameters
    pub fn new(client: Client, api: ApiConfig, query: SearchQuery) -> Self {
        let pacer = Pacer::new(Duration::from_millis(api.page_delay_ms));
        Self {
            client,
            api,
            query,
            pacer,
            rate_limit_retries: 0,
        }
    }

    /// Runs the pagination loop to completion
    ///
    /// # Returns
    ///
    /// * `Ok(FetchReport)` - Every fetched row, in page order
    /// * `Err(DashboardError)` - A page failed; rows fetched so far are discarded
    pub async fn run(&mut self) -> Result<FetchReport, DashboardError> {
        let start = Instant::now();
        let mut records = Vec::new();
        let mut pages_fetched = 0;
        let mut page = 1;

        tracing::info!(
            "Fetching up to {} pages for '{}' (year: {})",
            self.api.max_pages,
            self.query.keyword,
            self.query
                .year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "all".to_string())
        );

        let pages_reported = loop {
            let result = self.fetch_page_with_retry(page).await?;
            pages_fetched += 1;

            if result.data.is_empty() {
                tracing::info!("Page {} returned no records, stopping", page);
                break result.pages;
            }

            let count = result.data.len();
            records.extend(result.data);
            tracing::info!(
                "Page {}/{}: {} records ({} total)",
                page,
                result.pages,
                count,
                records.len()
            );

            if page >= result.pages {
                break result.pages;
            }

            if page >= self.api.max_pages {
                tracing::info!(
                    "Reached page cap ({}) with {} pages available",
                    self.api.max_pages,
                    result.pages
                );
                break result.pages;
            }

            page += 1;
        };

        let elapsed = start.elapsed();
        tracing::info!(
            "Fetched {} records from {} pages in {:.1}s ({} rate-limit retries, {:.1}s paced)",
            records.len(),
            pages_fetched,
            elapsed.as_secs_f64(),
            self.rate_limit_retries,
            self.pacer.total_waited().as_secs_f64()
        );

        Ok(FetchReport {
            records,
            pages_fetched,
            pages_reported,
            rate_limit_retries: self.rate_limit_retries,
            elapsed,
        })
    }

    /// Fetches one page, retrying while the server answers HTTP 429
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 429 | Sleep, retry up to `max-attempts` total |
    /// | HTTP 429 on the last attempt | RateLimitExhausted |
    /// | Other HTTP error | Immediate → HttpStatus |
    /// | Timeout | Immediate → Timeout |
    /// | Connection / read error | Immediate → Http |
    /// | Malformed body | Immediate → Decode |
    async fn fetch_page_with_retry(&mut self, page: u32) -> Result<SearchPage, DashboardError> {
        let attempts = self.api.max_attempts;
        let retry_delay = Duration::from_millis(self.api.retry_delay_ms);
        let params = self.query.params(page);

        for attempt in 1..=attempts {
            self.pacer.wait().await;
            tracing::debug!("GET {} page {} (attempt {}/{})", self.api.base_url, page, attempt, attempts);

            let outcome = fetch_page(&self.client, &self.api.base_url, &params).await;
            self.pacer.response_done();

            match outcome {
                PageResult::Success(result) => return Ok(result),
                PageResult::RateLimited { retry_after } => {
                    if attempt == attempts {
                        break;
                    }
                    let delay = backoff_delay(retry_delay, retry_after);
                    tracing::warn!(
                        "Rate limited on page {} (attempt {}/{}), waiting {}ms before retrying",
                        page,
                        attempt,
                        attempts,
                        delay.as_millis()
                    );
                    self.rate_limit_retries += 1;
                    tokio::time::sleep(delay).await;
                }
                PageResult::HttpError { status_code } => {
                    tracing::error!("HTTP {} on page {}", status_code, page);
                    return Err(DashboardError::HttpStatus {
                        page,
                        status: status_code,
                    });
                }
                PageResult::NetworkError { error } => {
                    tracing::error!("Failed to reach the API on page {}: {}", page, error);
                    if error.is_timeout() {
                        return Err(DashboardError::Timeout { page });
                    }
                    return Err(DashboardError::Http {
                        page,
                        source: error,
                    });
                }
                PageResult::DecodeError { message } => {
                    tracing::error!("Malformed response on page {}: {}", page, message);
                    return Err(DashboardError::Decode { page, message });
                }
            }
        }

        tracing::error!("Giving up on page {} after {} rate-limited attempts", page, attempts);
        Err(DashboardError::RateLimitExhausted { page, attempts })
    }
}
