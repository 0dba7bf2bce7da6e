//! Data acquisition from the procurement search endpoint
//!
//! This module contains the fetch pipeline, including:
//! - HTTP client construction and response classification
//! - Retry on HTTP 429 with a fixed (or server-suggested) delay
//! - Pacing between consecutive page requests
//! - The pagination loop assembling the raw dataset

mod client;
mod pacer;
mod paginator;
mod query;

pub use client::{
    backoff_delay, build_http_client, fetch_page, parse_retry_after, PageResult, MAX_RETRY_AFTER,
};
pub use pacer::Pacer;
pub use paginator::Paginator;
pub use query::SearchQuery;

use crate::config::Config;
use crate::records::RawRecord;
use crate::DashboardError;
use std::time::Duration;

/// Everything the pagination loop produced
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    /// Rows in page order, exactly as returned
    pub records: Vec<RawRecord>,

    /// Pages successfully fetched
    pub pages_fetched: u32,

    /// Page count reported by the server on the last page fetched
    pub pages_reported: u32,

    /// Number of times a page was retried after HTTP 429
    pub rate_limit_retries: u32,

    /// Wall-clock duration of the fetch
    pub elapsed: Duration,
}

/// Fetches every page for the configured query
///
/// This is the main entry point for data acquisition. It will:
/// 1. Build the HTTP client
/// 2. Translate the query configuration into request parameters
/// 3. Walk the pages until a stop condition is met
///
/// # Arguments
///
/// * `config` - The dashboard configuration
///
/// # Returns
///
/// * `Ok(FetchReport)` - Fetch completed
/// * `Err(DashboardError)` - A page could not be fetched
pub async fn fetch_records(config: &Config) -> Result<FetchReport, DashboardError> {
    let client = build_http_client(
        &config.user_agent,
        Duration::from_secs(config.api.timeout_secs),
    )?;
    let query = SearchQuery::from(&config.query);

    Paginator::new(client, config.api.clone(), query).run().await
}
