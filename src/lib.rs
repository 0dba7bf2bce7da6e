//! Procurement Dashboard: public-procurement reporting from open data
//!
//! This crate fetches procurement records from a paginated open-data API,
//! cleans them into typed contracts, aggregates them, and renders a markdown
//! dashboard with SVG charts and CSV exports.

pub mod analysis;
pub mod config;
pub mod fetch;
pub mod output;
pub mod records;

use thiserror::Error;

/// Main error type for dashboard operations
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("HTTP error for page {page}: {source}")]
    Http { page: u32, source: reqwest::Error },

    #[error("Request timeout for page {page}")]
    Timeout { page: u32 },

    #[error("API returned HTTP {status} for page {page}")]
    HttpStatus { page: u32, status: u16 },

    #[error("Still rate limited on page {page} after {attempts} attempts")]
    RateLimitExhausted { page: u32, attempts: u32 },

    #[error("Failed to decode page {page}: {message}")]
    Decode { page: u32, message: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use analysis::{analyze, Dashboard};
pub use config::Config;
pub use fetch::{fetch_records, FetchReport};
pub use records::{clean_records, CleaningReport, Contract};
