//! Configuration module for the dashboard
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use procurement_dashboard::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("dashboard.toml")).unwrap();
//! println!("Searching for: {}", config.query.keyword);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, Config, OutputConfig, Overrides, QueryConfig, UserAgentConfig, DEFAULT_BASE_URL,
};
pub use validation::{validate, FIRST_YEAR, MIN_KEYWORD_LEN};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, load_config_with_overrides,
};
