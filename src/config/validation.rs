use crate::config::types::{ApiConfig, Config, OutputConfig, QueryConfig, UserAgentConfig};
use crate::ConfigError;
use chrono::Datelike;
use url::Url;

/// First year with records published by the search endpoint
pub const FIRST_YEAR: i32 = 2015;

/// Shortest keyword the search endpoint accepts
pub const MIN_KEYWORD_LEN: usize = 3;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_query(&config.query, chrono::Utc::now().year())?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates data-acquisition settings
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.max_pages < 1 || config.max_pages > 100 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be between 1 and 100, got {}",
            config.max_pages
        )));
    }

    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    if config.page_delay_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "page_delay_ms must be >= 100ms, got {}ms",
            config.page_delay_ms
        )));
    }

    if config.retry_delay_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "retry_delay_ms must be >= 100ms, got {}ms",
            config.retry_delay_ms
        )));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.client_name.is_empty() {
        return Err(ConfigError::Validation(
            "client_name cannot be empty".to_string(),
        ));
    }

    if !config
        .client_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "client_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.client_name
        )));
    }

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates search filters against the year the run happens in
fn validate_query(query: &QueryConfig, current_year: i32) -> Result<(), ConfigError> {
    if query.keyword.trim().chars().count() < MIN_KEYWORD_LEN {
        return Err(ConfigError::InvalidQuery(format!(
            "keyword must be at least {} characters, got '{}'",
            MIN_KEYWORD_LEN, query.keyword
        )));
    }

    if let Some(year) = query.year {
        if year < FIRST_YEAR || year > current_year {
            return Err(ConfigError::InvalidQuery(format!(
                "year must be between {} and {}, got {}",
                FIRST_YEAR, current_year, year
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| ConfigError::Validation(format!("Invalid email format: '{}'", email)))?;

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
