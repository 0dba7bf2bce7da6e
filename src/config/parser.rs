use crate::config::types::{Config, Overrides};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use procurement_dashboard::config::load_config;
///
/// let config = load_config(Path::new("dashboard.toml")).unwrap();
/// println!("Max pages: {}", config.api.max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_overrides(path, Overrides::default())
}

/// Loads a configuration file, applies command-line overrides, then validates
pub fn load_config_with_overrides(path: &Path, overrides: Overrides) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let mut config: Config = toml::from_str(&content)?;
    config.apply_overrides(overrides);

    validate(&config)?;

    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is printed in the report so two dashboards can be traced back
/// to the same configuration.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(
    path: &Path,
    overrides: Overrides,
) -> Result<(Config, String), ConfigError> {
    let config = load_config_with_overrides(path, overrides)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const VALID_CONFIG: &str = r#"
[api]
max-pages = 4
page-delay-ms = 200

[user-agent]
client-name = "TestDash"
client-version = "1.0"
contact-email = "admin@example.com"

[query]
year = 2023
keyword = "agua"
buyer = "guayas"

[output]
directory = "./out"
"#;

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(VALID_CONFIG);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.api.max_pages, 4);
        assert_eq!(config.api.page_delay_ms, 200);
        assert_eq!(config.api.max_attempts, 3);
        assert_eq!(config.api.retry_delay_ms, 5000);
        assert_eq!(config.user_agent.client_name, "TestDash");
        assert_eq!(config.query.year, Some(2023));
        assert_eq!(config.query.buyer.as_deref(), Some("guayas"));
        assert!(config.output.charts);
    }

    #[test]
    fn test_missing_api_section_uses_defaults() {
        let content = r#"
[user-agent]
client-name = "TestDash"
client-version = "1.0"
contact-email = "admin@example.com"

[query]
keyword = "agua"

[output]
directory = "./out"
"#;
        let file = create_temp_config(content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.api.max_pages, 10);
        assert_eq!(config.api.page_delay_ms, 1500);
        assert!(config.api.base_url.ends_with("/api/search_ocds"));
        assert_eq!(config.query.year, None);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/dashboard.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_overrides_are_validated() {
        let file = create_temp_config(VALID_CONFIG);
        let overrides = Overrides {
            keyword: Some("ab".to_string()),
            ..Overrides::default()
        };

        let result = load_config_with_overrides(file.path(), overrides);
        assert!(matches!(result, Err(ConfigError::InvalidQuery(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
