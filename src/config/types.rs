use serde::Deserialize;

/// Default procurement search endpoint
pub const DEFAULT_BASE_URL: &str =
    "https://datosabiertos.compraspublicas.gob.ec/PLATAFORMA/api/search_ocds";

/// Main configuration structure for the dashboard
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub query: QueryConfig,
    pub output: OutputConfig,
}

/// Data-acquisition configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Search endpoint URL
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Maximum number of pages requested in one run
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Minimum time between consecutive page requests (milliseconds)
    #[serde(rename = "page-delay-ms", default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Attempts per page before giving up on HTTP 429
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Wait after an HTTP 429 response (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_pages: default_max_pages(),
            page_delay_ms: default_page_delay_ms(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_pages() -> u32 {
    10
}

fn default_page_delay_ms() -> u64 {
    1500
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    5000
}

fn default_timeout_secs() -> u64 {
    30
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the client
    #[serde(rename = "client-name")]
    pub client_name: String,

    /// Version of the client
    #[serde(rename = "client-version")]
    pub client_version: String,

    /// Email address for API operators to reach us
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+email)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.client_name, self.client_version, self.contact_email
        )
    }
}

/// Search filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryConfig {
    /// Year to analyze; `None` means every year
    #[serde(default)]
    pub year: Option<i32>,

    /// Free-text search term sent to the API
    pub keyword: String,

    /// Province or contracting entity; sent to the API and applied locally
    #[serde(default)]
    pub buyer: Option<String>,

    /// Contract type filter, applied locally
    #[serde(rename = "contract-type", default)]
    pub contract_type: Option<String>,
}

impl QueryConfig {
    /// Label used in export file names and report headers
    pub fn year_label(&self) -> String {
        match self.year {
            Some(year) => year.to_string(),
            None => "all".to_string(),
        }
    }

    /// Buyer filter with surrounding whitespace removed, if non-blank
    pub fn buyer_filter(&self) -> Option<&str> {
        non_blank(self.buyer.as_deref())
    }

    /// Contract-type filter with surrounding whitespace removed, if non-blank
    pub fn contract_type_filter(&self) -> Option<&str> {
        non_blank(self.contract_type.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the report, charts and CSV exports
    pub directory: String,

    /// Whether SVG charts are rendered
    #[serde(default = "default_charts")]
    pub charts: bool,
}

fn default_charts() -> bool {
    true
}

/// Command-line overrides applied on top of the file configuration
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub year: Option<i32>,
    pub all_years: bool,
    pub keyword: Option<String>,
    pub buyer: Option<String>,
    pub contract_type: Option<String>,
    pub max_pages: Option<u32>,
    pub output_dir: Option<String>,
    pub no_charts: bool,
}

impl Config {
    /// Applies command-line overrides; validation should run afterwards
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if overrides.all_years {
            self.query.year = None;
        } else if let Some(year) = overrides.year {
            self.query.year = Some(year);
        }
        if let Some(keyword) = overrides.keyword {
            self.query.keyword = keyword;
        }
        if let Some(buyer) = overrides.buyer {
            self.query.buyer = Some(buyer);
        }
        if let Some(contract_type) = overrides.contract_type {
            self.query.contract_type = Some(contract_type);
        }
        if let Some(max_pages) = overrides.max_pages {
            self.api.max_pages = max_pages;
        }
        if let Some(dir) = overrides.output_dir {
            self.output.directory = dir;
        }
        if overrides.no_charts {
            self.output.charts = false;
        }
    }
}
