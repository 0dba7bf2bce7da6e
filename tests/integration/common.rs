//! Shared fixtures for the integration tests

use procurement_dashboard::config::{ApiConfig, Config, OutputConfig, QueryConfig, UserAgentConfig};
use serde_json::{json, Value};
use wiremock::MockServer;

/// Path the mock search endpoint is mounted on
pub const SEARCH_PATH: &str = "/api/search_ocds";

/// Creates a test configuration pointing at the mock server
pub fn create_test_config(server: &MockServer, output_dir: &str) -> Config {
    Config {
        api: ApiConfig {
            base_url: format!("{}{}", server.uri(), SEARCH_PATH),
            max_pages: 10,
            page_delay_ms: 10, // Very short for testing
            max_attempts: 3,
            retry_delay_ms: 20,
            timeout_secs: 5,
        },
        user_agent: UserAgentConfig {
            client_name: "TestDashboard".to_string(),
            client_version: "1.0.0".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        query: QueryConfig {
            year: Some(2023),
            keyword: "agua".to_string(),
            buyer: None,
            contract_type: None,
        },
        output: OutputConfig {
            directory: output_dir.to_string(),
            charts: true,
        },
    }
}

/// One API item
pub fn record(id: u32, internal_type: &str, amount: f64, date: &str) -> Value {
    json!({
        "id": id.to_string(),
        "ocid": format!("ocds-5wno2w-{:04}", id),
        "date": date,
        "method": "Subasta Inversa Electrónica",
        "internal_type": internal_type,
        "buyer": "Gad Municipal de Cuenca",
        "locality": "Cuenca",
        "region": "Azuay",
        "suppliers": format!("Proveedor {}", id % 3),
        "amount": amount.to_string(),
        "title": "Agua potable",
        "description": null,
        "budget": amount,
    })
}

/// A page envelope
pub fn page(data: Vec<Value>, pages: u32) -> Value {
    json!({ "data": data, "pages": pages })
}
