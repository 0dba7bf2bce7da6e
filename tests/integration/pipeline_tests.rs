//! End-to-end runs: fetch, clean, analyze and write the dashboard

use crate::common::{create_test_config, page, record, SEARCH_PATH};
use procurement_dashboard::config::{load_config_with_hash, Config, Overrides};
use procurement_dashboard::output::{write_dashboard, ChartKind, ReportContext, WrittenFiles};
use procurement_dashboard::records::{clean_records, LocalFilters};
use procurement_dashboard::{analyze, fetch_records};
use serde_json::json;
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Runs the same steps as the binary
async fn run_pipeline(config: &Config) -> WrittenFiles {
    let fetched = fetch_records(config).await.expect("fetch should succeed");
    let filters = LocalFilters::new(
        config.query.buyer_filter(),
        config.query.contract_type_filter(),
    );
    let (contracts, cleaning) = clean_records(&fetched.records, &filters);
    let dashboard = analyze(&contracts);
    let context = ReportContext::new(config, &fetched, "testhash");

    write_dashboard(
        Path::new(&config.output.directory),
        &contracts,
        &cleaning,
        &dashboard,
        &context,
        config.output.charts,
    )
    .expect("dashboard should be written")
}

async fn mount_two_years(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                record(1, "obra", 1000.0, "2022-01-10"),
                record(2, "bienes", 250.0, "2022-05-11"),
                record(3, "obra", 4000.0, "2023-02-12"),
                // duplicate id, dropped during cleaning
                record(3, "obra", 4000.0, "2023-02-12"),
            ],
            2,
        )))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                record(4, "servicios", 600.0, "2023-07-01"),
                // missing amount, dropped during cleaning
                json!({"id": "5", "internal_type": "obra", "date": "2023-08-01"}),
            ],
            2,
        )))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_full_run_writes_report_charts_and_exports() {
    let mock_server = MockServer::start().await;
    mount_two_years(&mock_server).await;

    let temp_dir = tempfile::tempdir().unwrap();
    let out_dir = temp_dir.path().join("out");
    let mut config = create_test_config(&mock_server, out_dir.to_str().unwrap());
    config.query.year = None;

    let written = run_pipeline(&config).await;

    assert_eq!(written.exports.len(), 3);
    assert_eq!(written.charts.len(), ChartKind::ALL.len());
    for file in written.exports.iter().chain(written.charts.iter()) {
        assert!(file.exists(), "missing {}", file.display());
    }

    let report = std::fs::read_to_string(out_dir.join("dashboard.md")).unwrap();
    assert!(report.contains("# Public Procurement Dashboard"));
    assert!(report.contains("- **Year**: all"));
    assert!(report.contains("- **Pages fetched**: 2 of 2 reported"));
    assert!(report.contains("| Fetched | 6 |"));
    assert!(report.contains("| Dropped (missing amount or type) | 1 |"));
    assert!(report.contains("| Duplicates removed | 1 |"));
    assert!(report.contains("| Final | 4 |"));
    assert!(report.contains("- **Total**: $5,850.00"));
    assert!(report.contains("charts/year_month_heatmap.svg"));
    assert!(report.contains("## Findings"));
    assert!(report.contains("- `contracts_processed_agua_all.csv`"));

    let contracts_csv =
        std::fs::read_to_string(out_dir.join("contracts_processed_agua_all.csv")).unwrap();
    // header plus four cleaned contracts
    assert_eq!(contracts_csv.lines().count(), 5);
    assert!(contracts_csv.contains(",Obra,GAD MUNICIPAL DE CUENCA,"));

    let yearly_csv = std::fs::read_to_string(out_dir.join("yearly_summary_agua_all.csv")).unwrap();
    assert!(yearly_csv.lines().any(|l| l.starts_with("2022,2,1250,625,")));
    assert!(yearly_csv.lines().any(|l| l.starts_with("2023,2,4600,2300,")));
}

#[tokio::test]
async fn test_run_without_charts() {
    let mock_server = MockServer::start().await;
    mount_two_years(&mock_server).await;

    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&mock_server, temp_dir.path().to_str().unwrap());
    config.output.charts = false;

    let written = run_pipeline(&config).await;

    assert!(written.charts.is_empty());
    assert!(!temp_dir.path().join("charts").exists());
    assert_eq!(written.exports.len(), 3);

    let report = std::fs::read_to_string(&written.report).unwrap();
    assert!(!report.contains("## Charts"));
    assert!(report.contains("- `contract_types_agua_2023.csv`"));
}

#[tokio::test]
async fn test_run_with_no_matching_records() {
    let mock_server = MockServer::start().await;
    mount_two_years(&mock_server).await;

    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&mock_server, temp_dir.path().to_str().unwrap());
    config.query.contract_type = Some("consultoria".to_string());

    let written = run_pipeline(&config).await;

    assert!(written.exports.is_empty());
    assert!(written.charts.is_empty());
    assert_eq!(written.count(), 1);

    let report = std::fs::read_to_string(&written.report).unwrap();
    assert!(report.contains("- **Contract type filter**: consultoria"));
    assert!(report.contains("No records matched the filters."));
}

#[tokio::test]
async fn test_run_from_config_file_with_overrides() {
    let mock_server = MockServer::start().await;
    mount_two_years(&mock_server).await;

    let temp_dir = tempfile::tempdir().unwrap();
    let out_dir = temp_dir.path().join("dashboard");
    let config_path = temp_dir.path().join("dashboard.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[api]
base-url = "{}{}"
max-pages = 5
page-delay-ms = 100
retry-delay-ms = 100

[user-agent]
client-name = "TestDashboard"
client-version = "1.0.0"
contact-email = "test@example.com"

[query]
year = 2023
keyword = "agua"

[output]
directory = "{}"
"#,
            mock_server.uri(),
            SEARCH_PATH,
            out_dir.display()
        ),
    )
    .unwrap();

    let overrides = Overrides {
        all_years: true,
        contract_type: Some("obra".to_string()),
        no_charts: true,
        ..Overrides::default()
    };
    let (config, hash) = load_config_with_hash(&config_path, overrides).unwrap();
    assert_eq!(config.query.year, None);
    assert_eq!(hash.len(), 64);

    let written = run_pipeline(&config).await;
    assert!(written.charts.is_empty());

    let types_csv = std::fs::read_to_string(out_dir.join("contract_types_agua_all.csv")).unwrap();
    assert_eq!(types_csv.lines().count(), 2);
    assert!(types_csv.contains("Obra,5000,2500,2,"));
}
