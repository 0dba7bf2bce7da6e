//! Pagination and retry behavior against a mock search API

use crate::common::{create_test_config, page, record, SEARCH_PATH};
use procurement_dashboard::fetch::fetch_records;
use procurement_dashboard::DashboardError;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_stops_at_reported_pages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                record(1, "obra", 100.0, "2023-01-10"),
                record(2, "bienes", 50.0, "2023-02-11"),
            ],
            2,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![record(3, "obra", 75.0, "2023-03-12")],
            2,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, "unused");
    let report = fetch_records(&config).await.expect("fetch should succeed");

    assert_eq!(report.records.len(), 3);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.pages_reported, 2);
    assert_eq!(report.rate_limit_retries, 0);
}

#[tokio::test]
async fn test_fetch_sends_query_and_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("year", "2023"))
        .and(query_param("search", "agua"))
        .and(query_param("page", "1"))
        .and(query_param("buyer", "Cuenca"))
        .and(header(
            "user-agent",
            "TestDashboard/1.0.0 (+test@example.com)",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![record(1, "obra", 100.0, "2023-01-10")],
            1,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server, "unused");
    config.query.buyer = Some("  Cuenca ".to_string());

    let report = fetch_records(&config).await.expect("fetch should succeed");
    assert_eq!(report.records.len(), 1);
}

#[tokio::test]
async fn test_fetch_stops_on_empty_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![record(1, "obra", 100.0, "2023-01-10")],
            5,
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], 5)))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, "unused");
    let report = fetch_records(&config).await.expect("fetch should succeed");

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.pages_reported, 5);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_fetch_respects_page_cap() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![record(1, "obra", 100.0, "2023-01-10")],
            50,
        )))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server, "unused");
    config.api.max_pages = 3;

    let report = fetch_records(&config).await.expect("fetch should succeed");

    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.pages_reported, 50);
    assert_eq!(report.records.len(), 3);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_fetch_retries_after_rate_limit() {
    let mock_server = MockServer::start().await;

    // First request is rate limited, the retry succeeds
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![record(1, "obra", 100.0, "2023-01-10")],
            1,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, "unused");
    let report = fetch_records(&config).await.expect("retry should succeed");

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.rate_limit_retries, 1);
}

#[tokio::test]
async fn test_fetch_honors_retry_after_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![record(1, "obra", 100.0, "2023-01-10")],
            1,
        )))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, "unused");
    let report = fetch_records(&config).await.expect("retry should succeed");

    assert_eq!(report.rate_limit_retries, 1);
    assert!(report.elapsed >= Duration::from_secs(1));
}

#[tokio::test]
async fn test_fetch_fails_when_rate_limit_persists() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, "unused");
    let result = fetch_records(&config).await;

    match result {
        Err(DashboardError::RateLimitExhausted { page, attempts }) => {
            assert_eq!(page, 1);
            assert_eq!(attempts, 3);
        }
        other => panic!("expected RateLimitExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_does_not_retry_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, "unused");
    let result = fetch_records(&config).await;

    assert!(matches!(
        result,
        Err(DashboardError::HttpStatus {
            page: 1,
            status: 500
        })
    ));
}

#[tokio::test]
async fn test_fetch_discards_partial_data_on_hard_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![record(1, "obra", 100.0, "2023-01-10")],
            3,
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, "unused");
    let result = fetch_records(&config).await;

    assert!(matches!(
        result,
        Err(DashboardError::HttpStatus {
            page: 2,
            status: 503
        })
    ));
}

#[tokio::test]
async fn test_fetch_reports_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, "unused");
    let result = fetch_records(&config).await;

    assert!(matches!(
        result,
        Err(DashboardError::Decode { page: 1, .. })
    ));
}

#[tokio::test]
async fn test_fetch_times_out_on_slow_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(vec![], 1))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server, "unused");
    config.api.timeout_secs = 1;

    let result = fetch_records(&config).await;
    assert!(matches!(result, Err(DashboardError::Timeout { page: 1 })));
}

#[tokio::test]
async fn test_page_delay_follows_slow_responses() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(vec![record(1, "obra", 100.0, "2023-01-10")], 2))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server, "unused");
    config.api.page_delay_ms = 200;

    let report = fetch_records(&config).await.expect("fetch should succeed");

    // two 200ms responses plus a full 200ms pause after the first one
    assert_eq!(report.pages_fetched, 2);
    assert!(report.elapsed >= Duration::from_millis(600));
}
