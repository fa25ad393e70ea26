//! End-to-end tests against a fake segmented table storage API.

use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tabq::api::factory::ClientFactory;
use tabq::api::models::{DynamicRow, TableEntity};
use tabq::core::services::table_service::TableService;
use tabq::error::{ApiError, AppError};
use tabq::storage::config::{Config, Profile};
use tabq::storage::credentials::CredentialStore;
use tabq::utils::retry::RetryConfig;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GOOD_TOKEN: &str = "sv=2024&sig=good";
const STALE_TOKEN: &str = "sv=2024&sig=stale";

fn auth_header(token: &str) -> String {
    format!("SharedAccessSignature {}", token)
}

fn write_config(config_path: &Path, endpoint: &str, token: &str) {
    let mut tokens = HashMap::new();
    tokens.insert("devaccount-table-read".to_string(), token.to_string());
    let mut config = Config::default();
    config.default_profile = Some("default".to_string());
    config.set_profile(
        "default".to_string(),
        Profile {
            endpoint: endpoint.to_string(),
            account_name: "devaccount".to_string(),
            sas_definition: "table-read".to_string(),
            timeout_seconds: Some(5),
            tokens,
        },
    );
    config
        .save(Some(config_path.to_path_buf()))
        .expect("Failed to save config");
}

fn service_for(config_path: &Path, endpoint: &str) -> TableService {
    let credentials = Arc::new(CredentialStore::new(
        config_path.to_path_buf(),
        "default".to_string(),
    ));
    // Prime the store so the test observes the token written above even if
    // the file is rotated before the first request goes out.
    credentials
        .current()
        .expect("initial credential load failed");
    let factory = Arc::new(ClientFactory::new(
        endpoint,
        Some(5),
        credentials.clone(),
    ));
    TableService::with_retry(
        credentials,
        factory,
        RetryConfig {
            max_retries: 3,
            backoff_unit: Duration::from_millis(10),
        },
    )
}

fn segment(rows: Vec<serde_json::Value>, continuation: Option<&str>) -> serde_json::Value {
    match continuation {
        Some(token) => json!({ "value": rows, "continuationToken": token }),
        None => json!({ "value": rows }),
    }
}

fn customer(row_key: &str) -> serde_json::Value {
    json!({ "PartitionKey": "customers", "RowKey": row_key })
}

#[tokio::test]
async fn get_all_follows_continuation_tokens_across_segments() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    write_config(&config_path, &server.uri(), GOOD_TOKEN);

    Mock::given(method("GET"))
        .and(path("/tables/Customers/rows"))
        .and(header("Authorization", auth_header(GOOD_TOKEN)))
        .and(query_param_is_missing("nextToken"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(segment(vec![customer("r1"), customer("r2")], Some("t1"))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tables/Customers/rows"))
        .and(query_param("nextToken", "t1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(segment(vec![customer("r3")], Some("t2"))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tables/Customers/rows"))
        .and(query_param("nextToken", "t2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(segment(vec![customer("r4"), customer("r5")], None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(&config_path, &server.uri());
    let rows = service
        .get_all::<DynamicRow>("Customers")
        .await
        .expect("query should succeed");

    let keys: Vec<&str> = rows.iter().map(|r| r.row_key()).collect();
    assert_eq!(keys, vec!["r1", "r2", "r3", "r4", "r5"]);
}

#[tokio::test]
async fn empty_table_yields_empty_result_not_error() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    write_config(&config_path, &server.uri(), GOOD_TOKEN);

    Mock::given(method("GET"))
        .and(path("/tables/Customers/rows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(segment(vec![], None)))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(&config_path, &server.uri());
    let rows = service
        .get_all::<DynamicRow>("Customers")
        .await
        .expect("empty table is not an error");
    assert!(rows.is_empty());
}

#[tokio::test]
async fn auth_failure_rotates_credential_once_then_succeeds() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");

    // The store loads the stale token first; the rotated token is already
    // on disk when the refresh re-reads the file.
    write_config(&config_path, &server.uri(), STALE_TOKEN);
    let service = service_for(&config_path, &server.uri());

    Mock::given(method("GET"))
        .and(path("/tables/Customers/rows"))
        .and(header("Authorization", auth_header(STALE_TOKEN)))
        .respond_with(
            ResponseTemplate::new(401).set_body_string("Server failed to authenticate the request."),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tables/Customers/rows"))
        .and(header("Authorization", auth_header(GOOD_TOKEN)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(segment(vec![customer("r1")], None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    write_config(&config_path, &server.uri(), GOOD_TOKEN);

    let rows = service
        .get_all::<DynamicRow>("Customers")
        .await
        .expect("query should succeed after one rotation");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].row_key(), "r1");
}

#[tokio::test]
async fn persistent_auth_failure_exhausts_retries() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    write_config(&config_path, &server.uri(), STALE_TOKEN);

    // Every rotation re-reads the same rejected token.
    Mock::given(method("GET"))
        .and(path("/tables/Customers/rows"))
        .and(header("Authorization", auth_header(STALE_TOKEN)))
        .respond_with(
            ResponseTemplate::new(401).set_body_string("Server failed to authenticate the request."),
        )
        .expect(4)
        .mount(&server)
        .await;

    let service = service_for(&config_path, &server.uri());
    let result = service.get_all::<DynamicRow>("Customers").await;

    match result {
        Err(AppError::Api(ApiError::RetriesExhausted { attempts, source })) => {
            assert_eq!(attempts, 3);
            assert!(source.is_auth_failure());
        }
        other => panic!("expected RetriesExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn remote_failure_surfaces_immediately_without_retry() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    write_config(&config_path, &server.uri(), GOOD_TOKEN);

    Mock::given(method("GET"))
        .and(path("/tables/Missing/rows"))
        .respond_with(ResponseTemplate::new(404).set_body_string("table not found"))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(&config_path, &server.uri());
    let result = service.get_all::<DynamicRow>("Missing").await;

    assert!(matches!(
        result,
        Err(AppError::Api(ApiError::Remote { status: 404, .. }))
    ));
}

#[tokio::test]
async fn retried_run_restarts_pagination_from_first_segment() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    write_config(&config_path, &server.uri(), STALE_TOKEN);
    let service = service_for(&config_path, &server.uri());

    // First attempt: page one succeeds, the token expires mid-query.
    Mock::given(method("GET"))
        .and(path("/tables/Customers/rows"))
        .and(header("Authorization", auth_header(STALE_TOKEN)))
        .and(query_param_is_missing("nextToken"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(segment(vec![customer("r1")], Some("t1"))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tables/Customers/rows"))
        .and(header("Authorization", auth_header(STALE_TOKEN)))
        .and(query_param("nextToken", "t1"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string("Server failed to authenticate the request."),
        )
        .expect(1)
        .mount(&server)
        .await;
    // Retried run with the rotated token must begin tokenless again.
    Mock::given(method("GET"))
        .and(path("/tables/Customers/rows"))
        .and(header("Authorization", auth_header(GOOD_TOKEN)))
        .and(query_param_is_missing("nextToken"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(segment(vec![customer("r1")], Some("t1"))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tables/Customers/rows"))
        .and(header("Authorization", auth_header(GOOD_TOKEN)))
        .and(query_param("nextToken", "t1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(segment(vec![customer("r2")], None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    write_config(&config_path, &server.uri(), GOOD_TOKEN);

    let rows = service
        .get_all::<DynamicRow>("Customers")
        .await
        .expect("query should succeed after rotation");

    // Full set exactly once, no duplicated first page.
    let keys: Vec<&str> = rows.iter().map(|r| r.row_key()).collect();
    assert_eq!(keys, vec!["r1", "r2"]);
}

#[tokio::test]
async fn concurrent_queries_survive_independent_rotations() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    write_config(&config_path, &server.uri(), STALE_TOKEN);

    // Both calls share one credential store and one client factory.
    let credentials = Arc::new(CredentialStore::new(
        config_path.clone(),
        "default".to_string(),
    ));
    credentials
        .current()
        .expect("initial credential load failed");
    let factory = Arc::new(ClientFactory::new(
        server.uri(),
        Some(5),
        credentials.clone(),
    ));
    let service = TableService::with_retry(
        credentials,
        factory,
        RetryConfig {
            max_retries: 3,
            backoff_unit: Duration::from_millis(10),
        },
    );

    // The stale token is rejected everywhere; either call may hit it first,
    // and redundant rotations must be harmless.
    Mock::given(method("GET"))
        .and(header("Authorization", auth_header(STALE_TOKEN)))
        .respond_with(
            ResponseTemplate::new(401).set_body_string("Server failed to authenticate the request."),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tables/Alpha/rows"))
        .and(header("Authorization", auth_header(GOOD_TOKEN)))
        .and(query_param_is_missing("nextToken"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(segment(vec![customer("a1")], Some("ta"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tables/Alpha/rows"))
        .and(header("Authorization", auth_header(GOOD_TOKEN)))
        .and(query_param("nextToken", "ta"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(segment(vec![customer("a2")], None)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tables/Beta/rows"))
        .and(header("Authorization", auth_header(GOOD_TOKEN)))
        .and(query_param_is_missing("nextToken"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(segment(vec![customer("b1")], Some("tb"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tables/Beta/rows"))
        .and(header("Authorization", auth_header(GOOD_TOKEN)))
        .and(query_param("nextToken", "tb"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(segment(vec![customer("b2"), customer("b3")], None)),
        )
        .mount(&server)
        .await;

    write_config(&config_path, &server.uri(), GOOD_TOKEN);

    let (alpha, beta) = tokio::join!(
        service.get_all::<DynamicRow>("Alpha"),
        service.get_all::<DynamicRow>("Beta"),
    );

    let alpha = alpha.expect("Alpha query should succeed");
    let beta = beta.expect("Beta query should succeed");

    // No interleaving of one call's segments into the other's accumulator.
    let alpha_keys: Vec<&str> = alpha.iter().map(|r| r.row_key()).collect();
    let beta_keys: Vec<&str> = beta.iter().map(|r| r.row_key()).collect();
    assert_eq!(alpha_keys, vec!["a1", "a2"]);
    assert_eq!(beta_keys, vec!["b1", "b2", "b3"]);
}
