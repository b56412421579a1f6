//! Tests for the HTTP client module

use super::*;
use crate::error::Error;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpClient {
    let config = HttpClientConfig::builder().base_url(server.uri()).build();
    HttpClient::with_config(config).unwrap()
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert!(config.base_url.is_none());
    assert_eq!(
        config.default_headers.get("Accept"),
        Some(&"application/json".to_string())
    );
    assert!(config.user_agent.starts_with("winbooks-rs/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.example.com")
        .timeout(Duration::from_secs(60))
        .header("X-Custom", "value")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.base_url, Some("https://api.example.com".to_string()));
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(
        config.default_headers.get("X-Custom"),
        Some(&"value".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_request_config_builder() {
    let config = RequestConfig::new()
        .query("maxLevel", "2")
        .header("ContinuePath", "abc123")
        .form([("grant_type", "refresh_token")])
        .timeout(Duration::from_secs(10));

    assert_eq!(config.query, vec![("maxLevel".to_string(), "2".to_string())]);
    assert_eq!(
        config.headers.get("ContinuePath"),
        Some(&"abc123".to_string())
    );
    assert_eq!(
        config.body,
        Some(RequestBody::Form(vec![(
            "grant_type".to_string(),
            "refresh_token".to_string()
        )]))
    );
    assert_eq!(config.timeout, Some(Duration::from_secs(10)));
}

#[tokio::test]
async fn test_http_client_get() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app/Customers/Folder/DEMO"))
        .and(header("Accept", "application/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"Code": "ARTHUR"}]))
                .insert_header("ContinuePath", "next-page"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client
        .request(Method::GET, "app/Customers/Folder/DEMO", RequestConfig::new())
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.header("ContinuePath"), Some("next-page"));
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body, json!([{"Code": "ARTHUR"}]));
}

#[tokio::test]
async fn test_http_client_query_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app/Customer/ARTHUR/Folder/DEMO"))
        .and(query_param("maxLevel", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Code": "ARTHUR"})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let body: serde_json::Value = client
        .request(
            Method::GET,
            "/app/Customer/ARTHUR/Folder/DEMO",
            RequestConfig::new().query("maxLevel", "3"),
        )
        .await
        .unwrap()
        .json()
        .unwrap();

    assert_eq!(body["Code"], "ARTHUR");
}

#[tokio::test]
async fn test_http_client_post_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/app/Customers/Folder/DEMO/ExecuteCriteria"))
        .and(body_string_contains("\"EntityType\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client
        .request(
            Method::POST,
            "app/Customers/Folder/DEMO/ExecuteCriteria",
            RequestConfig::new().json(json!({"EntityType": "x", "Alias": "this"})),
        )
        .await
        .unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_http_client_form_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/OAuth20/Token"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=exchange_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client
        .request(
            Method::POST,
            "OAuth20/Token",
            RequestConfig::new().form([("grant_type", "exchange_token"), ("code", "xyz")]),
        )
        .await
        .unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_http_client_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .request(Method::GET, "missing", RequestConfig::new())
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "Not Found");
        }
        other => panic!("Expected HttpStatus error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_client_unauthorized_is_flagged() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .request(Method::GET, "anything", RequestConfig::new())
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_http_client_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .request(
            Method::GET,
            "slow",
            RequestConfig::new().timeout(Duration::from_millis(50)),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout { timeout_ms: 50 }));
}

#[tokio::test]
async fn test_empty_body_decodes_as_null() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client
        .request(Method::DELETE, "app/Customer/A/Folder/DEMO", RequestConfig::new())
        .await
        .unwrap();

    let body: serde_json::Value = response.json().unwrap();
    assert!(body.is_null());
}

#[test]
fn test_build_url() {
    let client = HttpClient::with_config(
        HttpClientConfig::builder()
            .base_url("https://prd.winbooksapis.be/wow/v2/")
            .build(),
    )
    .unwrap();

    assert_eq!(
        client.build_url("app/Customers/Folder/DEMO"),
        "https://prd.winbooksapis.be/wow/v2/app/Customers/Folder/DEMO"
    );
    assert_eq!(client.build_url("https://other/x"), "https://other/x");
}
