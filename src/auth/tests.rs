//! Tests for the auth module

use super::*;
use crate::error::Error;
use crate::http::{HttpClient, HttpClientConfig};
use base64::Engine;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn exchange_for(server: &MockServer) -> Arc<OAuthTokenExchange> {
    let config = HttpClientConfig::builder().base_url(server.uri()).build();
    Arc::new(OAuthTokenExchange::new(HttpClient::with_config(config).unwrap()))
}

#[test]
fn test_grant_type_names() {
    assert_eq!(GrantType::ExchangeToken.as_str(), "exchange_token");
    assert_eq!(GrantType::RefreshToken.to_string(), "refresh_token");
}

#[test]
fn test_tokens_debug_is_redacted() {
    let tokens = Tokens::new("secret-access", "secret-refresh");
    let debug = format!("{tokens:?}");
    assert!(!debug.contains("secret"));
}

#[tokio::test]
async fn test_exchange_token_request() {
    let mock_server = MockServer::start().await;
    let basic = base64::engine::general_purpose::STANDARD.encode("john@example.com");

    Mock::given(method("POST"))
        .and(path("/OAuth20/Token"))
        .and(header("Authorization", format!("Basic {basic}").as_str()))
        .and(body_string_contains("grant_type=exchange_token"))
        .and(body_string_contains("code=exchange-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(exchange_for(&mock_server));
    assert!(!auth.is_authenticated().await);

    let tokens = auth
        .authenticate("john@example.com", "exchange-123")
        .await
        .unwrap();

    assert_eq!(tokens, Tokens::new("access-1", "refresh-1"));
    assert!(auth.is_authenticated().await);
    assert_eq!(auth.access_token().await.unwrap(), "access-1");
}

#[tokio::test]
async fn test_refresh_replaces_tokens() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/OAuth20/Token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("code=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-2",
            "refresh_token": "refresh-2"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let auth = Authenticator::with_tokens(
        exchange_for(&mock_server),
        Tokens::new("access-1", "refresh-1"),
    );
    auth.set_email("john@example.com").await;

    let tokens = auth.refresh().await.unwrap();
    assert_eq!(tokens.access_token, "access-2");
    assert_eq!(auth.tokens().await, Some(Tokens::new("access-2", "refresh-2")));
}

#[tokio::test]
async fn test_rejected_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/OAuth20/Token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .mount(&mock_server)
        .await;

    let auth = Authenticator::with_tokens(
        exchange_for(&mock_server),
        Tokens::new("access-1", "refresh-1"),
    );

    let err = auth.refresh().await.unwrap_err();
    assert!(matches!(err, Error::InvalidRefreshToken { .. }));
    // Tokens are left untouched
    assert_eq!(auth.access_token().await.unwrap(), "access-1");
}

#[tokio::test]
async fn test_refresh_server_error_is_surfaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let auth = Authenticator::with_tokens(exchange_for(&mock_server), Tokens::new("a", "r"));
    let err = auth.refresh().await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 503, .. }));
}

#[tokio::test]
async fn test_unauthenticated() {
    let mock_server = MockServer::start().await;
    let auth = Authenticator::new(exchange_for(&mock_server));

    let err = auth.access_token().await.unwrap_err();
    assert!(matches!(err, Error::Unauthenticated { .. }));

    auth.set_access_token("access").await;
    assert!(!auth.is_authenticated().await);
    assert!(auth.access_token().await.is_err());

    auth.set_refresh_token("refresh").await;
    assert!(auth.is_authenticated().await);
}

#[tokio::test]
async fn test_malformed_token_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "nope"})))
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(exchange_for(&mock_server));
    let err = auth.authenticate("a@b.c", "x").await.unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert!(!auth.is_authenticated().await);
}
