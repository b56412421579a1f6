//! Token exchange and token holder
//!
//! `TokenExchange` is the seam between the client and the OAuth endpoint;
//! `Authenticator` keeps the current token pair and applies the refresh
//! policy.

use super::types::{GrantType, Tokens};
use crate::error::{Error, Result};
use crate::http::{HttpClient, Method, RequestConfig};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Path of the token endpoint, relative to the API host
pub const TOKEN_PATH: &str = "OAuth20/Token";

/// Exchanges a credential for a token pair
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn fetch_token(&self, grant: GrantType, email: &str, credential: &str) -> Result<Tokens>;
}

/// `TokenExchange` against the API's `OAuth20/Token` endpoint.
///
/// The e-mail is sent base64-encoded as a Basic authorization header; the
/// grant type and credential go in a form body.
#[derive(Debug, Clone)]
pub struct OAuthTokenExchange {
    http_client: HttpClient,
}

impl OAuthTokenExchange {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl TokenExchange for OAuthTokenExchange {
    async fn fetch_token(&self, grant: GrantType, email: &str, credential: &str) -> Result<Tokens> {
        debug!("Requesting tokens with grant {grant}");

        let config = RequestConfig::new()
            .header("Authorization", format!("Basic {}", STANDARD.encode(email)))
            .form([("grant_type", grant.as_str()), ("code", credential)]);

        let response = self
            .http_client
            .request(Method::POST, TOKEN_PATH, config)
            .await?;

        response.json::<Tokens>().map_err(|e| {
            Error::decode(format!("Token response could not be decoded: {e}"))
        })
    }
}

#[derive(Default)]
struct TokenState {
    email: Option<String>,
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// Holds the authentication state of a client
pub struct Authenticator {
    exchange: Arc<dyn TokenExchange>,
    state: RwLock<TokenState>,
}

impl Authenticator {
    /// Create an authenticator without tokens
    pub fn new(exchange: Arc<dyn TokenExchange>) -> Self {
        Self {
            exchange,
            state: RwLock::new(TokenState::default()),
        }
    }

    /// Create an authenticator from a known token pair
    pub fn with_tokens(exchange: Arc<dyn TokenExchange>, tokens: Tokens) -> Self {
        Self {
            exchange,
            state: RwLock::new(TokenState {
                email: None,
                access_token: Some(tokens.access_token),
                refresh_token: Some(tokens.refresh_token),
            }),
        }
    }

    /// Set the e-mail sent along with refresh requests
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.state.get_mut().email = Some(email.into());
        self
    }

    /// Trade an e-mail and exchange token for a token pair and keep it
    pub async fn authenticate(&self, email: &str, exchange_token: &str) -> Result<Tokens> {
        let tokens = self
            .exchange
            .fetch_token(GrantType::ExchangeToken, email, exchange_token)
            .await?;

        let mut state = self.state.write().await;
        state.email = Some(email.to_string());
        state.access_token = Some(tokens.access_token.clone());
        state.refresh_token = Some(tokens.refresh_token.clone());

        info!("Authenticated as {email}");
        Ok(tokens)
    }

    /// Replace the token pair with a new one obtained from the refresh
    /// token. A rejected refresh fails with `InvalidRefreshToken`.
    pub async fn refresh(&self) -> Result<Tokens> {
        let mut state = self.state.write().await;

        let refresh_token = state
            .refresh_token
            .clone()
            .ok_or_else(|| Error::unauthenticated("No refresh token available"))?;
        let email = state.email.clone().unwrap_or_default();

        let tokens = self
            .exchange
            .fetch_token(GrantType::RefreshToken, &email, &refresh_token)
            .await
            .map_err(|e| match e {
                Error::HttpStatus { status, .. } if (400..500).contains(&status) => {
                    warn!("Refresh token rejected with status {status}");
                    Error::invalid_refresh_token("Please provide a valid refresh token.")
                }
                other => other,
            })?;

        state.access_token = Some(tokens.access_token.clone());
        state.refresh_token = Some(tokens.refresh_token.clone());

        info!("Access token refreshed");
        Ok(tokens)
    }

    /// Whether both tokens are set
    pub async fn is_authenticated(&self) -> bool {
        let state = self.state.read().await;
        state.access_token.is_some() && state.refresh_token.is_some()
    }

    /// The access token, failing with `Unauthenticated` unless both tokens are set
    pub async fn access_token(&self) -> Result<String> {
        let state = self.state.read().await;
        match (&state.access_token, &state.refresh_token) {
            (Some(access), Some(_)) => Ok(access.clone()),
            _ => Err(Error::unauthenticated(
                "Authenticate first with an e-mail and exchange token, or provide an access and refresh token.",
            )),
        }
    }

    /// The current token pair, if complete
    pub async fn tokens(&self) -> Option<Tokens> {
        let state = self.state.read().await;
        match (&state.access_token, &state.refresh_token) {
            (Some(access), Some(refresh)) => Some(Tokens::new(access, refresh)),
            _ => None,
        }
    }

    pub async fn set_access_token(&self, token: impl Into<String>) {
        self.state.write().await.access_token = Some(token.into());
    }

    pub async fn set_refresh_token(&self, token: impl Into<String>) {
        self.state.write().await.refresh_token = Some(token.into());
    }

    /// Set the e-mail sent along with refresh requests
    pub async fn set_email(&self, email: impl Into<String>) {
        self.state.write().await.email = Some(email.into());
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}
