//! Client configuration
//!
//! A `ClientConfig` can be built in code, read from a YAML file, or taken
//! from `WINBOOKS_*` environment variables. Environment values override
//! whatever was loaded before them.

use crate::auth::Tokens;
use crate::error::{Error, Result};
use crate::http::HttpClientConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default API host
pub const DEFAULT_API_HOST: &str = "https://prd.winbooksapis.be/wow/v2/";

/// Default request timeout, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// ClientConfig
// ============================================================================

/// Settings of a `Winbooks` client
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the API
    pub api_host: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: Option<String>,

    /// Folder (accounting file) targeted by requests
    pub folder: Option<String>,

    /// E-mail of the API user, sent on token requests
    pub email: Option<String>,

    /// OAuth access token
    pub access_token: Option<String>,

    /// OAuth refresh token
    pub refresh_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
            folder: None,
            email: None,
            access_token: None,
            refresh_token: None,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Read configuration from `WINBOOKS_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `WINBOOKS_*` environment variables on top of this config
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_vars(|key| std::env::var(key).ok())
    }

    pub(crate) fn with_vars<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("WINBOOKS_API_HOST") {
            self.api_host = host;
        }

        if let Some(timeout) = lookup("WINBOOKS_TIMEOUT_SECS") {
            self.timeout_secs = timeout.trim().parse().map_err(|_| {
                Error::config(format!("WINBOOKS_TIMEOUT_SECS must be an integer, got \"{timeout}\""))
            })?;
        }

        for (key, slot) in [
            ("WINBOOKS_FOLDER", &mut self.folder),
            ("WINBOOKS_EMAIL", &mut self.email),
            ("WINBOOKS_ACCESS_TOKEN", &mut self.access_token),
            ("WINBOOKS_REFRESH_TOKEN", &mut self.refresh_token),
        ] {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *slot = Some(value);
            }
        }

        self.validate()?;
        Ok(self)
    }

    /// Check that the API host is a usable base URL
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_host)?;
        if url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "API host \"{}\" cannot be used as a base URL",
                self.api_host
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::config("Timeout must be greater than zero"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The configured token pair, when both tokens are present
    pub fn tokens(&self) -> Option<Tokens> {
        match (&self.access_token, &self.refresh_token) {
            (Some(access), Some(refresh)) => Some(Tokens::new(access, refresh)),
            _ => None,
        }
    }

    /// Transport settings derived from this config
    pub fn http_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(&self.api_host)
            .timeout(self.timeout());

        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent);
        }

        builder.build()
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_host", &self.api_host)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("folder", &self.folder)
            .field("email", &self.email)
            .field("has_tokens", &self.tokens().is_some())
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for `ClientConfig`
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn api_host(mut self, host: impl Into<String>) -> Self {
        self.config.api_host = host.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(agent.into());
        self
    }

    pub fn folder(mut self, folder: impl Into<String>) -> Self {
        self.config.folder = Some(folder.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.config.email = Some(email.into());
        self
    }

    /// Set both OAuth tokens
    pub fn tokens(mut self, access: impl Into<String>, refresh: impl Into<String>) -> Self {
        self.config.access_token = Some(access.into());
        self.config.refresh_token = Some(refresh.into());
        self
    }

    /// Build and validate the config
    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
