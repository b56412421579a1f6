//! Error types for the Winbooks client
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the Winbooks client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Query Construction Errors
    // ============================================================================
    #[error("Undefined query operator: {message}")]
    UndefinedOperator { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Invalid join: {message}")]
    InvalidJoin { message: String },

    #[error("Undefined object model: {name}")]
    UndefinedObjectModel { name: String },

    // ============================================================================
    // Client State Errors
    // ============================================================================
    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    #[error("Undefined folder: please specify a folder before making requests")]
    UndefinedFolder,

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Invalid refresh token: {message}")]
    InvalidRefreshToken { message: String },

    #[error("Invalid tokens: access token and refresh token are invalid")]
    InvalidTokens,

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an undefined operator error
    pub fn undefined_operator(message: impl Into<String>) -> Self {
        Self::UndefinedOperator {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an invalid join error
    pub fn invalid_join(message: impl Into<String>) -> Self {
        Self::InvalidJoin {
            message: message.into(),
        }
    }

    /// Create an undefined object model error
    pub fn undefined_model(name: impl Into<String>) -> Self {
        Self::UndefinedObjectModel { name: name.into() }
    }

    /// Create an unauthenticated error
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    /// Create an invalid refresh token error
    pub fn invalid_refresh_token(message: impl Into<String>) -> Self {
        Self::InvalidRefreshToken {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this error is a rejected access token (HTTP 401)
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::HttpStatus { status: 401, .. })
    }

    /// Check if this error comes from building a query rather than talking to the API
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            Error::UndefinedOperator { .. }
                | Error::InvalidArgument { .. }
                | Error::InvalidJoin { .. }
                | Error::UndefinedObjectModel { .. }
        )
    }
}

/// Result type alias for the Winbooks client
pub type Result<T> = std::result::Result<T, Error>;
