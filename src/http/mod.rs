//! HTTP transport module
//!
//! Provides the HTTP client used for API calls and token exchange.
//!
//! # Features
//!
//! - **Base URL joining**: paths are resolved against the API host
//! - **Timeouts**: a default timeout with per-request overrides
//! - **Status classification**: non-2xx responses surface as `Error::HttpStatus`

mod client;

pub use client::{
    ApiResponse, HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestBody, RequestConfig,
};
pub use reqwest::Method;

#[cfg(test)]
mod tests;
