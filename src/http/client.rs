//! HTTP client implementing the engine's transport contract
//!
//! Provides a thin reqwest wrapper that handles:
//! - Default headers and user agent
//! - Request timeouts
//! - Reading the response into an owned [`ApiResponse`]

use super::response::ApiResponse;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Client, Request};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Executes requests built by the dispatcher.
///
/// Implement this to put authentication, retries or rate limiting in front
/// of the engine; the engine itself does none of that.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: Request) -> Result<ApiResponse>;
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            default_headers: HashMap::new(),
            user_agent: format!("{}/{}", crate::NAME, crate::VERSION),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// reqwest-backed [`Transport`]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let mut headers = Vec::with_capacity(config.default_headers.len());
        for (key, value) in &config.default_headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| Error::config(format!("invalid header name '{key}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::config(format!("invalid value for header '{key}': {e}")))?;
            headers.push((name, value));
        }

        Ok(Self {
            client,
            config,
            headers,
        })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn execute(&self, mut request: Request) -> Result<ApiResponse> {
        for (name, value) in &self.headers {
            if !request.headers().contains_key(name) {
                request.headers_mut().insert(name.clone(), value.clone());
            }
        }

        let method = request.method().clone();
        let url = request.url().clone();
        debug!("Sending {} {}", method, url);

        let response = self.client.execute(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let final_url = response.url().clone();
        let body = response.bytes().await?;

        debug!("{} {} -> {} ({} bytes)", method, url, status.as_u16(), body.len());

        Ok(ApiResponse {
            status,
            headers,
            url: Some(final_url),
            body,
        })
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
