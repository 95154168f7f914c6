//! Client configuration
//!
//! Settings for talking to one API, loaded from YAML:
//!
//! ```yaml
//! base_url: https://api.example.com/
//! timeout_secs: 60
//! headers:
//!   Authorization: "Token abc"
//! ```

use crate::error::{Error, Result};
use crate::http::HttpClientConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Environment variable overriding `base_url`
pub const BASE_URL_ENV: &str = "RESOURCE_DISPATCH_BASE_URL";

// ============================================================================
// Client Config
// ============================================================================

/// Connection settings for one API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every resource path is joined to
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User agent; defaults to the crate name and version
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_timeout() -> u64 {
    30
}

impl ClientConfig {
    /// Config for `base_url` with default settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: default_timeout(),
            user_agent: None,
            headers: HashMap::new(),
        }
    }

    /// Load and validate a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate a YAML config
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the environment
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.base_url = base_url;
        }
        self
    }

    /// Check that the base URL is usable
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::config("base_url cannot be empty"));
        }
        let url = self.base_url()?;
        if url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "base_url '{}' cannot carry resource paths",
                self.base_url
            )));
        }
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "base_url '{}' must use http or https",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::config("timeout_secs must be greater than zero"));
        }
        Ok(())
    }

    /// Parsed base URL
    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(self.base_url.trim())?)
    }

    /// Settings for the HTTP transport
    pub fn http_config(&self) -> HttpClientConfig {
        let mut builder =
            HttpClientConfig::builder().timeout(Duration::from_secs(self.timeout_secs));
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent);
        }
        for (key, value) in &self.headers {
            builder = builder.header(key, value);
        }
        builder.build()
    }
}
