//! Client configuration
//!
//! `ClientConfig` can be built in code through [`ClientConfig::builder`] or
//! loaded from a YAML file:
//!
//! ```yaml
//! base_url: https://gitlab.example.com/api/v4
//! max_requests_per_second: 10
//! timeout: 30
//! default_headers:
//!   PRIVATE-TOKEN: glpat-xxxxxxxx
//! ```

use crate::error::{Error, Result};
use crate::types::StringMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default requests-per-second ceiling
pub const DEFAULT_MAX_REQUESTS_PER_SECOND: u32 = 10;

/// Configuration shared by the transport and the requestor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL that relative request paths are joined onto
    pub base_url: Option<String>,

    /// Ceiling on requests per second
    pub max_requests_per_second: u32,

    /// Request timeout in seconds
    pub timeout: u64,

    /// User agent string
    pub user_agent: String,

    /// Headers sent with every request
    pub default_headers: StringMap,

    /// Pages fetched ahead of consumption when streaming
    pub buffered_pages: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            max_requests_per_second: DEFAULT_MAX_REQUESTS_PER_SECOND,
            timeout: 30,
            user_agent: format!("restpager/{}", env!("CARGO_PKG_VERSION")),
            default_headers: StringMap::new(),
            buffered_pages: 4,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Parse a config from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a YAML file
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

    /// Request timeout as a `Duration`
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Check values that would otherwise fail later at request time
    pub fn validate(&self) -> Result<()> {
        if self.max_requests_per_second == 0 {
            return Err(Error::config("max_requests_per_second must be at least 1"));
        }
        if self.buffered_pages == 0 {
            return Err(Error::config("buffered_pages must be at least 1"));
        }
        if let Some(base) = &self.base_url {
            url::Url::parse(base)?;
        }
        Ok(())
    }
}

/// Builder for client config
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the requests-per-second ceiling
    pub fn max_requests_per_second(mut self, rps: u32) -> Self {
        self.config.max_requests_per_second = rps;
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout.as_secs();
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

    /// Set the streaming look-ahead
    pub fn buffered_pages(mut self, pages: usize) -> Self {
        self.config.buffered_pages = pages;
        self
    }

    /// Build the config
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
