//! Resolver configuration
//!
//! Loaded from YAML, with environment overrides applied on top:
//!
//! ```yaml
//! api:
//!   base_url: "http://localhost:8888"
//!   search_path: "/api/search"
//! debounce_ms: 200
//! ```

use crate::api::{ApiClient, HttpEntitySearch};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const ENV_API_URL: &str = "OJ_API_URL";
pub const ENV_SEARCH_PATH: &str = "OJ_SEARCH_PATH";
pub const ENV_DEBOUNCE_MS: &str = "OJ_DEBOUNCE_MS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ResolverConfig {
    #[serde(default)]
    pub api: ApiConfig,
    /// Keystroke debounce before a search is issued
    #[serde(default)]
    pub debounce_ms: u64,
}

/// Where the search collaborator lives
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_search_path")]
    pub search_path: String,
}

fn default_base_url() -> String {
    "http://localhost:8888".to_string()
}

fn default_search_path() -> String {
    "/api/search".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            search_path: default_search_path(),
        }
    }
}

impl ResolverConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    /// Apply `OJ_*` overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (environment, tests)
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api.base_url = url;
        }
        if let Some(path) = lookup(ENV_SEARCH_PATH) {
            self.api.search_path = path;
        }
        if let Some(raw) = lookup(ENV_DEBOUNCE_MS) {
            match raw.parse() {
                Ok(ms) => self.debounce_ms = ms,
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid {}", ENV_DEBOUNCE_MS),
            }
        }
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// HTTP search collaborator for this configuration
    pub fn http_search(&self) -> HttpEntitySearch {
        HttpEntitySearch::new(ApiClient::new(&self.api.base_url), self.api.search_path.clone())
    }
}
