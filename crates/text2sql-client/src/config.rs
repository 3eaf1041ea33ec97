//! Backend location and per-domain timeouts.
//!
//! A single [`ApiConfig`] carries the backend host. Every domain client is
//! bound to `{base_url}/api/{domain}` from it, so the host is configured in
//! one place.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};

/// Default backend URL.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Environment variable overriding [`ApiConfig::base_url`].
pub const API_URL_ENV: &str = "TEXT2SQL_API_URL";

/// Backend domains, one client each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Database,
    Graph,
    Llm,
    Vector,
}

impl Domain {
    pub const ALL: [Domain; 4] = [Domain::Database, Domain::Graph, Domain::Llm, Domain::Vector];

    /// Path segment after `/api/`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Database => "database",
            Domain::Graph => "graph",
            Domain::Llm => "llm",
            Domain::Vector => "vector",
        }
    }
}

/// Request timeouts per domain, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    #[serde(default = "default_short_ms")]
    pub database_ms: u64,
    #[serde(default = "default_short_ms")]
    pub graph_ms: u64,
    #[serde(default = "default_llm_ms")]
    pub llm_ms: u64,
    #[serde(default = "default_vector_ms")]
    pub vector_ms: u64,
}

fn default_short_ms() -> u64 {
    10_000
}

// LLM description runs table by table and can take a very long time.
fn default_llm_ms() -> u64 {
    1000 * 30_000
}

fn default_vector_ms() -> u64 {
    10_000 * 200
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            database_ms: default_short_ms(),
            graph_ms: default_short_ms(),
            llm_ms: default_llm_ms(),
            vector_ms: default_vector_ms(),
        }
    }
}

impl Timeouts {
    pub fn for_domain(&self, domain: Domain) -> Duration {
        let ms = match domain {
            Domain::Database => self.database_ms,
            Domain::Graph => self.graph_ms,
            Domain::Llm => self.llm_ms,
            Domain::Vector => self.vector_ms,
        };
        Duration::from_millis(ms)
    }
}

/// Configuration shared by all domain clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub base_url: String,
    #[serde(default)]
    pub timeouts: Timeouts,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            timeouts: Timeouts::default(),
        }
    }
}

impl ApiConfig {
    /// Create a config for the given backend URL with default timeouts.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeouts: Timeouts::default(),
        }
    }

    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> ClientResult<Self> {
        let mut config: ApiConfig = toml::from_str(content)
            .map_err(|e| ClientError::config(format!("invalid config: {}", e)))?;
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    /// Load configuration.
    ///
    /// Reads `path` when given (the file must exist), then applies the
    /// `TEXT2SQL_API_URL` environment variable on top.
    pub fn load(path: Option<&Path>) -> ClientResult<Self> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ClientError::config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                let content = std::fs::read_to_string(path)?;
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            config = config.with_base_url(&url);
        }

        Ok(config)
    }

    /// Replace the backend URL, keeping timeouts.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Endpoint binding for one domain.
    pub fn endpoint(&self, domain: Domain) -> Endpoint {
        Endpoint::new(
            &format!("{}/api/{}", self.base_url, domain.as_str()),
            self.timeouts.for_domain(domain),
        )
    }

    /// Endpoint binding for the host root (health check).
    pub fn root_endpoint(&self) -> Endpoint {
        Endpoint::new(&self.base_url, Duration::from_millis(default_short_ms()))
    }
}

/// A base path plus timeout. Fixed once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base_url: String,
    timeout: Duration,
}

impl Endpoint {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
