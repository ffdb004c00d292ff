//! External document-store configuration.

use serde::{Deserialize, Serialize};

/// Top-level store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store provider type: `"remote"` or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Remote store adapter configuration.
    #[serde(default)]
    pub remote: RemoteStoreConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            remote: RemoteStoreConfig::default(),
        }
    }
}

/// Remote document-store API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteStoreConfig {
    /// Base URL of the document-store API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API token sent as a bearer credential.
    #[serde(default)]
    pub api_token: String,
    /// Per-request timeout in seconds. Every remote call carries this
    /// explicit timeout; a timed-out write is surfaced as a retryable
    /// error, never silently retried.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

impl Default for RemoteStoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: String::new(),
            request_timeout_seconds: default_request_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8090".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}
