//! Configuration type definitions.

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Meraki Dashboard API configuration.
    pub meraki: MerakiConfig,

    /// Push service configuration.
    pub push: PushConfig,
}

/// Meraki Dashboard API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerakiConfig {
    /// Base URL of the Dashboard API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key with read access to the organizations to collect.
    pub api_key: String,
}

/// Push service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Push service endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Bearer token for the push service.
    pub token: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.meraki.com/api/v1".to_string()
}

fn default_endpoint() -> String {
    "https://push.secberus.io:7744".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}
