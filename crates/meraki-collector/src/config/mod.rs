//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Environment variable overriding the configuration file path.
pub const CONFIG_FILE_ENV_VAR: &str = "MERAKI_COLLECTOR_CONFIG";

/// Default configuration file path when neither the CLI flag nor the
/// environment variable is set.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Resolve the configuration file path from the environment, falling back
    /// to [`DEFAULT_CONFIG_FILE`].
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_FILE_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml_with_defaults() {
        let config = Config::from_yaml(
            r#"
meraki:
  api_key: secret
push:
  token: push-token
"#,
        )
        .unwrap();

        assert_eq!(config.meraki.base_url, "https://api.meraki.com/api/v1");
        assert_eq!(config.push.endpoint, "https://push.secberus.io:7744");
        assert_eq!(config.push.timeout_secs, 60);
    }

    #[test]
    fn test_from_yaml_rejects_invalid() {
        let result = Config::from_yaml(
            r#"
meraki:
  api_key: ""
push:
  token: push-token
"#,
        );
        assert!(result.is_err());
    }
}
