//! Configuration validation.

use crate::error::{CollectError, Result};

use super::Config;

pub fn validate(config: &Config) -> Result<()> {
    if config.meraki.api_key.trim().is_empty() {
        return Err(CollectError::Config(
            "meraki.api_key must not be empty".to_string(),
        ));
    }

    if !config.meraki.base_url.starts_with("http://") && !config.meraki.base_url.starts_with("https://") {
        return Err(CollectError::Config(format!(
            "meraki.base_url must be an http(s) URL, got {:?}",
            config.meraki.base_url
        )));
    }

    if !config.push.endpoint.starts_with("http://") && !config.push.endpoint.starts_with("https://")
    {
        return Err(CollectError::Config(format!(
            "push.endpoint must be an http(s) URL, got {:?}",
            config.push.endpoint
        )));
    }

    if config.push.token.trim().is_empty() {
        return Err(CollectError::Config(
            "push.token must not be empty".to_string(),
        ));
    }

    if config.push.timeout_secs == 0 {
        return Err(CollectError::Config(
            "push.timeout_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MerakiConfig, PushConfig};

    fn valid_config() -> Config {
        Config {
            meraki: MerakiConfig {
                base_url: "https://api.meraki.com/api/v1".to_string(),
                api_key: "key".to_string(),
            },
            push: PushConfig {
                endpoint: "https://push.example.com".to_string(),
                token: "token".to_string(),
                timeout_secs: 60,
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let mut config = valid_config();
        config.meraki.api_key = "  ".to_string();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn test_non_http_endpoint_rejected() {
        let mut config = valid_config();
        config.push.endpoint = "push.example.com:7744".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = valid_config();
        config.push.timeout_secs = 0;
        assert!(validate(&config).is_err());
    }
}
